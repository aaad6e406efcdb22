use anyhow::{Context, Result, bail};
use cartola_core::{
    CalendarTask, CategoryType, CreditOperation, FileKind, FinanceSnapshot, ImportedFile,
    MonthlySubscriptionEntry, SavingsProject, TaskKind, Transaction, cash_flow_projection,
    commitment_projection, debt_timeline, detect_subscriptions, try_calculate_health,
};
use cartola_ingest::{parse_card_statement_text, parse_cartola_csv, to_transactions};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod auth;
mod chat;
mod config;
mod llm;
mod report;
mod setup;
mod state;
mod store;

#[derive(Parser, Debug)]
#[command(name = "cartola", version, about = "Tablero de finanzas personales en la terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One-time interactive setup: name and monthly income under ~/.cartola/
    Setup,

    /// Import a bank statement (cartola CSV or card statement text)
    Import {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = ImportFormat::Auto)]
        format: ImportFormat,

        /// Batch id; defaults to file stem + timestamp
        #[arg(long)]
        batch: Option<String>,
    },

    /// Remove one import batch and all its movements
    Forget { batch: String },

    /// Remove all imported movements (manual entries survive)
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// List movements, optionally filtered
    Txns {
        /// Substring match on the description
        #[arg(long)]
        search: Option<String>,

        /// Exact match on the sub-category
        #[arg(long)]
        sub: Option<String>,
    },

    /// Assign a 50/30/20 bucket (and optional sub-category) to one movement
    Classify {
        id: String,

        /// Necesidad, Deseo or Ahorro
        #[arg(long)]
        category: String,

        #[arg(long)]
        sub: Option<String>,
    },

    /// Full dashboard summary
    Summary,

    /// 50/30/20 budget health score
    Health {
        /// Override the configured monthly income
        #[arg(long)]
        income: Option<i64>,

        /// Fail instead of degrading when income is not configured
        #[arg(long)]
        strict: bool,
    },

    /// Recurring subscriptions (detected + manual)
    Subs {
        #[command(subcommand)]
        command: Option<SubsCommand>,
    },

    /// Active installment purchases and when they end
    Debts,

    /// Committed spending over the coming months
    Projection {
        #[arg(long, default_value_t = cartola_core::DEFAULT_PROJECTION_MONTHS)]
        months: usize,

        /// Include credits, manual subscriptions and savings goals
        #[arg(long)]
        full: bool,
    },

    /// Bank credits tracked manually
    Credit {
        #[command(subcommand)]
        command: CreditCommand,
    },

    /// Savings goals
    Savings {
        #[command(subcommand)]
        command: SavingsCommand,
    },

    /// Payment reminders and tasks
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },

    /// Interactive assistant over your own numbers (TTY required)
    Chat,

    /// Manage ~/.cartola/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store LLM credentials for the assistant
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ImportFormat {
    /// Pick by file extension (.csv = cartola, anything else = card text)
    Auto,
    Cartola,
    Card,
}

#[derive(Subcommand, Debug)]
enum SubsCommand {
    /// Add a manual subscription the detector can't see
    Add {
        #[arg(long)]
        desc: String,

        #[arg(long)]
        monthly: i64,
    },
    /// Remove a manual subscription by id
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
enum CreditCommand {
    Add {
        #[arg(long)]
        desc: String,

        #[arg(long)]
        total: i64,

        #[arg(long)]
        installments: u32,

        #[arg(long)]
        monthly: i64,

        #[arg(long, default_value_t = 0)]
        paid: u32,
    },
    List,
    /// Record that another installment was paid
    Pay { id: String },
}

#[derive(Subcommand, Debug)]
enum SavingsCommand {
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        target: i64,

        /// Target date, YYYY-MM-DD
        #[arg(long)]
        by: NaiveDate,
    },
    List,
    /// Register a deposit toward a goal
    Deposit {
        id: String,

        #[arg(long)]
        amount: i64,
    },
}

#[derive(Subcommand, Debug)]
enum CalendarCommand {
    List,
    Add {
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        desc: String,

        #[arg(long, value_enum, default_value_t = TaskKindArg::Pago)]
        kind: TaskKindArg,
    },
    /// Mark a task completed
    Done { id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TaskKindArg {
    Pago,
    Recordatorio,
    Otro,
}

impl From<TaskKindArg> for TaskKind {
    fn from(k: TaskKindArg) -> Self {
        match k {
            TaskKindArg::Pago => TaskKind::Pago,
            TaskKindArg::Recordatorio => TaskKind::Recordatorio,
            TaskKindArg::Otro => TaskKind::Otro,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    PasteAnthropicToken,
    PasteOpenaiApiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Command::Setup => {
            setup::run_setup()?;
        }

        Command::Import { file, format, batch } => {
            import_statement(&file, format, batch, today).await?;
        }

        Command::Forget { batch } => {
            let mut data = store::load_user_data()?;
            let removed = data.forget_batch(&batch);
            if removed == 0 {
                bail!("lote desconocido: {batch} (revisa cartola txns)");
            }
            let outcome = save(&data).await?;
            store::report_outcome(&outcome);
            println!("Eliminados {removed} movimientos del lote {batch}");
        }

        Command::Clear { yes } => {
            if !yes {
                bail!("esto borra todos los movimientos importados; repite con --yes");
            }
            let mut data = store::load_user_data()?;
            let removed = data.clear_transactions();
            let outcome = save(&data).await?;
            store::report_outcome(&outcome);
            println!("Eliminados {removed} movimientos");
        }

        Command::Txns { search, sub } => {
            let data = store::load_user_data()?;
            let needle = search.map(|s| s.to_lowercase());
            let mut shown = 0usize;
            for t in &data.transactions {
                if let Some(needle) = &needle {
                    if !t.description.to_lowercase().contains(needle) {
                        continue;
                    }
                }
                if let Some(sub) = &sub {
                    if &t.sub_category != sub {
                        continue;
                    }
                }
                println!("{}", format_transaction(t));
                shown += 1;
            }
            println!("\n{shown} de {} movimientos", data.transactions.len());
        }

        Command::Classify { id, category, sub } => {
            let category = parse_category(&category)?;
            let mut data = store::load_user_data()?;
            let Some(t) = data.transactions.iter_mut().find(|t| t.id == id) else {
                bail!("movimiento desconocido: {id} (revisa cartola txns)");
            };
            t.category = Some(category);
            if let Some(sub) = sub {
                t.sub_category = sub;
            }
            let line = format_transaction(t);
            let outcome = save(&data).await?;
            store::report_outcome(&outcome);
            println!("{line}");
        }

        Command::Summary => {
            let profile = state::read_profile()?;
            let data = store::load_user_data()?;
            let snapshot = FinanceSnapshot::compute(&data.transactions, profile.monthly_income, today);
            print!("{}", report::render_summary(&snapshot, &profile.user_name));
        }

        Command::Health { income, strict } => {
            let profile = state::read_profile()?;
            let data = store::load_user_data()?;
            let income = income.unwrap_or(profile.monthly_income);
            let health = if strict {
                try_calculate_health(&data.transactions, income)?
            } else {
                if income <= 0 {
                    println!("Ingreso mensual no configurado; corre: cartola setup\n");
                }
                cartola_core::calculate_health(&data.transactions, income)
            };
            print!("{}", report::render_health(&health, income));
        }

        Command::Subs { command } => match command {
            None => {
                let data = store::load_user_data()?;
                let detected = detect_subscriptions(&data.transactions);
                print!("{}", report::render_subscriptions(&detected));
                if !data.manual_subscriptions.is_empty() {
                    println!("Suscripciones manuales:");
                    for s in &data.manual_subscriptions {
                        println!(
                            "  [{}] {:<28} {:>12}",
                            s.id,
                            s.description,
                            report::format_clp(s.monthly_amount)
                        );
                    }
                }
            }
            Some(SubsCommand::Add { desc, monthly }) => {
                let mut data = store::load_user_data()?;
                let id = next_id("sub");
                data.manual_subscriptions.push(MonthlySubscriptionEntry {
                    id: id.clone(),
                    description: desc,
                    monthly_amount: monthly,
                });
                let outcome = save(&data).await?;
                store::report_outcome(&outcome);
                println!("Suscripción agregada ({id})");
            }
            Some(SubsCommand::Rm { id }) => {
                let mut data = store::load_user_data()?;
                let before = data.manual_subscriptions.len();
                data.manual_subscriptions.retain(|s| s.id != id);
                if data.manual_subscriptions.len() == before {
                    bail!("suscripción desconocida: {id}");
                }
                let outcome = save(&data).await?;
                store::report_outcome(&outcome);
                println!("Suscripción eliminada");
            }
        },

        Command::Debts => {
            let data = store::load_user_data()?;
            let debts = debt_timeline(&data.transactions, today);
            print!("{}", report::render_debts(&debts));
        }

        Command::Projection { months, full } => {
            let data = store::load_user_data()?;
            let points = if full {
                commitment_projection(
                    &data.transactions,
                    &data.credit_operations,
                    &data.manual_subscriptions,
                    &data.savings_projects,
                    months,
                    today,
                )
            } else {
                cash_flow_projection(&data.transactions, months, today)
            };
            print!("{}", report::render_projection(&points));
        }

        Command::Credit { command } => match command {
            CreditCommand::Add {
                desc,
                total,
                installments,
                monthly,
                paid,
            } => {
                if paid > installments {
                    bail!("cuotas pagadas ({paid}) no pueden superar el total ({installments})");
                }
                let mut data = store::load_user_data()?;
                let id = next_id("credit");
                data.credit_operations.push(CreditOperation {
                    id: id.clone(),
                    description: desc,
                    total_amount: total,
                    total_installments: installments,
                    monthly_installment: monthly,
                    paid_installments: paid,
                });
                let outcome = save(&data).await?;
                store::report_outcome(&outcome);
                println!("Crédito agregado ({id})");
            }
            CreditCommand::List => {
                let data = store::load_user_data()?;
                if data.credit_operations.is_empty() {
                    println!("No hay créditos registrados.");
                }
                for c in &data.credit_operations {
                    println!(
                        "  [{}] {:<28} {}/{} cuotas de {:>12}  saldo {:>12}  {:.0}%",
                        c.id,
                        c.description,
                        c.paid_installments,
                        c.total_installments,
                        report::format_clp(c.monthly_installment),
                        report::format_clp(c.pending_balance()),
                        c.progress() * 100.0
                    );
                }
            }
            CreditCommand::Pay { id } => {
                let mut data = store::load_user_data()?;
                let Some(c) = data.credit_operations.iter_mut().find(|c| c.id == id) else {
                    bail!("crédito desconocido: {id}");
                };
                if c.paid_installments >= c.total_installments {
                    bail!("el crédito {id} ya está pagado");
                }
                c.paid_installments += 1;
                let msg = format!(
                    "Cuota {}/{} registrada para {}",
                    c.paid_installments, c.total_installments, c.description
                );
                let outcome = save(&data).await?;
                store::report_outcome(&outcome);
                println!("{msg}");
            }
        },

        Command::Savings { command } => match command {
            SavingsCommand::Add { name, target, by } => {
                let mut data = store::load_user_data()?;
                let id = next_id("goal");
                data.savings_projects.push(SavingsProject {
                    id: id.clone(),
                    name,
                    target_amount: target,
                    target_date: by,
                    saved_amount: 0,
                    created_at: today,
                });
                let outcome = save(&data).await?;
                store::report_outcome(&outcome);
                println!("Meta de ahorro agregada ({id})");
            }
            SavingsCommand::List => {
                let data = store::load_user_data()?;
                if data.savings_projects.is_empty() {
                    println!("No hay metas de ahorro.");
                }
                for p in &data.savings_projects {
                    println!(
                        "  [{}] {:<24} {:>12} de {:>12} al {}  (ahorro mensual {})",
                        p.id,
                        p.name,
                        report::format_clp(p.saved_amount),
                        report::format_clp(p.target_amount),
                        p.target_date,
                        report::format_clp(p.required_monthly(today))
                    );
                }
            }
            SavingsCommand::Deposit { id, amount } => {
                let mut data = store::load_user_data()?;
                let Some(p) = data.savings_projects.iter_mut().find(|p| p.id == id) else {
                    bail!("meta desconocida: {id}");
                };
                p.saved_amount += amount;
                let msg = format!(
                    "{}: {} de {}",
                    p.name,
                    report::format_clp(p.saved_amount),
                    report::format_clp(p.target_amount)
                );
                let outcome = save(&data).await?;
                store::report_outcome(&outcome);
                println!("{msg}");
            }
        },

        Command::Calendar { command } => match command {
            CalendarCommand::List => {
                let data = store::load_user_data()?;
                let mut tasks: Vec<&CalendarTask> = data.calendar_tasks.iter().collect();
                tasks.sort_by_key(|t| t.date);
                if tasks.is_empty() {
                    println!("No hay tareas en el calendario.");
                }
                for t in tasks {
                    let mark = if t.completed {
                        "x"
                    } else if t.is_due(today) {
                        "!"
                    } else {
                        " "
                    };
                    println!(
                        "  [{mark}] {} {} [{}] {}",
                        t.id,
                        t.date,
                        t.kind.label(),
                        t.description
                    );
                }
            }
            CalendarCommand::Add { date, desc, kind } => {
                let mut data = store::load_user_data()?;
                let id = next_id("task");
                data.calendar_tasks.push(CalendarTask {
                    id: id.clone(),
                    date,
                    description: desc,
                    kind: kind.into(),
                    completed: false,
                });
                let outcome = save(&data).await?;
                store::report_outcome(&outcome);
                println!("Tarea agregada ({id})");
            }
            CalendarCommand::Done { id } => {
                let mut data = store::load_user_data()?;
                let Some(t) = data.calendar_tasks.iter_mut().find(|t| t.id == id) else {
                    bail!("tarea desconocida: {id}");
                };
                t.completed = true;
                let outcome = save(&data).await?;
                store::report_outcome(&outcome);
                println!("Tarea completada");
            }
        },

        Command::Chat => {
            let profile = state::read_profile()?;
            let data = store::load_user_data()?;
            let cfg = config::load_config()?;
            let snapshot = FinanceSnapshot::compute(&data.transactions, profile.monthly_income, today);
            chat::run_chat(&snapshot, &cfg, &profile.user_name)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteAnthropicToken => auth::anthropic_paste_token()?,
            AuthCommand::PasteOpenaiApiKey => auth::openai_paste_api_key()?,
        },
    }

    Ok(())
}

async fn import_statement(
    file: &PathBuf,
    format: ImportFormat,
    batch: Option<String>,
    today: NaiveDate,
) -> Result<()> {
    if !file.exists() {
        bail!("archivo no encontrado: {}", file.display());
    }

    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let format = match format {
        ImportFormat::Auto if ext == "csv" => ImportFormat::Cartola,
        ImportFormat::Auto => ImportFormat::Card,
        other => other,
    };

    let records = match format {
        ImportFormat::Cartola => {
            parse_cartola_csv(file).with_context(|| format!("parsing {}", file.display()))?
        }
        ImportFormat::Card | ImportFormat::Auto => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("read {}", file.display()))?;
            parse_card_statement_text(&text)
                .with_context(|| format!("parsing {}", file.display()))?
        }
    };
    if records.is_empty() {
        bail!("no se encontraron movimientos en {}", file.display());
    }

    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("import")
        .to_lowercase()
        .replace(' ', "-");
    let batch_id =
        batch.unwrap_or_else(|| format!("{stem}-{}", chrono::Local::now().format("%Y%m%d%H%M%S")));

    let mut data = store::load_user_data()?;
    if data.imported_files.iter().any(|f| f.id == batch_id) {
        bail!("el lote {batch_id} ya existe (usa --batch para renombrarlo)");
    }

    let txns = to_transactions(&records, &batch_id);
    data.imported_files.push(ImportedFile {
        id: batch_id.clone(),
        name: file
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("import")
            .to_string(),
        kind: match format {
            ImportFormat::Cartola => FileKind::Csv,
            _ => FileKind::Pdf,
        },
        import_date: today,
        transaction_count: txns.len(),
        transaction_ids: txns.iter().map(|t| t.id.clone()).collect(),
    });
    let count = txns.len();
    data.transactions.extend(txns);

    let outcome = save(&data).await?;
    store::report_outcome(&outcome);
    println!("Importados {count} movimientos (lote {batch_id})");
    println!("Clasifícalos con: cartola classify <id> --category Necesidad|Deseo|Ahorro");
    Ok(())
}

async fn save(data: &cartola_core::UserData) -> Result<store::SaveOutcome> {
    let sync = config::load_config()?.sync;
    store::save_user_data(data, &sync).await
}

fn next_id(prefix: &str) -> String {
    format!("{prefix}-{}", chrono::Utc::now().timestamp_millis())
}

fn parse_category(s: &str) -> Result<CategoryType> {
    match s.to_lowercase().as_str() {
        "necesidad" | "need" => Ok(CategoryType::Need),
        "deseo" | "want" => Ok(CategoryType::Want),
        "ahorro" | "savings" => Ok(CategoryType::Savings),
        other => bail!("categoría desconocida: {other} (usa Necesidad, Deseo o Ahorro)"),
    }
}

fn format_transaction(t: &Transaction) -> String {
    let category = t
        .category
        .map(|c| c.label())
        .unwrap_or("Sin clasificar");
    let flow = if t.is_income { "+" } else { "-" };
    let installment = t
        .installment
        .map(|i| format!("  cuota {}/{}", i.current, i.total))
        .unwrap_or_default();
    format!(
        "  [{}] {} {}{:>12}  {:<28} {} / {}{}",
        t.id,
        t.date,
        flow,
        report::format_clp(t.amount),
        t.description,
        category,
        t.sub_category,
        installment
    )
}
