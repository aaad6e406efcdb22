use anyhow::Result;
use cartola_core::FinanceSnapshot;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::path::PathBuf;

use crate::config::Config;
use crate::llm;
use crate::report;

#[derive(Clone, Debug)]
struct Msg {
    role: Role,
    content: String,
}

#[derive(Clone, Debug)]
enum Role {
    User,
    Assistant,
    System,
}

struct ChatLog {
    path: PathBuf,
}

impl ChatLog {
    fn open_today() -> Result<Self> {
        let home = crate::state::ensure_cartola_home()?;
        let dir = home.join("chat");
        std::fs::create_dir_all(&dir)?;
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let path = dir.join(format!("{today}.md"));
        Ok(Self { path })
    }

    fn append_system(&mut self, msg: &str) -> Result<()> {
        self.append("system", msg)
    }

    fn append_user(&mut self, msg: &str) -> Result<()> {
        self.append("user", msg)
    }

    fn append_assistant(&mut self, msg: &str) -> Result<()> {
        self.append("assistant", msg)
    }

    fn append(&mut self, role: &str, msg: &str) -> Result<()> {
        use std::io::Write;
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            f,
            "- {} [{}] {}",
            chrono::Utc::now().to_rfc3339(),
            role,
            msg.replace('\n', " ")
        )?;
        Ok(())
    }
}

pub fn run_chat(snapshot: &FinanceSnapshot, cfg: &Config, user_name: &str) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = chat_loop(&mut terminal, snapshot, cfg, user_name);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn chat_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    snapshot: &FinanceSnapshot,
    cfg: &Config,
    user_name: &str,
) -> Result<()> {
    let greeting = if user_name.is_empty() {
        "Hola, soy tu asistente de cartola. Pregúntame por tu salud financiera, deudas o suscripciones.".to_string()
    } else {
        format!(
            "Hola {user_name}, soy tu asistente de cartola. Pregúntame por tu salud financiera, deudas o suscripciones."
        )
    };
    let mut messages: Vec<Msg> = vec![Msg {
        role: Role::Assistant,
        content: greeting,
    }];

    let mut input = String::new();
    let mut show_help = true;

    // daily log file
    let mut log = ChatLog::open_today()?;
    log.append_system("session_start")?;

    let llm_config = llm::resolve_config(cfg)?;
    let system_prompt = assistant_system_prompt(snapshot);

    loop {
        terminal.draw(|f| {
            let size = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5),
                    Constraint::Min(5),
                    Constraint::Length(3),
                ])
                .split(size);

            let splash = Paragraph::new(Text::from(vec![
                Line::from(Span::styled(
                    "Cartola",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::raw("")),
                Line::from(Span::styled(
                    ">_ cartola chat",
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::styled(
                    "escribe /ayuda o ? para atajos",
                    Style::default().fg(Color::Gray),
                )),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(splash, chunks[0]);

            let header = Block::default().borders(Borders::ALL).title("conversación");

            let mut lines: Vec<Line> = Vec::new();
            if show_help {
                lines.push(Line::from(Span::styled(
                    "Atajos: Enter=enviar, q=salir, ?=ayuda",
                    Style::default().fg(Color::Gray),
                )));
                lines.push(Line::raw(
                    "Comandos: /ayuda /resumen /salud /deudas /suscripciones /proyeccion",
                ));
                lines.push(Line::raw(""));
            }

            for m in &messages {
                let (tag, color) = match m.role {
                    Role::User => ("tú", Color::Cyan),
                    Role::Assistant => ("cartola", Color::Magenta),
                    Role::System => ("sistema", Color::Gray),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", tag), Style::default().fg(color)),
                    Span::raw(m.content.clone()),
                ]));
                lines.push(Line::raw(""));
            }

            let history = Paragraph::new(Text::from(lines))
                .block(header)
                .wrap(Wrap { trim: false });
            f.render_widget(history, chunks[1]);

            let input_block = Block::default().borders(Borders::ALL).title("mensaje");
            let input_widget = Paragraph::new(input.as_str())
                .block(input_block)
                .style(Style::default().fg(Color::White));
            f.render_widget(input_widget, chunks[2]);
        })?;

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('?') => {
                        show_help = !show_help;
                    }
                    KeyCode::Enter => {
                        let trimmed = input.trim().to_string();
                        if !trimmed.is_empty() {
                            log.append_user(&trimmed)?;

                            // Slash commands answer from the snapshot, no LLM.
                            if let Some(reply) = handle_slash(snapshot, &trimmed) {
                                messages.push(Msg {
                                    role: Role::Assistant,
                                    content: reply.clone(),
                                });
                                log.append_assistant(&reply)?;
                            } else {
                                messages.push(Msg {
                                    role: Role::User,
                                    content: trimmed.clone(),
                                });

                                // With a configured LLM, ask it; otherwise (or
                                // on error) fall back to the offline answers.
                                let reply = if let Some(lc) = &llm_config {
                                    let turns = to_llm_turns(
                                        &messages,
                                        &trimmed,
                                        cfg.chat.max_turns_context,
                                    );
                                    match llm::chat_complete(lc, &system_prompt, &turns) {
                                        Ok(s) if !s.trim().is_empty() => s,
                                        _ => offline_reply(snapshot, &trimmed),
                                    }
                                } else {
                                    offline_reply(snapshot, &trimmed)
                                };

                                messages.push(Msg {
                                    role: Role::Assistant,
                                    content: reply.clone(),
                                });
                                log.append_assistant(&reply)?;
                            }
                        }
                        input.clear();
                    }
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) => {
                        input.push(c);
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

fn handle_slash(snapshot: &FinanceSnapshot, input: &str) -> Option<String> {
    let s = input.trim();
    if !s.starts_with('/') {
        return None;
    }
    match s {
        "/ayuda" | "/help" => Some(
            "Comandos:\n\
- /resumen: ingreso, gasto y deuda del mes\n\
- /salud: puntaje 50/30/20\n\
- /deudas: compras en cuotas y fecha de término\n\
- /suscripciones: cargos recurrentes detectados\n\
- /proyeccion: compromisos de los próximos meses\n\
\nAtajos: Enter=enviar, q=salir, ?=ayuda"
                .to_string(),
        ),
        "/resumen" => Some(report::render_summary(snapshot, "")),
        "/salud" => Some(report::render_health(&snapshot.health, snapshot.monthly_income)),
        "/deudas" => Some(report::render_debts(&snapshot.debts)),
        "/suscripciones" => Some(report::render_subscriptions(&snapshot.subscriptions)),
        "/proyeccion" => Some(report::render_projection(&snapshot.projection)),
        _ => Some("Comando desconocido. Prueba /ayuda".to_string()),
    }
}

fn to_llm_turns(messages: &[Msg], pending_user: &str, max_turns: usize) -> Vec<llm::ChatTurn> {
    let mut turns = Vec::new();

    // Include only recent conversation to keep it fast.
    let start = messages.len().saturating_sub(max_turns);
    for m in &messages[start..] {
        match m.role {
            Role::User => turns.push(llm::ChatTurn {
                role: "user".to_string(),
                content: m.content.clone(),
            }),
            Role::Assistant => turns.push(llm::ChatTurn {
                role: "assistant".to_string(),
                content: m.content.clone(),
            }),
            Role::System => {}
        }
    }

    turns.push(llm::ChatTurn {
        role: "user".to_string(),
        content: pending_user.to_string(),
    });

    turns
}

fn assistant_system_prompt(snapshot: &FinanceSnapshot) -> String {
    let data = serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Eres el asistente financiero de la app Cartola.\n\
Respondes en español chileno, breve y concreto, con montos en pesos (CLP).\n\
Solo usas los datos del snapshot adjunto; si falta información lo dices,\n\
nunca inventas montos ni fechas.\n\
No das consejos de inversión; te limitas a presupuesto, deudas y suscripciones.\n\
\nSnapshot de las finanzas del usuario (JSON):\n{data}"
    )
}

/// Deterministic answers when no LLM credential is configured. Keyword
/// routing over the same snapshot the slash commands read.
fn offline_reply(snapshot: &FinanceSnapshot, user: &str) -> String {
    let u = user.to_lowercase();

    if u.contains("salud") || u.contains("puntaje") || u.contains("score") {
        return report::render_health(&snapshot.health, snapshot.monthly_income);
    }
    if u.contains("deuda") || u.contains("cuota") {
        return report::render_debts(&snapshot.debts);
    }
    if u.contains("suscripc") || u.contains("netflix") || u.contains("spotify") {
        return report::render_subscriptions(&snapshot.subscriptions);
    }
    if u.contains("proyec") || u.contains("próximo") || u.contains("proximo") {
        return report::render_projection(&snapshot.projection);
    }
    if u.contains("resumen") || u.contains("gasto") || u.contains("ingreso") {
        return report::render_summary(snapshot, "");
    }

    "Puedo contarte sobre tu /resumen, /salud, /deudas, /suscripciones o /proyeccion. ¿Qué te interesa?".to_string()
}
