use crate::state::{Profile, profile_path, write_profile};
use crate::store;
use anyhow::Result;
use std::io::{self, Write};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

fn prompt_amount(label: &str) -> Result<i64> {
    loop {
        let s = prompt(label)?;
        // Accept "6137000", "6.137.000" or "$6.137.000".
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            if let Ok(v) = digits.parse::<i64>() {
                return Ok(v);
            }
        }
        println!("Monto no válido, intenta de nuevo (ej: 6137000)");
    }
}

pub fn run_setup() -> Result<()> {
    println!("Configuración de cartola\n");
    let name = prompt("Tu nombre (opcional)")?;
    let income = prompt_amount("Ingreso líquido mensual en pesos")?;

    let profile = Profile {
        created_at_utc: Some(chrono::Utc::now().to_rfc3339()),
        user_name: name.clone(),
        monthly_income: income,
        currency: "CLP".to_string(),
    };
    write_profile(&profile)?;

    // Seed the data snapshot so the name also travels with sync payloads.
    let mut data = store::load_user_data()?;
    data.user_name = name;
    let outcome = save_blocking(&data)?;
    store::report_outcome(&outcome);

    println!("\nListo:");
    println!("- {}", profile_path()?.display());
    println!("- {}", store::data_path()?.display());

    println!("\nPróximos pasos:");
    println!("- importa una cartola:    cartola import cartola-noviembre.csv");
    println!("- revisa tu salud:        cartola health");
    println!("- habilita el asistente:  cartola auth paste-anthropic-token");

    Ok(())
}

fn save_blocking(data: &cartola_core::UserData) -> Result<store::SaveOutcome> {
    // Setup runs inside #[tokio::main]; reuse the running runtime.
    let sync = crate::config::load_config()?.sync;
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        tokio::task::block_in_place(|| handle.block_on(store::save_user_data(data, &sync)))
    } else {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(store::save_user_data(data, &sync))
    }
}
