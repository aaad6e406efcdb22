use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub fn cartola_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cartola"))
}

pub fn ensure_cartola_home() -> Result<PathBuf> {
    let dir = cartola_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    pub created_at_utc: Option<String>,
    #[serde(default)]
    pub user_name: String,
    /// Whole pesos per month; the health score divides by this.
    #[serde(default)]
    pub monthly_income: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "CLP".to_string()
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(ensure_cartola_home()?.join("profile.json"))
}

pub fn write_profile(profile: &Profile) -> Result<()> {
    let p = profile_path()?;
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn read_profile() -> Result<Profile> {
    let p = profile_path()?;
    if !p.exists() {
        return Ok(Profile {
            created_at_utc: None,
            user_name: String::new(),
            monthly_income: 0,
            currency: default_currency(),
        });
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}
