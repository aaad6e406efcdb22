use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_cartola_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmSection,
    pub chat: ChatSection,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    /// "anthropic" or "openai"; an empty string picks whichever provider
    /// has a stored credential.
    pub provider: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSection {
    pub max_turns_context: usize,
}

/// Optional cloud sync of the data snapshot. Disabled by default; when a
/// push fails the save silently degrades to local-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub user_id: String,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            user_id: "local".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSection {
                provider: String::new(),
                model: String::new(),
                temperature: 0.4,
            },
            chat: ChatSection {
                max_turns_context: 12,
            },
            sync: SyncSection::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cartola_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
