//! Persistence of the user data snapshot.
//!
//! The local `~/.cartola/data.json` file is the source of truth. When sync
//! is enabled in the config, every save also pushes the snapshot to the
//! configured endpoint; a failed push degrades the save to local-only
//! instead of failing the command.

use anyhow::{Context, Result, bail};
use cartola_core::UserData;
use std::fs;
use std::path::PathBuf;

use crate::config::SyncSection;
use crate::state::ensure_cartola_home;

pub fn data_path() -> Result<PathBuf> {
    Ok(ensure_cartola_home()?.join("data.json"))
}

pub fn load_user_data() -> Result<UserData> {
    let p = data_path()?;
    if !p.exists() {
        return Ok(UserData::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let data: UserData = serde_json::from_str(&s).context("parse data.json")?;
    Ok(data.migrate())
}

fn save_local(data: &UserData) -> Result<()> {
    let p = data_path()?;
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

#[derive(Debug, Clone)]
pub enum SaveOutcome {
    LocalOnly,
    Synced,
    RemoteFailed(String),
}

pub async fn save_user_data(data: &UserData, sync: &SyncSection) -> Result<SaveOutcome> {
    save_local(data)?;
    if !sync.enabled {
        return Ok(SaveOutcome::LocalOnly);
    }
    let Some(endpoint) = sync.endpoint.as_deref() else {
        return Ok(SaveOutcome::LocalOnly);
    };
    match push_remote(endpoint, &sync.user_id, data).await {
        Ok(()) => Ok(SaveOutcome::Synced),
        Err(e) => Ok(SaveOutcome::RemoteFailed(format!("{e:#}"))),
    }
}

async fn push_remote(endpoint: &str, user_id: &str, data: &UserData) -> Result<()> {
    let url = format!("{}/user-data/{}", endpoint.trim_end_matches('/'), user_id);
    let client = reqwest::Client::new();
    let resp = client
        .put(&url)
        .json(data)
        .send()
        .await
        .context("sync request")?;
    let status = resp.status();
    if !status.is_success() {
        bail!("sync endpoint returned {status}");
    }
    Ok(())
}

/// Print a one-line note when a save didn't reach the remote.
pub fn report_outcome(outcome: &SaveOutcome) {
    match outcome {
        SaveOutcome::LocalOnly | SaveOutcome::Synced => {}
        SaveOutcome::RemoteFailed(e) => {
            println!("(saved locally; sync failed: {e})");
        }
    }
}
