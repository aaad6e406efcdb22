use anyhow::{Context, Result, bail};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Pick a provider from the config, falling back to whichever credential
/// is stored. `None` means no credential at all; chat then runs in
/// offline mode.
pub fn resolve_config(cfg: &Config) -> Result<Option<LlmConfig>> {
    let a = auth::load_auth()?;
    let provider = match cfg.llm.provider.as_str() {
        "anthropic" => Some(Provider::Anthropic),
        "openai" => Some(Provider::OpenAI),
        _ => {
            if a.anthropic_token.is_some() {
                Some(Provider::Anthropic)
            } else if a.openai_api_key.is_some() {
                Some(Provider::OpenAI)
            } else {
                None
            }
        }
    };
    let Some(provider) = provider else {
        return Ok(None);
    };

    let model = if cfg.llm.model.is_empty() {
        match provider {
            Provider::Anthropic => "claude-3-5-sonnet-latest".to_string(),
            Provider::OpenAI => "gpt-4o-mini".to_string(),
        }
    } else {
        cfg.llm.model.clone()
    };

    Ok(Some(LlmConfig {
        provider,
        model,
        temperature: cfg.llm.temperature,
    }))
}

pub fn chat_complete(config: &LlmConfig, system: &str, turns: &[ChatTurn]) -> Result<String> {
    // The CLI uses #[tokio::main], so we're often already inside a runtime.
    // Creating a nested runtime and calling block_on will panic.
    //
    // Strategy:
    // - If a runtime is already running: use block_in_place + Handle::block_on
    // - Otherwise: create a runtime and block_on
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        tokio::task::block_in_place(|| {
            handle.block_on(async { chat_complete_async(config, system, turns).await })
        })
    } else {
        let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
        rt.block_on(async { chat_complete_async(config, system, turns).await })
    }
}

async fn chat_complete_async(config: &LlmConfig, system: &str, turns: &[ChatTurn]) -> Result<String> {
    match config.provider {
        Provider::Anthropic => anthropic_complete(config, system, turns).await,
        Provider::OpenAI => openai_complete(config, system, turns).await,
    }
}

async fn anthropic_complete(config: &LlmConfig, system: &str, turns: &[ChatTurn]) -> Result<String> {
    let a = auth::load_auth()?;
    let token = a.anthropic_token.ok_or_else(|| {
        anyhow::anyhow!("missing anthropic_token; run: cartola auth paste-anthropic-token")
    })?;

    #[derive(Serialize)]
    struct Msg {
        role: String,
        content: String,
    }

    #[derive(Serialize)]
    struct Req {
        model: String,
        max_tokens: i32,
        temperature: f32,
        system: String,
        messages: Vec<Msg>,
    }

    #[derive(Deserialize)]
    struct Resp {
        content: Vec<ContentBlock>,
    }

    #[derive(Deserialize)]
    struct ContentBlock {
        #[serde(rename = "type")]
        t: String,
        text: Option<String>,
    }

    let messages = turns
        .iter()
        .map(|t| Msg {
            role: t.role.clone(),
            content: t.content.clone(),
        })
        .collect();

    let body = Req {
        model: config.model.clone(),
        max_tokens: 600,
        temperature: config.temperature,
        system: system.to_string(),
        messages,
    };

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::new();
    let resp = client
        .post("https://api.anthropic.com/v1/messages")
        .headers(headers)
        .json(&body)
        .send()
        .await
        .context("anthropic request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("anthropic error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse anthropic response")?;
    let mut s = String::new();
    for b in out.content {
        if b.t == "text" {
            if let Some(t) = b.text {
                s.push_str(&t);
            }
        }
    }
    Ok(s.trim().to_string())
}

async fn openai_complete(config: &LlmConfig, system: &str, turns: &[ChatTurn]) -> Result<String> {
    let a = auth::load_auth()?;
    let key = a.openai_api_key.ok_or_else(|| {
        anyhow::anyhow!("missing openai_api_key; run: cartola auth paste-openai-api-key")
    })?;

    #[derive(Serialize)]
    struct Msg {
        role: String,
        content: String,
    }

    #[derive(Serialize)]
    struct Req {
        model: String,
        messages: Vec<Msg>,
        temperature: f32,
    }

    #[derive(Deserialize)]
    struct Resp {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: MsgOut,
    }

    #[derive(Deserialize)]
    struct MsgOut {
        content: Option<String>,
    }

    let mut msgs: Vec<Msg> = Vec::new();
    msgs.push(Msg {
        role: "system".to_string(),
        content: system.to_string(),
    });
    for t in turns {
        msgs.push(Msg {
            role: t.role.clone(),
            content: t.content.clone(),
        });
    }

    let body = Req {
        model: config.model.clone(),
        messages: msgs,
        temperature: config.temperature,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post("https://api.openai.com/v1/chat/completions")
        .header(AUTHORIZATION, format!("Bearer {key}"))
        .json(&body)
        .send()
        .await
        .context("openai request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("openai error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse openai response")?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    Ok(content.trim().to_string())
}
