use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer politely and helpfully in English.";

/// Transport the Telegram gateway listens on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Polling,
    Webhook,
}

/// Typed configuration, constructed once at startup and passed by reference
/// into the relay and the adapters.
#[derive(Clone, Debug)]
pub struct Config {
    // Required secrets / endpoints
    pub bot_token: String,
    pub openrouter_key: String,
    pub webhook_url: String,

    // Gateway
    pub transport: Transport,
    pub port: u16,
    pub restart_backoff: Duration,
    pub max_restarts: Option<u32>,
    pub message_chunk_limit: usize,

    // Completion backend
    pub completion_base_url: String,
    pub completion_model: String,
    pub system_prompt: String,
    pub max_completion_tokens: u32,
    pub completion_temperature: f32,
    pub completion_timeout: Duration,
    pub app_title: String,

    // Exchange log
    pub exchange_log_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        // Required env vars
        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        let openrouter_key = env_str("OPENROUTER_KEY").unwrap_or_default();
        let webhook_url = env_str("WEBHOOK_URL").unwrap_or_default();

        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }
        if openrouter_key.trim().is_empty() {
            return Err(Error::Config(
                "OPENROUTER_KEY environment variable is required".to_string(),
            ));
        }
        if webhook_url.trim().is_empty() {
            return Err(Error::Config(
                "WEBHOOK_URL environment variable is required".to_string(),
            ));
        }

        // Gateway
        let transport = parse_transport(env_str("TRANSPORT"))?;
        let port = env_u16("PORT").unwrap_or(8000);
        let restart_backoff = Duration::from_secs(env_u64("RESTART_BACKOFF_SECS").unwrap_or(5));
        let max_restarts = env_u32("MAX_RESTARTS");
        let message_chunk_limit = env_usize("MESSAGE_CHUNK_LIMIT").unwrap_or(4096).max(1);

        // Completion backend
        let completion_base_url = env_str("COMPLETION_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string());
        let completion_model = env_str("COMPLETION_MODEL")
            .and_then(non_empty)
            .unwrap_or_else(|| "deepseek/deepseek-chat".to_string());
        let system_prompt = env_str("SYSTEM_PROMPT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let max_completion_tokens = env_u32("COMPLETION_MAX_TOKENS").unwrap_or(300);
        let completion_temperature = env_f32("COMPLETION_TEMPERATURE").unwrap_or(0.7);
        let completion_timeout =
            Duration::from_secs(env_u64("COMPLETION_TIMEOUT_SECS").unwrap_or(40));
        let app_title = env_str("APP_TITLE")
            .and_then(non_empty)
            .unwrap_or_else(|| "Telegram Bot".to_string());

        // Exchange log
        let exchange_log_path = PathBuf::from(
            env_str("EXCHANGE_LOG_PATH").unwrap_or_else(|| "/tmp/orb-exchanges.log".to_string()),
        );

        Ok(Self {
            bot_token,
            openrouter_key,
            webhook_url,
            transport,
            port,
            restart_backoff,
            max_restarts,
            message_chunk_limit,
            completion_base_url,
            completion_model,
            system_prompt,
            max_completion_tokens,
            completion_temperature,
            completion_timeout,
            app_title,
            exchange_log_path,
        })
    }
}

fn parse_transport(v: Option<String>) -> Result<Transport> {
    let Some(v) = v.and_then(non_empty) else {
        return Ok(Transport::Polling);
    };
    match v.trim().to_lowercase().as_str() {
        "polling" => Ok(Transport::Polling),
        "webhook" => Ok(Transport::Webhook),
        other => Err(Error::Config(format!(
            "TRANSPORT must be 'polling' or 'webhook', got '{other}'"
        ))),
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_f32(key: &str) -> Option<f32> {
    env_str(key).and_then(|s| s.trim().parse::<f32>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
