use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use coffre_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use serde::Serialize;
use toml::Value;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct ConfigRow {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("config", "config_validation", error.to_string(), 2);
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let rows: Vec<ConfigRow> = effective_values(&config)
        .into_iter()
        .map(|(key, value, env_keys)| ConfigRow {
            key,
            value,
            source: field_source(
                key,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        })
        .collect();

    match serde_json::to_value(&rows) {
        Ok(data) => CommandResult::success_with_data(
            "config",
            "effective config (source precedence: env > file > default)",
            Some(data),
        ),
        Err(error) => CommandResult::failure("config", "serialization", error.to_string(), 1),
    }
}

fn effective_values(config: &AppConfig) -> Vec<(&'static str, String, &'static [&'static str])> {
    vec![
        row(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["COFFRE_SERVER_BIND_ADDRESS"],
        ),
        row("server.port", config.server.port.to_string(), &["COFFRE_SERVER_PORT", "PORT"]),
        row(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["COFFRE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        row("database.url", config.database.url.clone(), &["COFFRE_DATABASE_URL"]),
        row(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["COFFRE_DATABASE_MAX_CONNECTIONS"],
        ),
        row(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["COFFRE_DATABASE_TIMEOUT_SECS"],
        ),
        row(
            "storage.ledger_path",
            config.storage.ledger_path.display().to_string(),
            &["COFFRE_STORAGE_LEDGER_PATH"],
        ),
        row(
            "storage.inventory_path",
            config
                .storage
                .inventory_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<unset>".to_string()),
            &["COFFRE_STORAGE_INVENTORY_PATH"],
        ),
        row(
            "storage.snapshot_interval_secs",
            config.storage.snapshot_interval_secs.to_string(),
            &["COFFRE_STORAGE_SNAPSHOT_INTERVAL_SECS"],
        ),
        row(
            "ledger.admin_password",
            redact_secret(config.ledger.admin_password.expose_secret()),
            &["COFFRE_LEDGER_ADMIN_PASSWORD", "ADMIN_PASSWORD"],
        ),
        row("ledger.auto_reset", config.ledger.auto_reset.to_string(), &["COFFRE_LEDGER_AUTO_RESET"]),
        row(
            "ledger.reset_weekday",
            config.ledger.reset_weekday.to_string(),
            &["COFFRE_LEDGER_RESET_WEEKDAY"],
        ),
        row("ledger.reset_hour", config.ledger.reset_hour.to_string(), &["COFFRE_LEDGER_RESET_HOUR"]),
        row(
            "warehouses.allowed",
            config.warehouses.allowed.join(","),
            &["COFFRE_WAREHOUSES_ALLOWED"],
        ),
        row(
            "warehouses.enforce_at_gateway",
            config.warehouses.enforce_at_gateway.to_string(),
            &["COFFRE_WAREHOUSES_ENFORCE_AT_GATEWAY"],
        ),
        row(
            "discord.token",
            redact_token(config.discord.token.expose_secret()),
            &["COFFRE_DISCORD_TOKEN", "DISCORD_TOKEN"],
        ),
        row(
            "discord.gateway_url",
            config.discord.gateway_url.clone(),
            &["COFFRE_DISCORD_GATEWAY_URL"],
        ),
        row(
            "discord.channel_prefix",
            config.discord.channel_prefix.clone(),
            &["COFFRE_DISCORD_CHANNEL_PREFIX"],
        ),
        row(
            "discord.sales_channel",
            config.discord.sales_channel.clone(),
            &["COFFRE_DISCORD_SALES_CHANNEL"],
        ),
        row(
            "discord.forward_url",
            config.discord.forward_url.clone(),
            &["COFFRE_DISCORD_FORWARD_URL"],
        ),
        row(
            "discord.max_retries",
            config.discord.max_retries.to_string(),
            &["COFFRE_DISCORD_MAX_RETRIES"],
        ),
        row(
            "logging.level",
            config.logging.level.clone(),
            &["COFFRE_LOGGING_LEVEL", "COFFRE_LOG_LEVEL"],
        ),
        row(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["COFFRE_LOGGING_FORMAT", "COFFRE_LOG_FORMAT"],
        ),
    ]
}

fn row(
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
) -> (&'static str, String, &'static [&'static str]) {
    (key, value, env_keys)
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("coffre.toml"), PathBuf::from("config/coffre.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

/// Blank values count as unset, the same way the loader skips them.
fn env_is_set(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Discord bot tokens are three dot-separated parts; only the first (the
/// base64 bot id) is shown.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('.') {
        return format!("{prefix}.***");
    }

    "<redacted>".to_string()
}

fn redact_secret(secret: &str) -> String {
    let shown = if secret.trim().is_empty() { "<empty>" } else { "<redacted>" };
    shown.to_string()
}
