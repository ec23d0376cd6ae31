use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::WeeklySchedule;

pub const DEFAULT_WAREHOUSES: &[&str] = &[
    "garage",
    "boîte-de-nuit",
    "echelle",
    "limonade-1",
    "limonade-2",
    "limonade-3",
    "pneu-1",
    "pneu-2",
    "wey",
    "video-games",
    "goyave",
    "kebab",
];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub ledger: LedgerConfig,
    pub warehouses: WarehouseConfig,
    pub discord: DiscordConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub ledger_path: PathBuf,
    pub inventory_path: Option<PathBuf>,
    pub snapshot_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub admin_password: SecretString,
    pub auto_reset: bool,
    pub reset_weekday: Weekday,
    pub reset_hour: u32,
}

#[derive(Clone, Debug)]
pub struct WarehouseConfig {
    pub allowed: Vec<String>,
    pub enforce_at_gateway: bool,
}

#[derive(Clone, Debug)]
pub struct DiscordConfig {
    pub token: SecretString,
    pub gateway_url: String,
    pub channel_prefix: String,
    pub sales_channel: String,
    pub forward_url: String,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub ledger_path: Option<PathBuf>,
    pub inventory_path: Option<PathBuf>,
    pub admin_password: Option<String>,
    pub log_level: Option<String>,
    pub discord_token: Option<String>,
    pub forward_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
            },
            database: DatabaseConfig {
                url: "sqlite://employes.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            storage: StorageConfig {
                ledger_path: PathBuf::from("ventes.json"),
                inventory_path: Some(PathBuf::from("coffres.json")),
                snapshot_interval_secs: 300,
            },
            ledger: LedgerConfig {
                admin_password: secret_value("reset06".to_string()),
                auto_reset: true,
                reset_weekday: Weekday::Sun,
                reset_hour: 23,
            },
            warehouses: WarehouseConfig {
                allowed: DEFAULT_WAREHOUSES.iter().map(|name| (*name).to_string()).collect(),
                enforce_at_gateway: false,
            },
            discord: DiscordConfig {
                token: String::new().into(),
                gateway_url: "wss://gateway.discord.gg/?v=10&encoding=json".to_string(),
                channel_prefix: "logs-".to_string(),
                sales_channel: "logs-vente".to_string(),
                forward_url: "http://127.0.0.1:5000".to_string(),
                max_retries: 10,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LedgerConfig {
    pub fn schedule(&self) -> Option<WeeklySchedule> {
        self.auto_reset
            .then_some(WeeklySchedule { weekday: self.reset_weekday, hour: self.reset_hour })
    }
}

impl WarehouseConfig {
    pub fn allows(&self, warehouse: &str) -> bool {
        let wanted = warehouse.trim().to_lowercase();
        self.allowed.iter().any(|allowed| *allowed == wanted)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("coffre.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(storage) = patch.storage {
            if let Some(ledger_path) = storage.ledger_path {
                self.storage.ledger_path = ledger_path;
            }
            if let Some(inventory_path) = storage.inventory_path {
                self.storage.inventory_path = optional_path(inventory_path);
            }
            if let Some(snapshot_interval_secs) = storage.snapshot_interval_secs {
                self.storage.snapshot_interval_secs = snapshot_interval_secs;
            }
        }

        if let Some(ledger) = patch.ledger {
            if let Some(admin_password_value) = ledger.admin_password {
                self.ledger.admin_password = secret_value(admin_password_value);
            }
            if let Some(auto_reset) = ledger.auto_reset {
                self.ledger.auto_reset = auto_reset;
            }
            if let Some(reset_weekday) = ledger.reset_weekday {
                self.ledger.reset_weekday = parse_weekday("ledger.reset_weekday", &reset_weekday)?;
            }
            if let Some(reset_hour) = ledger.reset_hour {
                self.ledger.reset_hour = reset_hour;
            }
        }

        if let Some(warehouses) = patch.warehouses {
            if let Some(allowed) = warehouses.allowed {
                self.warehouses.allowed = allowed;
            }
            if let Some(enforce_at_gateway) = warehouses.enforce_at_gateway {
                self.warehouses.enforce_at_gateway = enforce_at_gateway;
            }
        }

        if let Some(discord) = patch.discord {
            if let Some(discord_token_value) = discord.token {
                self.discord.token = secret_value(discord_token_value);
            }
            if let Some(gateway_url) = discord.gateway_url {
                self.discord.gateway_url = gateway_url;
            }
            if let Some(channel_prefix) = discord.channel_prefix {
                self.discord.channel_prefix = channel_prefix;
            }
            if let Some(sales_channel) = discord.sales_channel {
                self.discord.sales_channel = sales_channel;
            }
            if let Some(forward_url) = discord.forward_url {
                self.discord.forward_url = forward_url;
            }
            if let Some(max_retries) = discord.max_retries {
                self.discord.max_retries = max_retries;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("COFFRE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some((key, value)) = read_env_alias(&["COFFRE_SERVER_PORT", "PORT"]) {
            self.server.port = parse_u16(key, &value)?;
        }
        if let Some(value) = read_env("COFFRE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("COFFRE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("COFFRE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("COFFRE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("COFFRE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("COFFRE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("COFFRE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("COFFRE_STORAGE_LEDGER_PATH") {
            self.storage.ledger_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("COFFRE_STORAGE_INVENTORY_PATH") {
            self.storage.inventory_path = optional_path(PathBuf::from(value));
        }
        if let Some(value) = read_env("COFFRE_STORAGE_SNAPSHOT_INTERVAL_SECS") {
            self.storage.snapshot_interval_secs =
                parse_u64("COFFRE_STORAGE_SNAPSHOT_INTERVAL_SECS", &value)?;
        }

        if let Some((_, value)) = read_env_alias(&["COFFRE_LEDGER_ADMIN_PASSWORD", "ADMIN_PASSWORD"])
        {
            self.ledger.admin_password = secret_value(value);
        }
        if let Some(value) = read_env("COFFRE_LEDGER_AUTO_RESET") {
            self.ledger.auto_reset = parse_bool("COFFRE_LEDGER_AUTO_RESET", &value)?;
        }
        if let Some(value) = read_env("COFFRE_LEDGER_RESET_WEEKDAY") {
            self.ledger.reset_weekday = parse_weekday("COFFRE_LEDGER_RESET_WEEKDAY", &value)?;
        }
        if let Some(value) = read_env("COFFRE_LEDGER_RESET_HOUR") {
            self.ledger.reset_hour = parse_u32("COFFRE_LEDGER_RESET_HOUR", &value)?;
        }

        if let Some(value) = read_env("COFFRE_WAREHOUSES_ALLOWED") {
            self.warehouses.allowed = value.split(',').map(str::to_string).collect();
        }
        if let Some(value) = read_env("COFFRE_WAREHOUSES_ENFORCE_AT_GATEWAY") {
            self.warehouses.enforce_at_gateway =
                parse_bool("COFFRE_WAREHOUSES_ENFORCE_AT_GATEWAY", &value)?;
        }

        if let Some((_, value)) = read_env_alias(&["COFFRE_DISCORD_TOKEN", "DISCORD_TOKEN"]) {
            self.discord.token = secret_value(value);
        }
        if let Some(value) = read_env("COFFRE_DISCORD_GATEWAY_URL") {
            self.discord.gateway_url = value;
        }
        if let Some(value) = read_env("COFFRE_DISCORD_CHANNEL_PREFIX") {
            self.discord.channel_prefix = value;
        }
        if let Some(value) = read_env("COFFRE_DISCORD_SALES_CHANNEL") {
            self.discord.sales_channel = value;
        }
        if let Some(value) = read_env("COFFRE_DISCORD_FORWARD_URL") {
            self.discord.forward_url = value;
        }
        if let Some(value) = read_env("COFFRE_DISCORD_MAX_RETRIES") {
            self.discord.max_retries = parse_u32("COFFRE_DISCORD_MAX_RETRIES", &value)?;
        }

        if let Some((_, value)) = read_env_alias(&["COFFRE_LOGGING_LEVEL", "COFFRE_LOG_LEVEL"]) {
            self.logging.level = value;
        }
        if let Some((_, value)) = read_env_alias(&["COFFRE_LOGGING_FORMAT", "COFFRE_LOG_FORMAT"])
        {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(ledger_path) = overrides.ledger_path {
            self.storage.ledger_path = ledger_path;
        }
        if let Some(inventory_path) = overrides.inventory_path {
            self.storage.inventory_path = optional_path(inventory_path);
        }
        if let Some(admin_password) = overrides.admin_password {
            self.ledger.admin_password = secret_value(admin_password);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(discord_token) = overrides.discord_token {
            self.discord.token = secret_value(discord_token);
        }
        if let Some(forward_url) = overrides.forward_url {
            self.discord.forward_url = forward_url;
        }
    }

    fn normalize(&mut self) {
        self.warehouses.allowed = self
            .warehouses
            .allowed
            .iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        self.discord.channel_prefix = self.discord.channel_prefix.trim().to_lowercase();
        self.discord.sales_channel = self.discord.sales_channel.trim().to_lowercase();
        self.discord.forward_url = self.discord.forward_url.trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_database(&self.database)?;
        validate_storage(&self.storage)?;
        validate_ledger(&self.ledger)?;
        validate_logging(&self.logging)?;
        Ok(())
    }

    /// Extra checks for running the chat listener, which needs a bot token.
    pub fn validate_listener(&self) -> Result<(), ConfigError> {
        validate_discord(&self.discord)?;
        if self.warehouses.allowed.is_empty() {
            return Err(ConfigError::Validation(
                "warehouses.allowed must list at least one warehouse for the listener".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("coffre.toml"), PathBuf::from("config/coffre.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

/// `none`/`off` or an empty path disables the inventory snapshot.
fn optional_path(path: PathBuf) -> Option<PathBuf> {
    let raw = path.to_string_lossy();
    let disabled = raw.trim().is_empty()
        || raw.eq_ignore_ascii_case("none")
        || raw.eq_ignore_ascii_case("off");
    (!disabled).then_some(path)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    if storage.ledger_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("storage.ledger_path must not be empty".to_string()));
    }

    if storage.inventory_path.is_some() && storage.snapshot_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "storage.snapshot_interval_secs must be greater than zero when storage.inventory_path is set"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_ledger(ledger: &LedgerConfig) -> Result<(), ConfigError> {
    if ledger.admin_password.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "ledger.admin_password must not be empty (set ADMIN_PASSWORD)".to_string(),
        ));
    }

    if ledger.reset_hour > 23 {
        return Err(ConfigError::Validation(
            "ledger.reset_hour must be in range 0..=23".to_string(),
        ));
    }

    Ok(())
}

fn validate_discord(discord: &DiscordConfig) -> Result<(), ConfigError> {
    if discord.token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "discord.token is required. Get it from https://discord.com/developers/applications > Your App > Bot > Reset Token"
                .to_string(),
        ));
    }

    let gateway_url = discord.gateway_url.trim();
    if !gateway_url.starts_with("wss://") && !gateway_url.starts_with("ws://") {
        return Err(ConfigError::Validation(
            "discord.gateway_url must start with ws:// or wss://".to_string(),
        ));
    }

    if !discord.forward_url.starts_with("http://") && !discord.forward_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "discord.forward_url must start with http:// or https://".to_string(),
        ));
    }

    if discord.channel_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "discord.channel_prefix must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn read_env_alias<'a>(keys: &[&'a str]) -> Option<(&'a str, String)> {
    keys.iter().find_map(|key| read_env(key).map(|value| (*key, value)))
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_weekday(key: &str, value: &str) -> Result<Weekday, ConfigError> {
    value.trim().parse::<Weekday>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    database: Option<DatabasePatch>,
    storage: Option<StoragePatch>,
    ledger: Option<LedgerPatch>,
    warehouses: Option<WarehousePatch>,
    discord: Option<DiscordPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    ledger_path: Option<PathBuf>,
    inventory_path: Option<PathBuf>,
    snapshot_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LedgerPatch {
    admin_password: Option<String>,
    auto_reset: Option<bool>,
    reset_weekday: Option<String>,
    reset_hour: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct WarehousePatch {
    allowed: Option<Vec<String>>,
    enforce_at_gateway: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscordPatch {
    token: Option<String>,
    gateway_url: Option<String>,
    channel_prefix: Option<String>,
    sales_channel: Option<String>,
    forward_url: Option<String>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
