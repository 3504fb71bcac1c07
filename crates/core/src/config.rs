use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub chat: ChatConfig,
    pub payment: PaymentConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub bot_token: SecretString,
    /// Privileged user ids, fixed for the process lifetime.
    pub admin_ids: Vec<i64>,
}

#[derive(Clone, Debug)]
pub struct PaymentConfig {
    /// Present when a chat-native payment provider is wired up; absent
    /// means the flow offers the external checkout link instead.
    pub provider_token: Option<SecretString>,
    pub checkout_url: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub health_check_port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
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

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub bot_token: Option<String>,
    pub admin_ids: Option<Vec<i64>>,
    pub payment_provider_token: Option<String>,
    pub checkout_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
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
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://blossom.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            chat: ChatConfig { bot_token: String::new().into(), admin_ids: Vec::new() },
            payment: PaymentConfig {
                provider_token: None,
                checkout_url: crate::flows::engine::DEFAULT_CHECKOUT_URL.to_string(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                health_check_port: 8080,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("blossom.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            put(&mut self.database.url, database.url);
            put(&mut self.database.max_connections, database.max_connections);
            put(&mut self.database.timeout_secs, database.timeout_secs);
        }
        if let Some(chat) = patch.chat {
            put(&mut self.chat.bot_token, chat.bot_token.map(Into::into));
            put(&mut self.chat.admin_ids, chat.admin_ids);
        }
        if let Some(payment) = patch.payment {
            put(
                &mut self.payment.provider_token,
                payment.provider_token.map(|token| Some(token.into())),
            );
            put(&mut self.payment.checkout_url, payment.checkout_url);
        }
        if let Some(server) = patch.server {
            put(&mut self.server.bind_address, server.bind_address);
            put(&mut self.server.health_check_port, server.health_check_port);
        }
        if let Some(logging) = patch.logging {
            put(&mut self.logging.level, logging.level);
            put(&mut self.logging.format, logging.format);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| env::var(key).ok())
    }

    fn apply_env_from(
        &mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        put(&mut self.database.url, get("BLOSSOM_DATABASE_URL"));
        put(&mut self.chat.bot_token, get("BLOSSOM_BOT_TOKEN").map(Into::into));
        if let Some(raw_ids) = get("BLOSSOM_ADMIN_IDS") {
            self.chat.admin_ids = parse_admin_ids(&raw_ids);
        }
        // An empty value explicitly unsets the provider so the flow falls
        // back to the checkout-link path.
        if let Some(token) = get("BLOSSOM_PAYMENT_PROVIDER_TOKEN") {
            self.payment.provider_token = (!token.trim().is_empty()).then(|| token.into());
        }
        put(&mut self.payment.checkout_url, get("BLOSSOM_CHECKOUT_URL"));
        if let Some(port) = get("BLOSSOM_HEALTH_CHECK_PORT") {
            self.server.health_check_port = port.trim().parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "BLOSSOM_HEALTH_CHECK_PORT".to_string(),
                    value: port.clone(),
                }
            })?;
        }
        put(&mut self.logging.level, get("BLOSSOM_LOG_LEVEL"));
        if let Some(format) = get("BLOSSOM_LOG_FORMAT") {
            self.logging.format =
                format.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "BLOSSOM_LOG_FORMAT".to_string(),
                    value: format.clone(),
                })?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        put(&mut self.database.url, overrides.database_url);
        put(&mut self.chat.bot_token, overrides.bot_token.map(Into::into));
        put(&mut self.chat.admin_ids, overrides.admin_ids);
        put(
            &mut self.payment.provider_token,
            overrides.payment_provider_token.map(|token| Some(token.into())),
        );
        put(&mut self.payment.checkout_url, overrides.checkout_url);
        put(&mut self.logging.level, overrides.log_level);
        put(&mut self.logging.format, overrides.log_format);
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation("database.url must not be empty".to_string()));
        }
        if self.chat.bot_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "chat.bot_token must be set (file, BLOSSOM_BOT_TOKEN, or override)".to_string(),
            ));
        }
        if self.payment.checkout_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "payment.checkout_url must not be empty".to_string(),
            ));
        }
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "unsupported log level `{}` (expected one of {})",
                self.logging.level,
                LEVELS.join("|"),
            )));
        }
        Ok(())
    }
}

fn put<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Accepts the comma-separated admin list format, with `#` comments per
/// entry; non-numeric entries are skipped silently.
pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| {
            let part = part.split('#').next().unwrap_or_default().trim();
            (!part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit()))
                .then(|| part.parse().ok())
                .flatten()
        })
        .collect()
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    if let Ok(env_path) = env::var("BLOSSOM_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Some(path);
        }
    }
    let default = PathBuf::from("blossom.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    chat: Option<ChatPatch>,
    payment: Option<PaymentPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatPatch {
    bot_token: Option<String>,
    admin_ids: Option<Vec<i64>>,
}

#[derive(Debug, Default, Deserialize)]
struct PaymentPatch {
    provider_token: Option<String>,
    checkout_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    health_check_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
