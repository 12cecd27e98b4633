//! Configuration loading for the waiting-room API.
//!
//! Loads layered `.env` files and process environment variables, producing a
//! typed [`AppConfig`] that is built once at startup and passed explicitly to
//! whatever needs it.

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment keys the loader understands. Anything else in the environment
/// or in `.env` files is ignored.
const RECOGNIZED_KEYS: &[&str] = &[
    "PROFILE",
    "API_BIND_ADDR",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "CORS_ALLOWED_ORIGINS",
    "DATABASE_URL",
    "DB_HOST",
    "DB_PORT",
    "DB_USER",
    "DB_PASSWORD",
    "DB_PASS",
    "DB_NAME",
    "DB_MAX_CONNECTIONS",
    "DB_ACQUIRE_TIMEOUT_MS",
];

const REDACTED: &str = "[REDACTED]";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Origins allowed by CORS. Empty means every origin is mirrored back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Connection parameters for the providers database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DatabaseConfig {
    /// Full connection URL; when set it wins over the discrete `DB_*` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            cors_allowed_origins: Vec::new(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            name: default_db_name(),
            max_connections: default_db_max_connections(),
            acquire_timeout_ms: default_db_acquire_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Returns the URL used to open connections.
    ///
    /// Without an explicit `DATABASE_URL` this composes a `mysql://` URL from
    /// the discrete fields, percent-encoding the credentials.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Ok(url.to_string());
        }

        let invalid = |message: &str| ConfigError::InvalidDatabaseUrl {
            message: message.to_string(),
        };

        let mut url = Url::parse(&format!("mysql://{}", self.host))
            .map_err(|e| invalid(&format!("invalid host '{}': {}", self.host, e)))?;
        url.set_port(Some(self.port))
            .map_err(|_| invalid("cannot set port on database url"))?;
        url.set_username(&self.user)
            .map_err(|_| invalid("cannot set user on database url"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| invalid("cannot set password on database url"))?;
        }
        url.set_path(&self.name);

        Ok(url.to_string())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_none() {
            if self.host.trim().is_empty() {
                return Err(ConfigError::MissingDatabaseHost);
            }
            if self.port == 0 {
                return Err(ConfigError::InvalidDatabasePort { value: self.port });
            }
            if self.name.trim().is_empty() {
                return Err(ConfigError::MissingDatabaseName);
            }
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections {
                value: self.max_connections,
            });
        }

        self.connection_url().map(|_| ())
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if !config.database.password.is_empty() {
            config.database.password = REDACTED.to_string();
        }
        if let Some(url) = config.database.url.as_deref() {
            config.database.url = Some(redact_url_password(url));
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        for origin in &self.cors_allowed_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::InvalidCorsOrigin {
                    origin: origin.clone(),
                });
            }
        }

        self.database.validate()
    }
}

fn redact_url_password(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some(REDACTED)).is_ok() {
                url.to_string()
            } else {
                REDACTED.to_string()
            }
        }
        _ => raw.to_string(),
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_db_user() -> String {
    "root".to_string()
}

fn default_db_name() -> String {
    "waiting_room".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("invalid CORS origin '{origin}'")]
    InvalidCorsOrigin { origin: String },
    #[error("database host is empty; set DB_HOST or DATABASE_URL")]
    MissingDatabaseHost,
    #[error("database name is empty; set DB_NAME or DATABASE_URL")]
    MissingDatabaseName,
    #[error("database port must be non-zero, got {value}")]
    InvalidDatabasePort { value: u16 },
    #[error("database max connections must be at least 1, got {value}")]
    InvalidMaxConnections { value: u32 },
    #[error("invalid database url: {message}")]
    InvalidDatabaseUrl { message: String },
}

/// Loads configuration from layered `.env` files and the process environment.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads and validates the configuration.
    ///
    /// Later layers win: `.env`, `.env.local`, `.env.{profile}`,
    /// `.env.{profile}.local`, then the process environment.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        for key in RECOGNIZED_KEYS {
            if let Ok(value) = env::var(key) {
                layered.insert((*key).to_string(), value);
            }
        }

        let profile = take_non_empty(&mut layered, "PROFILE").unwrap_or(profile_hint);
        let api_bind_addr =
            take_non_empty(&mut layered, "API_BIND_ADDR").unwrap_or_else(default_api_bind_addr);
        let log_level = take_non_empty(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format =
            take_non_empty(&mut layered, "LOG_FORMAT").unwrap_or_else(default_log_format);
        let cors_allowed_origins = take_non_empty(&mut layered, "CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        // DB_PASS is the older spelling; DB_PASSWORD wins when both are set.
        let password = take_non_empty(&mut layered, "DB_PASSWORD")
            .or_else(|| take_non_empty(&mut layered, "DB_PASS"))
            .unwrap_or_default();

        let database = DatabaseConfig {
            url: take_non_empty(&mut layered, "DATABASE_URL"),
            host: take_non_empty(&mut layered, "DB_HOST").unwrap_or_else(default_db_host),
            port: take_parsed(&mut layered, "DB_PORT")?.unwrap_or_else(default_db_port),
            user: take_non_empty(&mut layered, "DB_USER").unwrap_or_else(default_db_user),
            password,
            name: take_non_empty(&mut layered, "DB_NAME").unwrap_or_else(default_db_name),
            max_connections: take_parsed(&mut layered, "DB_MAX_CONNECTIONS")?
                .unwrap_or_else(default_db_max_connections),
            acquire_timeout_ms: take_parsed(&mut layered, "DB_ACQUIRE_TIMEOUT_MS")?
                .unwrap_or_else(default_db_acquire_timeout_ms),
        };

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            cors_allowed_origins,
            database,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("PROFILE")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if RECOGNIZED_KEYS.contains(&key.as_str()) {
                        values.insert(key, value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_non_empty(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values.remove(key).filter(|v| !v.trim().is_empty())
}

fn take_parsed<T: std::str::FromStr>(
    values: &mut BTreeMap<String, String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match take_non_empty(values, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}
