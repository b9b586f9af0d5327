// ============================
// gymdesk-backend/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gymdesk.toml";

/// Prefix of the environment variables read by [`Settings::load`]
pub const ENV_PREFIX: &str = "GYMDESK_";

/// Development-only signing secret; the server warns while it is in use
pub const DEVELOPMENT_SECRET: &str = "gymdesk-development-secret";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MIN_SECRET_LENGTH: usize = 16;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level (`RUST_LOG` overrides it)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Session TTL in seconds
    pub session_ttl_secs: u64,
    /// Secret used to sign session tokens
    pub secret_key: String,
    /// Mark the session cookie `Secure` (set behind HTTPS)
    pub secure_cookies: bool,
    /// Take the client address from `X-Real-IP`/`X-Forwarded-For`.
    /// Enable only behind a reverse proxy that overwrites them.
    pub trust_proxy_headers: bool,
    /// Which store backs users and the audit log
    pub storage: StorageSettings,
    /// MySQL connection parameters
    pub database: DatabaseSettings,
    /// scrypt work factor
    pub password_hash: PasswordHashSettings,
    /// Login throttling
    pub login_throttle: LoginThrottleSettings,
    /// Account seeded into an empty user table
    pub bootstrap_admin: BootstrapAdmin,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Mysql,
    FlatFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Root directory of the flat-file store
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PasswordHashSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoginThrottleSettings {
    /// Consecutive failures before a client is locked out
    pub max_attempts: u32,
    /// Lockout duration in seconds
    pub lockout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    /// Generated and logged once when absent
    pub password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            session_ttl_secs: 60 * 60 * 12, // 12 hours
            secret_key: DEVELOPMENT_SECRET.to_string(),
            secure_cookies: false,
            trust_proxy_headers: false,
            storage: StorageSettings::default(),
            database: DatabaseSettings::default(),
            password_hash: PasswordHashSettings::default(),
            login_throttle: LoginThrottleSettings::default(),
            bootstrap_admin: BootstrapAdmin::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Mysql,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: "railway".to_string(),
            max_connections: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl Default for PasswordHashSettings {
    fn default() -> Self {
        Self {
            log_n: scrypt::Params::RECOMMENDED_LOG_N,
            r: scrypt::Params::RECOMMENDED_R,
            p: scrypt::Params::RECOMMENDED_P,
        }
    }
}

impl Default for LoginThrottleSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 5 * 60,
        }
    }
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            display_name: "Administrator".to_string(),
            email: Some("admin@gymdesk.local".to_string()),
            password: None,
        }
    }
}

/// Maps the platform-provided variables (Railway style) onto settings keys.
fn platform_env() -> Env {
    Env::raw().filter_map(|key| {
        let mapped = match key.as_str().to_ascii_uppercase().as_str() {
            "MYSQLHOST" => Some("database.host"),
            "MYSQLPORT" => Some("database.port"),
            "MYSQLUSER" => Some("database.user"),
            "MYSQLPASSWORD" => Some("database.password"),
            "MYSQLDATABASE" => Some("database.name"),
            "SECRET_KEY" => Some("secret_key"),
            _ => None,
        };
        mapped.map(Into::into)
    })
}

impl Settings {
    /// Layered configuration: defaults, then the TOML file, then
    /// `GYMDESK_*` variables, then the platform variables.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(platform_env())
    }

    /// Load settings using [`DEFAULT_CONFIG_FILE`]
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from an explicit TOML file (missing files are skipped)
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let settings: Settings = Self::figment(path)
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for values the server cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "log_level must be one of {LOG_LEVELS:?}, got '{}'",
                self.log_level
            )));
        }

        if self.session_ttl_secs == 0 {
            return Err(AppError::Config("session_ttl_secs must be positive".to_string()));
        }

        if self.secret_key.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Config(format!(
                "secret_key must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        self.password_hash.params()?;

        if self.database.max_connections == 0 {
            return Err(AppError::Config("database.max_connections must be positive".to_string()));
        }

        if self.login_throttle.max_attempts == 0 {
            return Err(AppError::Config("login_throttle.max_attempts must be positive".to_string()));
        }

        Ok(())
    }

    /// True while the built-in development secret is in use
    pub fn uses_development_secret(&self) -> bool {
        self.secret_key == DEVELOPMENT_SECRET
    }
}

impl PasswordHashSettings {
    /// Cheapest parameters scrypt accepts; for tests only
    pub fn insecure_fast() -> Self {
        Self { log_n: 4, r: 8, p: 1 }
    }

    /// Convert to scrypt parameters
    pub fn params(&self) -> Result<scrypt::Params, AppError> {
        scrypt::Params::new(self.log_n, self.r, self.p, scrypt::Params::RECOMMENDED_LEN)
            .map_err(|e| AppError::Config(format!("invalid scrypt parameters: {e}")))
    }
}
