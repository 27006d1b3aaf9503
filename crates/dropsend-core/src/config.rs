//! Configuration module
//!
//! Configuration is read from the process environment (and a `.env` file when present).
//! `Config::from_lookup` takes any key lookup so tests never have to mutate the environment.

use std::env;
use std::path::{Path, PathBuf};

// Common constants
const DEFAULT_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const LIST_TRANSFERS_LIMIT: i64 = 200;

/// Where the HTTP server listens: a TCP port or a unix socket path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenAddress {
    Tcp(u16),
    Unix(PathBuf),
}

impl ListenAddress {
    /// A numeric value is a TCP port, anything else is a socket path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<u16>() {
            Ok(port) => ListenAddress::Tcp(port),
            Err(_) => ListenAddress::Unix(PathBuf::from(value)),
        }
    }
}

impl std::fmt::Display for ListenAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenAddress::Tcp(port) => write!(f, "0.0.0.0:{}", port),
            ListenAddress::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub listen: ListenAddress,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Transfer engine configuration
#[derive(Clone, Debug)]
pub struct TransferConfig {
    pub base: BaseConfig,
    pub database_url: String,
    /// Directory holding the generated archives.
    pub transfers_directory: PathBuf,
    /// Directory where senders drop files and folders to be transferred.
    pub dropbox_directory: PathBuf,
    /// Whether a transfer with no active recipient becomes complete on download.
    pub complete_without_active_recipients: bool,
    pub list_transfers_limit: i64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<TransferConfig>);

impl Config {
    fn as_transfer(&self) -> &TransferConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = TransferConfig::from_lookup(lookup)?;
        Ok(Config(Box::new(config)))
    }

    /// Configuration with defaults for everything but the storage locations.
    pub fn with_roots(
        database_url: impl Into<String>,
        transfers_directory: impl Into<PathBuf>,
        dropbox_directory: impl Into<PathBuf>,
    ) -> Self {
        Config(Box::new(TransferConfig {
            base: BaseConfig {
                listen: ListenAddress::Tcp(DEFAULT_PORT),
                db_max_connections: MAX_CONNECTIONS,
                db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
                environment: "development".to_string(),
            },
            database_url: database_url.into(),
            transfers_directory: transfers_directory.into(),
            dropbox_directory: dropbox_directory.into(),
            complete_without_active_recipients: true,
            list_transfers_limit: LIST_TRANSFERS_LIMIT,
        }))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_transfer().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment().to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn listen(&self) -> &ListenAddress {
        &self.as_transfer().base.listen
    }

    pub fn environment(&self) -> &str {
        &self.as_transfer().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_transfer().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_transfer().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.as_transfer().database_url
    }

    pub fn transfers_directory(&self) -> &Path {
        &self.as_transfer().transfers_directory
    }

    pub fn dropbox_directory(&self) -> &Path {
        &self.as_transfer().dropbox_directory
    }

    pub fn complete_without_active_recipients(&self) -> bool {
        self.as_transfer().complete_without_active_recipients
    }

    pub fn list_transfers_limit(&self) -> i64 {
        self.as_transfer().list_transfers_limit
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|s| s.trim().to_lowercase())
        .and_then(|s| match s.as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl TransferConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let base = BaseConfig {
            listen: lookup("PORT")
                .filter(|s| !s.trim().is_empty())
                .map(|s| ListenAddress::parse(&s))
                .unwrap_or(ListenAddress::Tcp(DEFAULT_PORT)),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => lookup("DB_FILE")
                .map(|file| format!("sqlite://{}?mode=rwc", file))
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL or DB_FILE must be set"))?,
        };

        let config = TransferConfig {
            base,
            database_url,
            transfers_directory: lookup("TRANSFERS_DIRECTORY")
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("TRANSFERS_DIRECTORY must be set"))?,
            dropbox_directory: lookup("DROPBOX_DIRECTORY")
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("DROPBOX_DIRECTORY must be set"))?,
            complete_without_active_recipients: parse_bool(
                lookup("COMPLETE_WITHOUT_ACTIVE_RECIPIENTS"),
                true,
            ),
            list_transfers_limit: lookup("LIST_TRANSFERS_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(LIST_TRANSFERS_LIMIT),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a SQLite connection string (sqlite://...)"
            ));
        }

        if !self.transfers_directory.is_absolute() {
            return Err(anyhow::anyhow!(
                "TRANSFERS_DIRECTORY must be an absolute path, got {}",
                self.transfers_directory.display()
            ));
        }

        if !self.dropbox_directory.is_absolute() {
            return Err(anyhow::anyhow!(
                "DROPBOX_DIRECTORY must be an absolute path, got {}",
                self.dropbox_directory.display()
            ));
        }

        if self.transfers_directory == self.dropbox_directory {
            return Err(anyhow::anyhow!(
                "TRANSFERS_DIRECTORY and DROPBOX_DIRECTORY must be different directories"
            ));
        }

        if self.list_transfers_limit <= 0 {
            return Err(anyhow::anyhow!("LIST_TRANSFERS_LIMIT must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://dropsend.db"),
            ("TRANSFERS_DIRECTORY", "/srv/transfers"),
            ("DROPBOX_DIRECTORY", "/srv/dropbox"),
        ]))
        .unwrap();

        assert_eq!(config.listen(), &ListenAddress::Tcp(4000));
        assert_eq!(config.db_max_connections(), 5);
        assert!(config.complete_without_active_recipients());
        assert_eq!(config.list_transfers_limit(), 200);
        assert!(!config.is_production());
    }

    #[test]
    fn test_port_can_be_a_socket_path() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "/tmp/dropsend.sock"),
            ("DB_FILE", "/var/lib/dropsend/db.sqlite"),
            ("TRANSFERS_DIRECTORY", "/srv/transfers"),
            ("DROPBOX_DIRECTORY", "/srv/dropbox"),
            ("COMPLETE_WITHOUT_ACTIVE_RECIPIENTS", "false"),
        ]))
        .unwrap();

        assert_eq!(
            config.listen(),
            &ListenAddress::Unix(PathBuf::from("/tmp/dropsend.sock"))
        );
        assert_eq!(
            config.database_url(),
            "sqlite:///var/lib/dropsend/db.sqlite?mode=rwc"
        );
        assert!(!config.complete_without_active_recipients());
    }

    #[test]
    fn test_missing_directories_are_rejected() {
        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_relative_or_shared_roots_are_rejected() {
        let relative = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("TRANSFERS_DIRECTORY", "transfers"),
            ("DROPBOX_DIRECTORY", "/srv/dropbox"),
        ]));
        assert!(relative.is_err());

        let shared = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("TRANSFERS_DIRECTORY", "/srv/files"),
            ("DROPBOX_DIRECTORY", "/srv/files"),
        ]));
        assert!(shared.is_err());
    }
}
