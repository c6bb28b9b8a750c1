use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use std::{collections::HashMap, time::Duration};

const SETTINGS_PATH: &str = "MONEY_MANAGER_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
    /// IANA name used to cut weekly, monthly and yearly windows.
    pub timezone: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Reconnect {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub max_attempts: u32,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_connections: u32,
    pub health_interval_secs: u64,
    pub reconnect: Reconnect,
}

impl Database {
    /// Scheme and host only, safe to log.
    pub fn redacted_url(&self) -> String {
        match self.url.split_once("://") {
            Some((scheme, rest)) => {
                let authority = rest.split(['/', '?']).next().unwrap_or_default();
                let host = authority
                    .rsplit_once('@')
                    .map_or(authority, |(_, host)| host);
                format!("{scheme}://{host}")
            }
            None => self.url.split('?').next().unwrap_or_default().to_string(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Builds the settings from an explicit variable map instead of the
    /// process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let path = vars
            .get(SETTINGS_PATH)
            .cloned()
            .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());

        Config::builder()
            .set_default("app.level", "info")?
            .set_default("app.timezone", "UTC")?
            .set_default("server.bind", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.shutdown_grace_secs", 10)?
            .set_default("database.url", "sqlite:./money_manager.db?mode=rwc")?
            .set_default("database.connect_timeout_secs", 10)?
            .set_default("database.request_timeout_secs", 5)?
            .set_default("database.max_connections", 10)?
            .set_default("database.health_interval_secs", 30)?
            .set_default("database.reconnect.initial_backoff_ms", 1000)?
            .set_default("database.reconnect.max_backoff_ms", 30_000)?
            .set_default("database.reconnect.max_attempts", 10)?
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("MONEY_MANAGER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("server.port", vars.get("PORT").cloned())?
            .set_override_option("database.url", vars.get("DATABASE_URL").cloned())?
            .build()?
            .try_deserialize()
    }
}
