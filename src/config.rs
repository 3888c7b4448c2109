//! Configuration manager for the note service.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::database::{
    DEFAULT_CREDENTIALS, DEFAULT_DATABASE_NAME, DEFAULT_POOL_SIZE,
};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Interface to listen on.
    pub address: String,
    pub port: u16,
    /// Seconds before an idle or unanswered request is dropped.
    pub timeout: u64,
    #[serde(skip_deserializing)]
    pub version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    /// Notes are kept in memory when absent.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to logs, traces and metrics export.
    #[serde(skip_serializing)]
    pub telemetry: Option<Telemetry>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_CRATE_NAME").into(),
            address: "0.0.0.0".into(),
            port: 3000,
            timeout: 120,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: None,
            telemetry: None,
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
    /// Full connection string, takes precedence over the fields above.
    #[serde(skip)]
    pub url: Option<String>,
}

impl Postgres {
    /// Connection string for the pool.
    pub fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let username = self.username.as_deref().unwrap_or(DEFAULT_CREDENTIALS);
        let password = self.password.as_deref().unwrap_or(DEFAULT_CREDENTIALS);
        let db = self.database.as_deref().unwrap_or(DEFAULT_DATABASE_NAME);
        format!("postgres://{username}:{password}@{}/{db}", self.address)
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }
}

/// Telemetry configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    /// OTLP collector receiving logs and traces.
    pub otlp: Option<String>,
    /// Port serving Prometheus metrics.
    pub metrics_port: Option<u16>,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location, then applies `PORT` and `DATABASE_URL` overrides.
    pub fn read(self) -> Arc<Self> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            PathBuf::from(DEFAULT_CONFIG_PATH)
        };

        let mut config = match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file) {
                Ok(config) => config,
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        };

        // set app version.
        config.version = VERSION.to_owned();
        config.path = file_path;
        config.overrides(
            std::env::var("PORT").ok(),
            std::env::var("DATABASE_URL").ok(),
        );

        Arc::new(config)
    }

    fn overrides(&mut self, port: Option<String>, database_url: Option<String>) {
        if let Some(port) = port {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(err) => {
                    tracing::warn!(error = %err, %port, "ignoring invalid `PORT`")
                },
            }
        }

        if let Some(url) = database_url.filter(|url| !url.is_empty()) {
            self.postgres.get_or_insert_with(Postgres::default).url = Some(url);
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found or invalid");
        Self::default()
    }
}
