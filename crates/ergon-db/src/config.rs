use std::time::Duration;

use ergon_core::AppError;
use sqlx::ConnectOptions;
use sqlx::PgConnection;
use sqlx::postgres::PgConnectOptions;

/// Connection parameters for the vacancy store.
///
/// Unlike a single connection URL, the parameters are kept discrete because
/// the schema initializer addresses two databases (the administrative one and
/// the target one) with the same credentials.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database the ingester and query service operate on.
    pub database: String,
    /// Administrative database used for `CREATE DATABASE`.
    pub admin_database: String,
    /// Server-side statement timeout; `None` leaves the server default.
    pub statement_timeout: Option<Duration>,
}

impl DatabaseConfig {
    /// Read configuration from environment variables.
    ///
    /// - `ERGON_DB_HOST` (required)
    /// - `ERGON_DB_PORT` (optional, defaults to 5432)
    /// - `ERGON_DB_USER` (required)
    /// - `ERGON_DB_PASSWORD` (required)
    /// - `ERGON_DB_NAME` (required)
    /// - `ERGON_DB_ADMIN_NAME` (optional, defaults to `postgres`)
    /// - `ERGON_DB_STATEMENT_TIMEOUT_MS` (optional)
    pub fn from_env() -> Result<Self, AppError> {
        let host = require("ERGON_DB_HOST")?;
        let user = require("ERGON_DB_USER")?;
        let password = require("ERGON_DB_PASSWORD")?;
        let database = require("ERGON_DB_NAME")?;

        let port = match std::env::var("ERGON_DB_PORT") {
            Err(_) => 5432,
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid ERGON_DB_PORT '{raw}': must be a port number"
                ))
            })?,
        };

        let admin_database =
            std::env::var("ERGON_DB_ADMIN_NAME").unwrap_or_else(|_| "postgres".to_string());

        let statement_timeout = match std::env::var("ERGON_DB_STATEMENT_TIMEOUT_MS") {
            Err(_) => None,
            Ok(raw) => {
                let millis: u64 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid ERGON_DB_STATEMENT_TIMEOUT_MS '{raw}': must be milliseconds"
                    ))
                })?;
                Some(Duration::from_millis(millis))
            }
        };

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
            admin_database,
            statement_timeout,
        })
    }

    /// Connect options for an arbitrary database under these credentials.
    pub fn connect_options(&self, database: &str) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(database);
        if let Some(timeout) = self.statement_timeout {
            options = options.options([("statement_timeout", timeout.as_millis().to_string())]);
        }
        options
    }

    /// Open a single connection to the given database.
    ///
    /// The error is left untyped so each component can map it into its own
    /// error kind.
    pub(crate) async fn open(&self, database: &str) -> Result<PgConnection, sqlx::Error> {
        self.connect_options(database).connect().await
    }
}

fn require(var: &str) -> Result<String, AppError> {
    std::env::var(var)
        .map_err(|_| AppError::ConfigError(format!("{var} not set. Required for database access.")))
}
