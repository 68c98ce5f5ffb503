use ergon_core::AppError;
use sqlx::Connection;

use crate::config::DatabaseConfig;

const CREATE_COMPANIES: &str = r#"CREATE TABLE IF NOT EXISTS companies (
    company_id   SERIAL PRIMARY KEY,
    company_name TEXT NOT NULL
)"#;

const CREATE_VACANCIES: &str = r#"CREATE TABLE IF NOT EXISTS vacancies (
    vacancy_id   SERIAL PRIMARY KEY,
    company_id   INT NOT NULL,
    vacancy_name TEXT NOT NULL,
    salary       INT NOT NULL,
    link         TEXT NOT NULL,
    description  TEXT NOT NULL,
    requirement  TEXT NOT NULL,
    FOREIGN KEY (company_id) REFERENCES companies (company_id)
)"#;

/// One-time database and table bootstrap.
///
/// Each call opens its own connection and releases it before returning.
pub struct SchemaInitializer {
    config: DatabaseConfig,
}

impl SchemaInitializer {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Create the database `name` via the administrative database.
    ///
    /// Not idempotent: a second call fails because the database already
    /// exists. All failure causes collapse into [`AppError::SchemaError`].
    pub async fn create_database(&self, name: &str) -> Result<(), AppError> {
        ensure_identifier(name)?;

        let mut conn = self.config.open(&self.config.admin_database).await.map_err(|e| {
            AppError::SchemaError(format!(
                "connect to admin database {} failed: {e}",
                self.config.admin_database
            ))
        })?;

        // CREATE DATABASE does not accept bound parameters; the name was
        // vetted as a plain identifier above.
        let statement = format!(r#"CREATE DATABASE "{name}""#);
        sqlx::query(&statement)
            .execute(&mut conn)
            .await
            .map_err(|e| AppError::SchemaError(format!("create database {name} failed: {e}")))?;

        tracing::info!("Created database {name}");
        let _ = conn.close().await;
        Ok(())
    }

    /// Create the `companies` and `vacancies` tables in database `name`.
    ///
    /// Idempotent (`IF NOT EXISTS`); both statements run in one transaction.
    /// `companies` must come first because `vacancies` declares the foreign
    /// key.
    pub async fn create_tables(&self, name: &str) -> Result<(), AppError> {
        let mut conn = self
            .config
            .open(name)
            .await
            .map_err(|e| AppError::SchemaError(format!("connect to database {name} failed: {e}")))?;

        let mut tx = conn
            .begin()
            .await
            .map_err(|e| AppError::SchemaError(format!("begin table creation failed: {e}")))?;

        for (table, statement) in [("companies", CREATE_COMPANIES), ("vacancies", CREATE_VACANCIES)] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::SchemaError(format!("create table {table} failed: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::SchemaError(format!("commit table creation failed: {e}")))?;

        tracing::info!("Tables companies and vacancies ready in {name}");
        let _ = conn.close().await;
        Ok(())
    }
}

/// Accept only plain SQL identifiers where parameters cannot be bound.
fn ensure_identifier(name: &str) -> Result<(), AppError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::SchemaError(format!(
            "invalid database name {name:?}: expected a plain identifier"
        )))
    }
}
