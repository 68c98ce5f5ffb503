use ergon_core::{AppError, IngestReport, VacancyRecord};
use sqlx::{Connection, PgConnection};

use crate::config::DatabaseConfig;

/// Transaction granularity for [`Ingester::fill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Commit after every record. A mid-batch failure leaves the records
    /// committed before it persisted.
    #[default]
    PerRecord,
    /// One transaction around the whole batch; a failure rolls back all of it.
    Batch,
}

/// Write path: turns scraped vacancy records into company and vacancy rows,
/// de-duplicating companies by employer name.
pub struct Ingester {
    config: DatabaseConfig,
    mode: IngestMode,
}

impl Ingester {
    /// Create an ingester with per-record durability.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            mode: IngestMode::PerRecord,
        }
    }

    /// Create an ingester with an explicit transaction mode.
    pub fn with_mode(config: DatabaseConfig, mode: IngestMode) -> Self {
        Self { config, mode }
    }

    /// Ingest a batch of records in input order.
    ///
    /// The whole batch is validated before anything is written, so a
    /// [`AppError::ValidationError`] never leaves partial state behind. Any
    /// store error aborts the remaining records and surfaces as
    /// [`AppError::IngestionError`]; in [`IngestMode::PerRecord`] mode the
    /// records committed before it stay persisted.
    ///
    /// Re-running the same batch doubles the vacancy rows while reusing the
    /// existing company rows; the write path is not idempotent.
    pub async fn fill(&self, records: &[VacancyRecord]) -> Result<IngestReport, AppError> {
        for (index, record) in records.iter().enumerate() {
            record.validate().map_err(|e| match e {
                AppError::ValidationError(msg) => {
                    AppError::ValidationError(format!("record {index}: {msg}"))
                }
                other => other,
            })?;
        }

        tracing::info!(
            records = records.len(),
            mode = ?self.mode,
            "Ingesting vacancy batch"
        );

        let mut conn = self
            .config
            .open(&self.config.database)
            .await
            .map_err(|e| AppError::IngestionError(format!("connect failed: {e}")))?;

        let mut report = IngestReport::default();
        match self.mode {
            IngestMode::PerRecord => {
                for record in records {
                    let mut tx = conn.begin().await.map_err(|e| {
                        AppError::IngestionError(format!("begin transaction failed: {e}"))
                    })?;
                    ingest_record(&mut tx, record, &mut report).await?;
                    tx.commit().await.map_err(|e| {
                        AppError::IngestionError(format!("commit of record failed: {e}"))
                    })?;
                }
            }
            IngestMode::Batch => {
                let mut tx = conn.begin().await.map_err(|e| {
                    AppError::IngestionError(format!("begin transaction failed: {e}"))
                })?;
                for record in records {
                    ingest_record(&mut tx, record, &mut report).await?;
                }
                tx.commit()
                    .await
                    .map_err(|e| AppError::IngestionError(format!("commit of batch failed: {e}")))?;
            }
        }

        tracing::info!(
            companies_created = report.companies_created,
            vacancies_inserted = report.vacancies_inserted,
            "Ingestion complete"
        );
        let _ = conn.close().await;
        Ok(report)
    }
}

/// Write one record: resolve (or create) the company row, then insert the
/// vacancy row referencing it.
async fn ingest_record(
    conn: &mut PgConnection,
    record: &VacancyRecord,
    report: &mut IngestReport,
) -> Result<(), AppError> {
    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT company_id FROM companies WHERE company_name = $1")
            .bind(&record.employer)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::IngestionError(format!("company lookup failed: {e}")))?;

    let company_id = match existing {
        Some((id,)) => id,
        None => {
            let (id,): (i32,) = sqlx::query_as(
                "INSERT INTO companies (company_name) VALUES ($1) RETURNING company_id",
            )
            .bind(&record.employer)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::IngestionError(format!("insert into companies failed: {e}")))?;

            tracing::debug!(employer = %record.employer, company_id = id, "Created company");
            report.companies_created += 1;
            id
        }
    };

    sqlx::query(
        r#"
        INSERT INTO vacancies (company_id, vacancy_name, salary, link, description, requirement)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(company_id)
    .bind(&record.title)
    .bind(record.salary_or_unknown())
    .bind(&record.link)
    .bind(&record.description)
    .bind(&record.requirement)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::IngestionError(format!("insert into vacancies failed: {e}")))?;

    report.vacancies_inserted += 1;
    Ok(())
}
