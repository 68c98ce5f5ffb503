use ergon_core::{AppError, CompanyVacancyCount, VacancySummary};
use sqlx::{Connection, PgConnection};

use crate::config::DatabaseConfig;

/// Fixed catalog of reporting queries over companies and vacancies.
///
/// Each operation opens and closes its own connection; empty result sets are
/// valid results, not errors.
pub struct QueryService {
    config: DatabaseConfig,
}

impl QueryService {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Companies that have at least one vacancy, with their vacancy counts.
    ///
    /// Inner-join semantics: a company with zero vacancies does not appear.
    pub async fn companies_and_vacancy_counts(
        &self,
    ) -> Result<Vec<CompanyVacancyCount>, AppError> {
        let mut conn = self.open("companies_and_vacancy_counts").await?;
        let rows = sqlx::query_as::<_, CompanyCountRow>(
            r#"
            SELECT company_name, COUNT(*) AS vacancy_count
            FROM companies
            JOIN vacancies ON companies.company_id = vacancies.company_id
            GROUP BY company_name
            "#,
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|e| AppError::QueryError(format!("companies_and_vacancy_counts failed: {e}")))?;

        let _ = conn.close().await;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every vacancy joined to its company.
    pub async fn all_vacancies(&self) -> Result<Vec<VacancySummary>, AppError> {
        let mut conn = self.open("all_vacancies").await?;
        let rows = sqlx::query_as::<_, VacancySummaryRow>(
            r#"
            SELECT company_name, vacancy_name, salary, link
            FROM companies
            JOIN vacancies ON companies.company_id = vacancies.company_id
            "#,
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|e| AppError::QueryError(format!("all_vacancies failed: {e}")))?;

        let _ = conn.close().await;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Arithmetic mean of `salary` across all vacancies, rounded to two
    /// decimal places. `None` when there are no vacancies.
    pub async fn average_salary(&self) -> Result<Option<f64>, AppError> {
        let mut conn = self.open("average_salary").await?;
        let avg: Option<f64> = sqlx::query_scalar(
            "SELECT ROUND(AVG(salary), 2)::DOUBLE PRECISION AS avg_salary FROM vacancies",
        )
        .fetch_one(&mut conn)
        .await
        .map_err(|e| AppError::QueryError(format!("average_salary failed: {e}")))?;

        let _ = conn.close().await;
        Ok(avg)
    }

    /// Vacancies whose salary strictly exceeds the rounded average,
    /// recomputed at query time. Ordered by company name, then salary
    /// descending.
    pub async fn vacancies_above_average(&self) -> Result<Vec<VacancySummary>, AppError> {
        let mut conn = self.open("vacancies_above_average").await?;
        let rows = sqlx::query_as::<_, VacancySummaryRow>(
            r#"
            SELECT company_name, vacancy_name, salary, link
            FROM companies
            JOIN vacancies ON companies.company_id = vacancies.company_id
            WHERE salary > (SELECT ROUND(AVG(salary), 2) FROM vacancies)
            ORDER BY company_name, salary DESC
            "#,
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|e| AppError::QueryError(format!("vacancies_above_average failed: {e}")))?;

        let _ = conn.close().await;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Vacancies whose name contains `keyword` as a case-sensitive substring.
    ///
    /// `STRPOS` keeps `%` and `_` in the keyword literal, unlike a `LIKE`
    /// pattern.
    pub async fn vacancies_matching(&self, keyword: &str) -> Result<Vec<VacancySummary>, AppError> {
        let mut conn = self.open("vacancies_matching").await?;
        let rows = sqlx::query_as::<_, VacancySummaryRow>(
            r#"
            SELECT company_name, vacancy_name, salary, link
            FROM companies
            JOIN vacancies ON companies.company_id = vacancies.company_id
            WHERE STRPOS(vacancy_name, $1) > 0
            "#,
        )
        .bind(keyword)
        .fetch_all(&mut conn)
        .await
        .map_err(|e| AppError::QueryError(format!("vacancies_matching failed: {e}")))?;

        let _ = conn.close().await;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn open(&self, operation: &str) -> Result<PgConnection, AppError> {
        self.config
            .open(&self.config.database)
            .await
            .map_err(|e| AppError::QueryError(format!("{operation}: connect failed: {e}")))
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CompanyCountRow {
    company_name: String,
    vacancy_count: i64,
}

impl From<CompanyCountRow> for CompanyVacancyCount {
    fn from(row: CompanyCountRow) -> Self {
        CompanyVacancyCount {
            company_name: row.company_name,
            vacancy_count: row.vacancy_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VacancySummaryRow {
    company_name: String,
    vacancy_name: String,
    salary: i32,
    link: String,
}

impl From<VacancySummaryRow> for VacancySummary {
    fn from(row: VacancySummaryRow) -> Self {
        VacancySummary {
            company_name: row.company_name,
            vacancy_name: row.vacancy_name,
            salary: row.salary,
            link: row.link,
        }
    }
}
