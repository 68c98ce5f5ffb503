use crate::error::AppError;

/// Salary written when a record carries no published salary.
pub const SALARY_UNKNOWN: i32 = 0;

/// A scraped vacancy record as handed over by the collector.
///
/// Carries the employer name rather than a company id; the ingester
/// resolves names to ids against the companies table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VacancyRecord {
    pub employer: String,
    pub title: String,
    /// Monthly salary as published; `None` when the posting lists none.
    #[serde(default)]
    pub salary: Option<i64>,
    pub link: String,
    pub description: String,
    pub requirement: String,
}

impl VacancyRecord {
    /// Check the record against the ingestion input contract.
    ///
    /// Presence of the text fields is enforced by deserialization; this
    /// rejects the violations the type system cannot: blank identifying
    /// fields and salaries outside the stored `INT` range.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.employer.trim().is_empty() {
            return Err(AppError::ValidationError(
                "employer must not be empty".into(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(AppError::ValidationError("title must not be empty".into()));
        }
        if self.link.trim().is_empty() {
            return Err(AppError::ValidationError("link must not be empty".into()));
        }
        if let Some(salary) = self.salary {
            if salary < 0 {
                return Err(AppError::ValidationError(format!(
                    "salary must not be negative (got {salary})"
                )));
            }
            if salary > i32::MAX as i64 {
                return Err(AppError::ValidationError(format!(
                    "salary {salary} exceeds the storable range"
                )));
            }
        }
        Ok(())
    }

    /// Salary to persist, with absence normalized to [`SALARY_UNKNOWN`].
    ///
    /// Callers must have run [`validate`](Self::validate) first; out-of-range
    /// values are clamped rather than wrapped if they slip through.
    pub fn salary_or_unknown(&self) -> i32 {
        match self.salary {
            Some(s) => s.clamp(0, i32::MAX as i64) as i32,
            None => SALARY_UNKNOWN,
        }
    }
}

/// One row of the companies-and-vacancy-counts report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CompanyVacancyCount {
    pub company_name: String,
    pub vacancy_count: i64,
}

/// One row of the vacancy listing reports.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VacancySummary {
    pub company_name: String,
    pub vacancy_name: String,
    pub salary: i32,
    pub link: String,
}

/// Summary returned after a successful ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IngestReport {
    /// Companies inserted because no row with that name existed yet.
    pub companies_created: u64,
    /// Vacancy rows inserted — one per input record.
    pub vacancies_inserted: u64,
}
