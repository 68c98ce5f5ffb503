pub mod error;
pub mod models;

pub use error::AppError;
pub use models::{CompanyVacancyCount, IngestReport, VacancyRecord, VacancySummary};
