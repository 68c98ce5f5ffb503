pub mod config;
pub mod ingest;
pub mod query;
pub mod schema;

pub use config::DatabaseConfig;
pub use ingest::{IngestMode, Ingester};
pub use query::QueryService;
pub use schema::SchemaInitializer;
