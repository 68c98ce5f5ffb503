use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use ergon_core::{CompanyVacancyCount, VacancyRecord, VacancySummary};
use ergon_db::{DatabaseConfig, IngestMode, Ingester, QueryService, SchemaInitializer};

#[derive(Parser)]
#[command(name = "ergon", version, about = "Vacancy warehouse over PostgreSQL")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and its tables
    Setup {
        /// Target database name (defaults to ERGON_DB_NAME)
        #[arg(long)]
        database: Option<String>,

        /// Skip database creation and only (re)create the tables
        #[arg(long, default_value_t = false)]
        tables_only: bool,
    },

    /// Load scraped vacancy records from a JSON file
    Ingest {
        /// Path to a JSON array of vacancy records
        #[arg(short, long)]
        input: PathBuf,

        /// Transaction granularity of the batch
        #[arg(long, value_enum, default_value_t = ModeArg::PerRecord)]
        mode: ModeArg,
    },

    /// Run one of the reporting queries
    Report {
        /// Output format for row reports
        #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
        format: OutputFormat,

        #[command(subcommand)]
        kind: ReportKind,
    },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Companies that have vacancies, with their vacancy counts
    CompanyCounts,
    /// Every vacancy with its company, salary, and link
    Vacancies,
    /// Average salary across all vacancies
    AvgSalary,
    /// Vacancies paying strictly above the average salary
    AboveAverage,
    /// Vacancies whose name contains a keyword (case-sensitive)
    Search {
        #[arg(short, long)]
        keyword: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Commit after every record; a failure keeps prior records
    PerRecord,
    /// One transaction for the whole batch; a failure keeps nothing
    Batch,
}

impl From<ModeArg> for IngestMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PerRecord => IngestMode::PerRecord,
            ModeArg::Batch => IngestMode::Batch,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ergon=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DatabaseConfig::from_env()?;

    match cli.command {
        Commands::Setup {
            database,
            tables_only,
        } => cmd_setup(config, database, tables_only).await?,
        Commands::Ingest { input, mode } => cmd_ingest(config, &input, mode.into()).await?,
        Commands::Report { format, kind } => cmd_report(config, kind, format).await?,
    }

    Ok(())
}

async fn cmd_setup(
    mut config: DatabaseConfig,
    database: Option<String>,
    tables_only: bool,
) -> Result<()> {
    if let Some(name) = database {
        config.database = name;
    }
    let name = config.database.clone();

    let schema = SchemaInitializer::new(config);
    if !tables_only {
        schema.create_database(&name).await?;
    }
    schema.create_tables(&name).await?;

    println!("Database {name} is ready.");
    Ok(())
}

async fn cmd_ingest(config: DatabaseConfig, input: &Path, mode: IngestMode) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let records: Vec<VacancyRecord> = serde_json::from_str(&raw)
        .context("Invalid input file: expected a JSON array of vacancy records")?;

    tracing::info!("Loaded {} records from {}", records.len(), input.display());

    let ingester = Ingester::with_mode(config, mode);
    let report = ingester.fill(&records).await?;

    println!(
        "Ingested {} vacancies ({} new companies).",
        report.vacancies_inserted, report.companies_created
    );
    Ok(())
}

async fn cmd_report(config: DatabaseConfig, kind: ReportKind, format: OutputFormat) -> Result<()> {
    let queries = QueryService::new(config);

    match kind {
        ReportKind::CompanyCounts => {
            let rows = queries.companies_and_vacancy_counts().await?;
            match format {
                OutputFormat::Table => print_counts(&rows),
                OutputFormat::Csv => write_csv(&rows)?,
            }
        }
        ReportKind::Vacancies => {
            print_summaries(queries.all_vacancies().await?, format)?;
        }
        ReportKind::AvgSalary => match queries.average_salary().await? {
            Some(avg) => println!("{avg:.2}"),
            None => println!("No vacancies ingested yet."),
        },
        ReportKind::AboveAverage => {
            print_summaries(queries.vacancies_above_average().await?, format)?;
        }
        ReportKind::Search { keyword } => {
            print_summaries(queries.vacancies_matching(&keyword).await?, format)?;
        }
    }

    Ok(())
}

fn print_counts(rows: &[CompanyVacancyCount]) {
    if rows.is_empty() {
        println!("No companies with vacancies.");
        return;
    }
    for row in rows {
        println!("{:<32} {:>6}", row.company_name, row.vacancy_count);
    }
    println!("\nTotal: {} companies", rows.len());
}

fn print_summaries(rows: Vec<VacancySummary>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(&rows)?,
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No vacancies found.");
                return Ok(());
            }
            for v in &rows {
                println!(
                    "{:<24} {:<32} {:>10} {}",
                    v.company_name, v.vacancy_name, v.salary, v.link
                );
            }
            println!("\nTotal: {} vacancies", rows.len());
        }
    }
    Ok(())
}

fn write_csv<T: serde::Serialize>(rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
