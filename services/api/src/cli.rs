use crate::server;
use careers::config::AppConfig;
use careers::error::AppError;
use careers::import::{import_atomic, ImportReport, JobImporter};
use careers::storage::SqliteStore;
use careers::telemetry;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "careers",
    about = "Serve multi-tenant careers pages or seed them from a jobs CSV",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Create office tenants and job postings from a jobs CSV export
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured SQLite database path
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Jobs CSV with title, location, department, job_type and related columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Override the configured SQLite database path
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// Roll back the whole import if any row fails
    #[arg(long)]
    pub(crate) atomic: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import(args) => run_import(args),
    }
}

fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(database) = args.database {
        config.storage.database_path = database;
    }
    telemetry::init(&config.telemetry)?;

    let store = SqliteStore::open(&config.storage.database_path)?;
    let report = if args.atomic {
        let file = std::fs::File::open(&args.csv)?;
        import_atomic(&store, file)?
    } else {
        let store = Arc::new(store);
        JobImporter::new(store.clone(), store).from_path(&args.csv)?
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &ImportReport) {
    println!("Import complete: {} rows", report.rows);
    println!(
        "  tenants: {} created, {} reused",
        report.tenants_created.len(),
        report.tenants_reused.len()
    );
    println!(
        "  jobs: {} inserted ({} renamed)",
        report.jobs_inserted,
        report.jobs_renamed.len()
    );
    for renamed in &report.jobs_renamed {
        println!(
            "    line {}: slug '{}' stored as '{}'",
            renamed.line, renamed.original_slug, renamed.stored_slug
        );
    }
    if !report.failures.is_empty() {
        println!("  failures: {}", report.failures.len());
        for failure in &report.failures {
            println!(
                "    line {} ({}): {}",
                failure.line,
                failure.title.as_deref().unwrap_or("untitled"),
                failure.reason
            );
        }
    }
    for slug in report.tenants_created.iter().take(5) {
        println!("  visit /{slug}/careers");
    }
}
