use anyhow::{Context, Result};
use budget_stats::telemetry::init_tracing;
use budget_stats::{
    load_csv, AuthorRecord, BudgetService, Config, SqliteRepository, StatsQuery,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Budget records: import, query yearly stats, manage authors
#[derive(Parser)]
#[command(name = "budget-stats", version)]
struct Cli {
    /// Database file (overrides BUDGET_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema if missing
    Init,
    /// Import budget records from a CSV file (year,month,amount,type,author)
    Import { csv: PathBuf },
    /// Add an author and print it
    AddAuthor { fio: String },
    /// Print yearly stats as JSON
    Stats {
        year: i32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long)]
        fio_filter: Option<String>,
    },
    /// Delete every entry and author
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.db_path));
    let repo = SqliteRepository::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let service = BudgetService::new(Arc::new(repo));

    match cli.command {
        Command::Init => {
            println!("✓ Database ready at {}", db_path.display());
        }
        Command::Import { csv } => run_import(&service, &csv)?,
        Command::AddAuthor { fio } => {
            let response = service.add_author(&AuthorRecord { fio })?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Stats {
            year,
            limit,
            offset,
            fio_filter,
        } => {
            let query = StatsQuery {
                year,
                limit,
                offset,
                fio_filter,
            };
            let stats = service.year_stats(&query)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Reset => {
            service.reset()?;
            println!("✓ All entries and authors removed");
        }
    }

    Ok(())
}

fn run_import(service: &BudgetService, csv_path: &Path) -> Result<()> {
    let records = load_csv(csv_path)
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;
    println!("✓ Loaded {} records from CSV", records.len());

    let inserted = service.import_records(&records)?;
    println!("✓ Inserted: {} records", inserted);

    let count = service.entry_count()?;
    println!("✓ Database contains {} entries", count);

    Ok(())
}
