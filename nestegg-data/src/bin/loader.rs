use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nestegg_data::BracketTierLoader;
use nestegg_db_sqlite::SqliteRepository;

/// Load bracket schedule data from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - authority: the authority name (e.g. federal, state)
/// - lower_bound: the tier's lower income bound
/// - upper_bound: the tier's upper income bound (empty for unbounded)
/// - rate: the marginal rate as a decimal (e.g. 0.10)
#[derive(Parser, Debug)]
#[command(name = "nestegg-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing bracket tier data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g. sqlite:nestegg.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:nestegg.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open CSV file: {}", args.file.display()))?;

    let records = BracketTierLoader::parse(file).context("Failed to parse CSV")?;
    println!("Parsed {} tier records.", records.len());

    let written = BracketTierLoader::load(&repo, &records)
        .await
        .context("Failed to load bracket tiers")?;
    println!("Wrote {} tiers.", written);

    Ok(())
}
