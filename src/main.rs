use anyhow::{Context, Result};
use bankdata_loader::logging::init_logging;
use bankdata_loader::{load_source, DataSource, LoaderConfig, SqliteRepository};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "bankdata-loader", version)]
#[command(about = "Load a national bank registry file into the bank data store", long_about = None)]
struct Cli {
    /// Source to load (bundesbank, nbb, nl, lu, ch, li, at)
    source: DataSource,

    /// SQLite database path (":memory:" for a throwaway store)
    connection: String,

    /// Input file (defaults to the source's file in the data directory)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory holding the registry files [default: $BANKDATA_DIR or ./data]
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Create the tables and register the known sources before loading
    #[arg(long)]
    init_schema: bool,

    /// Print the load report as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    // Bad arguments exit here with clap's usage message and code 2
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.data_dir {
        Some(dir) => LoaderConfig::with_data_dir(dir),
        None => LoaderConfig::from_env(),
    };
    let path = config.resolve_path(cli.source, cli.file.as_deref());

    let mut repo = if cli.connection == ":memory:" {
        SqliteRepository::open_in_memory()?
    } else {
        SqliteRepository::open(Path::new(&cli.connection))?
    };

    if cli.init_schema {
        repo.setup_database().context("Failed to set up database schema")?;
    }

    let report = load_source(cli.source, &path, &mut repo).map_err(|e| {
        if e.rows_stored() > 0 {
            warn!(rows = e.rows_stored(), "source was only partially reloaded");
        }
        e
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Loaded {} rows for source '{}' ({} skipped, {} duplicates)",
            report.stored, report.source, report.skipped, report.duplicates
        );
    }

    Ok(())
}
