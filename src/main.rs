use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::warn;
use txlife::application::engine::TransactionEngine;
use txlife::config::EngineConfig;
use txlife::domain::ports::TransactionRepositoryBox;
use txlife::infrastructure::in_memory::InMemoryTransactionRepository;
use txlife::interfaces::csv::command_reader::CommandReader;
use txlife::interfaces::replay::Replayer;
use txlife::interfaces::report::{Report, ReportWriter};
use txlife::logging::init_logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command log CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tenant used for create rows without one; also scopes the report
    #[arg(long)]
    tenant: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[cfg(feature = "storage-rocksdb")]
fn open_repository(db_path: Option<PathBuf>) -> Result<TransactionRepositoryBox> {
    use txlife::infrastructure::rocksdb::RocksDBStore;

    Ok(match db_path {
        Some(path) => Box::new(RocksDBStore::open(path).into_diagnostic()?),
        None => Box::new(InMemoryTransactionRepository::new()),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_repository(db_path: Option<PathBuf>) -> Result<TransactionRepositoryBox> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryTransactionRepository::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path).into_diagnostic()?,
        None => EngineConfig::default(),
    };
    let engine = TransactionEngine::new(open_repository(cli.db_path)?, config);

    // Replay commands; a bad row is logged and skipped
    let replayer = Replayer::new(&engine, cli.tenant.clone());
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (line, record) in reader.commands().enumerate() {
        match record {
            Ok(record) => {
                if let Err(e) = replayer.apply(record).await {
                    warn!(row = line + 1, code = e.code(), "Error applying command: {}", e);
                }
            }
            Err(e) => {
                warn!(row = line + 1, "Error reading command: {}", e);
            }
        }
    }

    let report = Report::collect(&engine, cli.tenant.as_deref())
        .await
        .into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_report(&report).into_diagnostic()?;

    Ok(())
}
