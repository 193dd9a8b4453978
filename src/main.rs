use asset_ledger::application::dispatcher::Dispatcher;
use asset_ledger::config::AppConfig;
use asset_ledger::domain::ports::SnapshotStoreBox;
use asset_ledger::error::ErrorKind;
use asset_ledger::infrastructure::in_memory::{InMemoryEventSink, InMemorySnapshotStore};
use asset_ledger::interfaces::csv::output_writer::OutputWriter;
use asset_ledger::interfaces::csv::request_reader::RequestReader;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input requests CSV file
    input: PathBuf,

    /// TOML file with ledger, ballot and receiver parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .with(env_filter)
        .init();
}

fn snapshot_store(db_path: Option<PathBuf>) -> Result<SnapshotStoreBox> {
    match db_path {
        Some(db_path) => persistent_store(db_path),
        None => Ok(Box::new(InMemorySnapshotStore::new())),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn persistent_store(db_path: PathBuf) -> Result<SnapshotStoreBox> {
    let store =
        asset_ledger::infrastructure::rocksdb::RocksDBStore::open(db_path).into_diagnostic()?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn persistent_store(db_path: PathBuf) -> Result<SnapshotStoreBox> {
    tracing::warn!(
        path = %db_path.display(),
        "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
    );
    Ok(Box::new(InMemorySnapshotStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path).into_diagnostic()?,
        None => AppConfig::default(),
    };
    let genesis = config.genesis().into_diagnostic()?;

    let dispatcher = Dispatcher::open(
        genesis,
        Box::new(config.receivers()),
        Box::new(InMemoryEventSink::new()),
        snapshot_store(cli.db_path)?,
    )
    .await
    .into_diagnostic()?;

    // Process requests; rejected ones are logged by the dispatcher
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    for request in reader.requests() {
        match request {
            Ok(request) => {
                if let Err(e) = dispatcher.process_request(request).await
                    && e.kind() == ErrorKind::Infrastructure
                {
                    return Err(e).into_diagnostic();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error reading request");
            }
        }
    }

    dispatcher.persist().await.into_diagnostic()?;

    let events = dispatcher.events().await.into_diagnostic()?;
    let report = dispatcher.report().await;
    let stdout = io::stdout();
    let mut writer = OutputWriter::new(stdout.lock());
    writer.write_all(&events, &report).into_diagnostic()?;

    Ok(())
}
