//! Whisper daemon: entry point for operating a governance ledger.

mod config;
mod error;
mod request;

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use whisper_governance::{Forum, ForumApi};
use whisper_nullables::{NullContentStore, NullStore};
use whisper_proof::{DigestVerifier, HashChainTally};
use whisper_store::{ContentStore, LedgerStore};
use whisper_store_lmdb::LmdbEnvironment;
use whisper_types::SystemClock;
use whisper_utils::LogFormat;

use crate::config::{DaemonConfig, StoreBackend};
use crate::request::Dispatcher;

#[derive(Parser)]
#[command(name = "whisper-daemon", about = "Confidential governance ledger daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "WHISPER_CONFIG")]
    config: Option<PathBuf>,

    /// Storage backend.
    #[arg(long, value_enum, env = "WHISPER_STORE")]
    store: Option<StoreBackend>,

    /// Data directory for ledger storage.
    #[arg(long, env = "WHISPER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "WHISPER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "WHISPER_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Execute newline-delimited JSON requests, printing one response per line.
    Replay {
        /// Request file; "-" reads stdin.
        file: PathBuf,
    },
    /// Finalize every proposal whose voting window has closed.
    Finalize,
    /// Print forum statistics as JSON.
    Stats,
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    fn effective_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok(config)
    }
}

fn open_stores(
    config: &DaemonConfig,
) -> anyhow::Result<(Arc<dyn LedgerStore>, Arc<dyn ContentStore>)> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("memory store selected; ledger state is discarded on exit");
            let ledger: Arc<dyn LedgerStore> = Arc::new(NullStore::new());
            let content: Arc<dyn ContentStore> = Arc::new(NullContentStore::new());
            Ok((ledger, content))
        }
        StoreBackend::Lmdb => {
            std::fs::create_dir_all(&config.data_dir).with_context(|| {
                format!("creating data directory {}", config.data_dir.display())
            })?;
            let env = Arc::new(
                LmdbEnvironment::open(&config.data_dir, config.map_size)
                    .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))?,
            );
            let ledger: Arc<dyn LedgerStore> = env.clone();
            let content: Arc<dyn ContentStore> = env;
            Ok((ledger, content))
        }
    }
}

fn replay(dispatcher: &Dispatcher, file: &Path) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = if file.as_os_str() == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let handle = std::fs::File::open(file)
            .with_context(|| format!("opening request file {}", file.display()))?;
        Box::new(BufReader::new(handle))
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let (mut handled, mut failed) = (0u64, 0u64);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatcher.handle_line(&line);
        handled += 1;
        if !response.is_ok() {
            failed += 1;
        }
        serde_json::to_writer(&mut out, &response)?;
        writeln!(out)?;
    }
    tracing::info!(handled, failed, "replay finished");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;
    whisper_utils::init_logging(config.log_format, &config.log_level);

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    tracing::info!(
        store = ?config.store,
        data_dir = %config.data_dir.display(),
        "starting whisper daemon"
    );
    let (store, content) = open_stores(&config)?;
    let forum = Arc::new(Forum::new(
        store,
        Arc::new(DigestVerifier::new(config.proof_domain.as_bytes())),
        Arc::new(HashChainTally),
        Arc::new(SystemClock),
        config.ledger.clone(),
    ));

    match &cli.command {
        Command::Replay { file } => {
            let dispatcher = Dispatcher::new(ForumApi::new(Arc::clone(&forum)), content);
            replay(&dispatcher, file)?;
        }
        Command::Finalize => {
            let finalized = forum.proposals().finalize_due()?;
            println!("{finalized}");
        }
        Command::Stats => {
            let stats = forum.query().stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Config => {}
    }

    tracing::debug!(ops = ?forum.op_stats(), "operation counters");
    Ok(())
}
