//! SimpleGov daemon: entry point for loading genesis into an LMDB data
//! directory, replaying ordered blocks against it, exporting state and
//! answering queries.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use simplegov_app::{init_logging, AppConfig, AppGenesis, Block, GovApp};
use simplegov_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment, LmdbKvStore};
use simplegov_types::{Address, ProposalId};

#[derive(Parser)]
#[command(name = "simplegov-daemon", about = "SimpleGov governance ledger")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; CLI
    /// flags and env vars override them.
    #[arg(long, env = "SIMPLEGOV_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "SIMPLEGOV_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SIMPLEGOV_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SIMPLEGOV_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Load a genesis file into an empty data directory.
    Init {
        /// Genesis JSON; defaults to the config file's `genesis`.
        #[arg(long)]
        genesis: Option<PathBuf>,
    },
    /// Apply blocks from a JSON-lines file (one `{height, txs}` per line).
    Replay {
        #[arg(long)]
        blocks: PathBuf,
    },
    /// Print the current state as genesis JSON.
    Export,
    /// Check the data directory for damage.
    Check,
    /// Read ledger state.
    Query {
        #[command(subcommand)]
        query: Query,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(clap::Subcommand)]
enum Query {
    /// A proposal by id.
    Proposal { id: u64 },
    /// Every vote on a proposal.
    Votes { id: u64 },
    /// Ids of proposals awaiting resolution.
    Open,
    /// Coin balance of an address.
    Balance { address: String },
    /// Voting power of an address.
    Power { address: String },
    /// Governance parameters.
    Params,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.validate()?;

    init_logging(config.log_format()?, &config.log_level);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Config => {
            write!(out, "{}", config.to_toml_string()?)?;
        }
        Command::Check => {
            check_data_dir(&config.data_dir)?;
            let env = open_env(&config)?;
            let report = check_integrity(&env)?;
            writeln!(
                out,
                "databases checked: {}, entries: {}",
                report.databases_checked, report.total_entries
            )?;
            for error in &report.errors {
                writeln!(out, "error: {error}")?;
            }
            if !report.is_healthy() {
                bail!("{} integrity error(s) in {}", report.errors.len(), config.data_dir.display());
            }
        }
        Command::Init { genesis } => {
            let path = genesis
                .or_else(|| config.genesis.clone())
                .context("no genesis file given (use --genesis or set `genesis` in the config)")?;
            let genesis = AppGenesis::from_json_file(&path)
                .with_context(|| format!("reading genesis {}", path.display()))?;
            let env = open_env(&config)?;
            let mut app = GovApp::new(env.kv_store())?;
            let hash = app.init_chain(&genesis)?;
            writeln!(out, "{hash}")?;
        }
        Command::Replay { blocks } => {
            let env = open_env(&config)?;
            let mut app = open_app(&env)?;
            replay(&mut app, &blocks, &mut out)?;
            let summary: Vec<String> = app
                .stats()
                .snapshot()
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            tracing::info!(stats = %summary.join(" "), "replay finished");
        }
        Command::Export => {
            let env = open_env(&config)?;
            let app = open_app(&env)?;
            writeln!(out, "{}", app.export_genesis()?.to_json_string()?)?;
        }
        Command::Query { query } => {
            let env = open_env(&config)?;
            let app = open_app(&env)?;
            let value = match query {
                Query::Proposal { id } => serde_json::to_value(
                    app.query_proposal(ProposalId::new(id))?
                        .with_context(|| format!("proposal {id} not found"))?,
                )?,
                Query::Votes { id } => serde_json::to_value(app.query_votes(ProposalId::new(id))?)?,
                Query::Open => serde_json::to_value(app.query_open_proposals()?)?,
                Query::Balance { address } => {
                    serde_json::to_value(app.query_balance(&Address::new(address))?)?
                }
                Query::Power { address } => {
                    serde_json::to_value(app.query_voting_power(&Address::new(address))?)?
                }
                Query::Params => serde_json::to_value(app.query_gov_params()?)?,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
    }

    Ok(())
}

fn open_env(config: &AppConfig) -> anyhow::Result<LmdbEnvironment> {
    LmdbEnvironment::open(&config.data_dir, config.max_dbs, config.map_size)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))
}

fn open_app(env: &LmdbEnvironment) -> anyhow::Result<GovApp<LmdbKvStore>> {
    let app = GovApp::new(env.kv_store())?;
    if !app.is_initialized() {
        bail!("data directory has no genesis; run `init` first");
    }
    Ok(app)
}

/// Apply every block in `path`, printing one JSON outcome per block.
fn replay(app: &mut GovApp<LmdbKvStore>, path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let block: Block = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed block", path.display(), index + 1))?;
        let outcome = app
            .apply_block(&block)
            .with_context(|| format!("applying block at height {}", block.height))?;
        writeln!(out, "{}", serde_json::to_string(&outcome)?)?;
    }
    Ok(())
}
