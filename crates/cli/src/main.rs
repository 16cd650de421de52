use clap::{Parser, Subcommand};
use ferrous_names_domain::CliOverrides;
use tracing::info;

mod bootstrap;
mod commands;
mod di;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ferrous-names")]
#[command(version)]
#[command(about = "Ferrous Names - .sol / .skr name resolution with a shared rate limiter")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// JSON-RPC endpoint
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Durable cache database path
    #[arg(long, global = true)]
    database: Option<String>,

    /// Keep the cache in memory only
    #[arg(long, global = true)]
    memory_only: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve domains (or validate wallet addresses) to addresses
    Resolve {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Find the primary domain of wallet addresses
    Reverse {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Reverse-resolve many addresses in rate-limited chunks
    Batch {
        /// Newline separated addresses, in addition to the positional ones
        #[arg(short, long, value_name = "FILE")]
        file: Option<String>,
        addresses: Vec<String>,
    },
    /// Resolve addresses not yet known so later lookups are served locally
    Warmup {
        #[arg(short, long, value_name = "FILE")]
        file: Option<String>,
        addresses: Vec<String>,
    },
    /// Search the local registry
    Search {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Drop cached reverse answers
    Invalidate {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Show cache, registry and rate limiter statistics
    Stats,
    /// Read inputs from stdin, one per line, until EOF or Ctrl-C
    Watch,
    /// Print the effective configuration as TOML
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        rpc_url: cli.rpc_url.clone(),
        database_path: cli.database.clone(),
        memory_only: cli.memory_only,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config.logging);

    let command = match cli.command {
        Command::Config { output } => return commands::show_config(&config, output.as_deref()),
        command => command,
    };

    info!("Starting Ferrous Names v{}", env!("CARGO_PKG_VERSION"));

    let services = di::NameServices::new(&config).await?;
    let outcome = commands::run(command, &services, &config, cli.json).await;
    services.shutdown().await;
    outcome
}
