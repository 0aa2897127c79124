//! Batch sender CLI
//!
//! Command-line interface for running key-file driven campaigns.

use clap::{Parser, Subcommand};
use erd_batch_sender::campaign::campaign_submitter;
use erd_batch_sender::ledger::AccountProvider;
use erd_batch_sender::wallet::{Ed25519MessageSigner, Wallet};
use erd_batch_sender::{
    build_scenario, read_keys, Campaign, Config, GatewayConfig, ProxyClient, Result, Scenario,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "erd-batch")]
#[command(about = "Batch transaction sender driven by multi-key PEM files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a campaign
    Run {
        /// Scenario to run
        #[arg(value_enum)]
        scenario: Scenario,

        /// Dry run - build and sign everything, submit nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// List the identifiers in a key file
    Keys {
        /// Multi-key PEM file
        #[arg(short, long)]
        file: PathBuf,

        /// Number of keys to read
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Check that each key derives the address it is labelled with
        #[arg(long)]
        check_wallets: bool,
    },

    /// Show the gateway's network configuration
    Network,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    dispatch(cli).await
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Only commands that use the configuration load it
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run { scenario, dry_run } => {
            run_campaign(Config::load(config_path)?, scenario, dry_run).await?;
        }
        Commands::Keys {
            file,
            count,
            check_wallets,
        } => {
            list_keys(file, count, check_wallets)?;
        }
        Commands::Network => {
            show_network(Config::load(config_path)?).await?;
        }
        Commands::Config => {
            let config = Config::load(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn gateway_client(config: &Config) -> Result<Arc<ProxyClient>> {
    let gateway = GatewayConfig::from_env(config.network, config.gateway_url.as_deref())?;
    tracing::info!(
        url = %gateway.url(),
        source = ?gateway.source(),
        network = config.network.name(),
        "Using gateway"
    );

    let client = ProxyClient::new(
        gateway.url().clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(Arc::new(client))
}

async fn run_campaign(config: Config, scenario: Scenario, dry_run: bool) -> Result<()> {
    config.validate(scenario)?;

    let client = gateway_client(&config)?;
    let submitter = campaign_submitter(
        client.clone(),
        config.audit_log_path.as_deref(),
        scenario,
        dry_run,
    );

    let builder = build_scenario(&config, scenario, Arc::new(Ed25519MessageSigner))?;
    let campaign = Campaign::new(client, submitter, config.tx_settings()).with_dry_run(dry_run);

    let report = campaign.run(builder.as_ref()).await?;

    for message in &report.messages {
        println!("{}", message);
    }
    println!(
        "{}: {} transactions {}",
        report.scenario.name(),
        report.transactions,
        if report.dry_run { "planned" } else { "submitted" }
    );

    Ok(())
}

fn list_keys(file: PathBuf, count: usize, check_wallets: bool) -> Result<()> {
    let keys = read_keys(&file, count)?;
    tracing::info!(file = %file.display(), count = keys.len(), "Read key file");

    for (index, record) in keys.into_records().enumerate() {
        if check_wallets {
            let wallet = Wallet::from_record(&record)?;
            println!("{}\t{}\t{}", index, record.public_id, wallet.address());
        } else {
            println!("{}\t{}", index, record.public_id);
        }
    }

    Ok(())
}

async fn show_network(config: Config) -> Result<()> {
    let client = gateway_client(&config)?;
    let network = client.network_config().await?;
    println!("{}", serde_json::to_string_pretty(&network)?);
    Ok(())
}
