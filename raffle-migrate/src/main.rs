//! Raffle migration CLI.
//!
//! Deploys the VRF coordinator mock (development networks only) and the
//! Raffle contract to one or more configured networks, in order.
//!
//! # Usage
//!
//! ```bash
//! # Local node: deploys the mock, funds a subscription, deploys the Raffle
//! raffle-migrate deploy --network develop
//!
//! # Sepolia, verifying on Etherscan
//! PRIVATE_KEY=0x... ETHERSCAN_API_KEY=... raffle-migrate deploy --network sepolia
//!
//! # Only the Raffle, reusing the mock recorded by an earlier run
//! raffle-migrate deploy --network develop --tags raffle
//!
//! # Show the chain profiles and configured networks
//! raffle-migrate list
//! ```

use std::path::{Path, PathBuf};

use alloy::network::EthereumWallet;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use raffle_deploy::sequencer::Verification;
use raffle_deploy::{DeploymentReport, NetworkKind, Sequencer, Tag, networks};
use raffle_migrate::artifacts::Artifacts;
use raffle_migrate::chain::RpcBackend;
use raffle_migrate::config::Config;
use raffle_migrate::etherscan::Etherscan;
use raffle_migrate::records::RecordStore;

/// First account of a default anvil / hardhat node.
const DEV_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Raffle migration runner.
#[derive(Debug, Parser)]
#[command(name = "raffle-migrate", version, about)]
struct Cli {
    /// Configuration file. Built-in defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "deploy.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Run the migrations against one or more networks.
    Deploy {
        /// Network to deploy to. Repeat to migrate several networks in order.
        #[arg(long = "network", required = true)]
        networks: Vec<String>,

        /// Steps to run: `all`, `mocks`, `raffle` (comma separated).
        #[arg(long, value_delimiter = ',', default_value = "all")]
        tags: Vec<Tag>,

        /// Deployer key. Development networks fall back to the first
        /// default node account.
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,

        /// Etherscan API key. Verification is skipped without it.
        #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
        etherscan_api_key: Option<String>,

        /// Write the run reports as JSON to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List chain profiles and configured networks.
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Deploy {
            networks,
            tags,
            private_key,
            etherscan_api_key,
            out,
        } => {
            cmd_deploy(
                &config,
                &networks,
                &tags,
                private_key.as_deref(),
                etherscan_api_key,
                out.as_deref(),
            )
            .await
        }
        Command::List => {
            cmd_list(&config);
            Ok(())
        }
    }
}

/// Execute the `deploy` subcommand.
async fn cmd_deploy(
    config: &Config,
    networks: &[String],
    tags: &[Tag],
    private_key: Option<&str>,
    etherscan_api_key: Option<String>,
    out: Option<&Path>,
) -> Result<()> {
    let verifier = etherscan_api_key
        .filter(|key| !key.is_empty())
        .map(|key| Etherscan::new(key, config.verify.clone()))
        .transpose()?;

    let mut reports = Vec::with_capacity(networks.len());
    for network in networks {
        let report = migrate(config, network, tags, private_key, verifier.as_ref())
            .await
            .with_context(|| format!("migrating `{network}`"))?;
        log_report(&report);
        reports.push(report);
    }

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}

/// Run the migrations for a single network.
async fn migrate(
    config: &Config,
    network: &str,
    tags: &[Tag],
    private_key: Option<&str>,
    verifier: Option<&Etherscan>,
) -> Result<DeploymentReport> {
    let net = config.network(network)?;
    let profile = networks::profile(net.chain_id)?;
    if NetworkKind::of(network) != profile.kind {
        tracing::warn!(
            network,
            chain_id = net.chain_id,
            kind = %profile.kind,
            "network name and chain disagree, deploying as the chain's kind"
        );
    }
    let signer = signer_for(network, profile.kind, private_key)?;

    tracing::info!(
        network,
        chain_id = net.chain_id,
        deployer = %signer.address(),
        rpc = %net.rpc,
        "connecting"
    );

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(
            net.rpc
                .parse()
                .with_context(|| format!("invalid RPC URL: {}", net.rpc))?,
        );

    let reported = provider
        .get_chain_id()
        .await
        .context("get_chain_id failed")?;
    if reported != net.chain_id {
        bail!(
            "{} reports chain {reported}, `{network}` is configured as {}",
            net.rpc,
            net.chain_id
        );
    }

    let backend = RpcBackend::new(
        provider,
        Artifacts::new(&config.artifacts),
        RecordStore::new(&config.deployments, net.chain_id),
    );
    let report = Sequencer::new(backend, config)
        .with_verifier(verifier)
        .run(network, tags)
        .await?;
    Ok(report)
}

/// Pick the deployer key for `network`.
fn signer_for(
    network: &str,
    kind: NetworkKind,
    private_key: Option<&str>,
) -> Result<PrivateKeySigner> {
    match private_key {
        Some(key) => key.parse().context("invalid private key"),
        None if kind.is_development() => {
            tracing::warn!(network, "no private key given, using the default node account");
            Ok(DEV_PRIVATE_KEY.parse()?)
        }
        None => bail!("--private-key or PRIVATE_KEY is required for `{network}`"),
    }
}

fn log_report(report: &DeploymentReport) {
    let raffle = report.raffle.map(|r| r.deployment.address);
    let mock = report.mock.map(|m| m.address);
    match &report.verification {
        Verification::Failed { reason } => tracing::warn!(
            network = %report.network,
            ?raffle,
            %reason,
            "deployed, verification failed"
        ),
        Verification::Skipped | Verification::Verified => tracing::info!(
            network = %report.network,
            chain_id = report.chain_id,
            ?mock,
            ?raffle,
            stage = %report.stage,
            "done"
        ),
    }
}

/// Execute the `list` subcommand.
#[allow(clippy::print_stdout)]
fn cmd_list(config: &Config) {
    println!(
        "{:<12} {:<10} {:<12} {:<44} Subscription",
        "Chain ID", "Name", "Kind", "VRF coordinator"
    );
    println!("{}", "-".repeat(94));
    for p in networks::ALL {
        let coordinator = p
            .vrf_coordinator
            .map_or_else(|| "(mock)".to_owned(), |a| a.to_string());
        println!(
            "{:<12} {:<10} {:<12} {:<44} {}",
            p.chain_id, p.name, p.kind, coordinator, p.subscription_id
        );
    }

    println!();
    println!("{:<12} {:<12} {:<12} RPC", "Network", "Chain ID", "Kind");
    println!("{}", "-".repeat(94));
    for (name, net) in &config.networks {
        let kind = networks::by_chain_id(net.chain_id)
            .map_or_else(|| "(no profile)".to_owned(), |p| p.kind.to_string());
        println!("{:<12} {:<12} {:<12} {}", name, net.chain_id, kind, net.rpc);
    }
}
