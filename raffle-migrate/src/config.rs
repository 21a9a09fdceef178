//! Runtime configuration loaded from `deploy.toml`.
//!
//! Maps network names to chain IDs and RPC endpoints, and locates the
//! compiled artifacts, the deployment records and the verification input.
//!
//! When no config file is present the built-in defaults are used: `develop`
//! on a local node and `sepolia` on a public RPC.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use raffle_deploy::NetworkRegistry;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding `<ContractName>.json` artifacts.
    pub artifacts: PathBuf,
    /// Directory holding per-chain deployment records.
    pub deployments: PathBuf,
    /// Known networks, keyed by name.
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Block explorer verification settings.
    pub verify: VerifyConfig,
}

/// A single deployable network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// EIP-155 chain ID the endpoint must report.
    pub chain_id: u64,
    /// JSON-RPC endpoint.
    pub rpc: String,
}

/// Etherscan-compatible verification settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifyConfig {
    /// API endpoint (Etherscan V2 multichain by default).
    pub api_url: String,
    /// Solidity standard-JSON input used to compile the Raffle.
    pub source: PathBuf,
    /// Fully qualified contract name, e.g. `contracts/Raffle.sol:Raffle`.
    pub contract_name: String,
    /// Full compiler version, e.g. `v0.8.7+commit.e28d00a7`.
    pub compiler_version: String,
    /// Status checks before giving up on a pending verification.
    pub poll_attempts: u32,
    /// Seconds between status checks.
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let networks = [
            ("develop", 31337, "http://127.0.0.1:8545"),
            ("sepolia", 11_155_111, "https://ethereum-sepolia-rpc.publicnode.com"),
        ]
        .into_iter()
        .map(|(name, chain_id, rpc)| {
            (
                name.to_owned(),
                NetworkConfig {
                    chain_id,
                    rpc: rpc.to_owned(),
                },
            )
        })
        .collect();

        Self {
            artifacts: PathBuf::from("build/contracts"),
            deployments: PathBuf::from("deployments"),
            networks,
            verify: VerifyConfig::default(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.etherscan.io/v2/api".to_owned(),
            source: PathBuf::from("build/Raffle.standard-input.json"),
            contract_name: "contracts/Raffle.sol:Raffle".to_owned(),
            compiler_version: "v0.8.7+commit.e28d00a7".to_owned(),
            poll_attempts: 10,
            poll_interval_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns [`Config::default`] if the file does not exist,
    /// allowing the binary to work without any config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Look up a configured network.
    ///
    /// # Errors
    ///
    /// Returns an error naming the known networks if `name` is not one.
    pub fn network(&self, name: &str) -> Result<&NetworkConfig> {
        self.networks.get(name).with_context(|| {
            let known: Vec<&str> = self.networks.keys().map(String::as_str).collect();
            format!("unknown network `{name}` (configured: {})", known.join(", "))
        })
    }
}

impl NetworkRegistry for Config {
    fn chain_id(&self, network: &str) -> Option<u64> {
        self.networks.get(network).map(|n| n.chain_id)
    }
}
