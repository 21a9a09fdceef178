//! Per-network deployment parameters for the Raffle contract.
//!
//! Every chain the Raffle can be deployed to has exactly one [`ChainProfile`]
//! in [`ALL`]. Development chains carry no VRF coordinator: the migration
//! deploys a mock and opens a fresh subscription on it instead.

use std::fmt;

use alloy::primitives::{Address, B256, U256, address, b256};
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

/// Network names treated as local development chains.
///
/// Membership is an exact, case-sensitive match.
pub const DEVELOPMENT_CHAINS: &[&str] = &["develop", "development", "localhost", "hardhat"];

/// Returns `true` if `network` names a development chain.
#[must_use]
pub fn is_development(network: &str) -> bool {
    DEVELOPMENT_CHAINS.contains(&network)
}

/// Whether a chain is a local development chain or a public one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// Local chain: the VRF coordinator is mocked and funded per run.
    Development,
    /// Public chain with a live VRF coordinator.
    Production,
}

impl NetworkKind {
    /// Classify a network by name.
    #[must_use]
    pub fn of(network: &str) -> Self {
        if is_development(network) {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Returns `true` for [`NetworkKind::Development`].
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

/// Raffle constructor parameters for a single chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainProfile {
    /// EIP-155 chain ID.
    pub chain_id: u64,
    /// Canonical network name.
    pub name: &'static str,
    /// Development or production.
    pub kind: NetworkKind,
    /// Live VRF coordinator, absent on development chains.
    pub vrf_coordinator: Option<Address>,
    /// Ticket price in wei.
    pub entrance_fee: U256,
    /// VRF key hash selecting the gas price tier.
    pub gas_lane: B256,
    /// Prepaid VRF subscription. Zero on development chains, where it is
    /// replaced by the subscription opened on the mock.
    pub subscription_id: u64,
    /// Gas ceiling for the coordinator's `fulfillRandomWords` callback.
    pub callback_gas_limit: u32,
    /// Seconds between raffle rounds.
    pub interval: U256,
}

/// 0.01 ether.
const ENTRANCE_FEE: U256 = U256::from_limbs([10_000_000_000_000_000, 0, 0, 0]);

/// 30 gwei key hash shared by the listed chains.
const GAS_LANE: B256 = b256!("787d74caea10b2b357790d5b5247c2f63d1d91572a9846f780606e4d953677ae");

const CALLBACK_GAS_LIMIT: u32 = 50_000;

const INTERVAL: U256 = U256::from_limbs([30, 0, 0, 0]);

/// All known chain profiles (single source of truth).
pub const ALL: &[ChainProfile] = &[
    ChainProfile {
        chain_id: 11_155_111,
        name: "sepolia",
        kind: NetworkKind::Production,
        vrf_coordinator: Some(address!("8103B0A8A00be2DDC778e6e7eaa21791Cd364625")),
        entrance_fee: ENTRANCE_FEE,
        gas_lane: GAS_LANE,
        subscription_id: 0,
        callback_gas_limit: CALLBACK_GAS_LIMIT,
        interval: INTERVAL,
    },
    ChainProfile {
        chain_id: 31337,
        name: "develop",
        kind: NetworkKind::Development,
        vrf_coordinator: None,
        entrance_fee: ENTRANCE_FEE,
        gas_lane: GAS_LANE,
        subscription_id: 0,
        callback_gas_limit: CALLBACK_GAS_LIMIT,
        interval: INTERVAL,
    },
];

/// Look up a [`ChainProfile`] by chain ID.
#[must_use]
pub fn by_chain_id(chain_id: u64) -> Option<&'static ChainProfile> {
    ALL.iter().find(|p| p.chain_id == chain_id)
}

/// Look up a [`ChainProfile`] by chain ID, failing on unknown chains.
///
/// # Errors
///
/// Returns [`DeployError::ConfigNotFound`] if no profile exists for `chain_id`.
pub fn profile(chain_id: u64) -> Result<&'static ChainProfile> {
    by_chain_id(chain_id).ok_or(DeployError::ConfigNotFound(chain_id))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use alloy::primitives::utils::parse_ether;

    use super::*;

    #[test]
    fn chain_ids_are_unique() {
        let ids: HashSet<u64> = ALL.iter().map(|p| p.chain_id).collect();
        assert_eq!(ids.len(), ALL.len(), "duplicate chain id in profile table");
    }

    #[test]
    fn every_listed_chain_resolves() {
        for p in ALL {
            let found = profile(p.chain_id).unwrap();
            assert_eq!(found, p, "lookup returned a different profile");
            assert!(!found.entrance_fee.is_zero(), "{} has no entrance fee", p.name);
            assert!(!found.gas_lane.is_zero(), "{} has no gas lane", p.name);
            assert!(found.callback_gas_limit > 0, "{} has no gas limit", p.name);
            assert!(!found.interval.is_zero(), "{} has no interval", p.name);
        }
    }

    #[test]
    fn unknown_chain_is_config_not_found() {
        let err = profile(1).unwrap_err();
        assert!(
            matches!(err, DeployError::ConfigNotFound(1)),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn kind_matches_development_set() {
        for p in ALL {
            assert_eq!(NetworkKind::of(p.name), p.kind, "kind mismatch for {}", p.name);
        }
    }

    #[test]
    fn production_chains_have_a_coordinator() {
        for p in ALL.iter().filter(|p| p.kind == NetworkKind::Production) {
            assert!(p.vrf_coordinator.is_some(), "{} lacks a coordinator", p.name);
        }
    }

    #[test]
    fn development_membership_is_exact() {
        assert!(is_development("develop"));
        assert!(is_development("localhost"));
        assert!(!is_development("Develop"));
        assert!(!is_development("develop "));
        assert!(!is_development("sepolia"));
    }

    #[test]
    fn constants_match_their_ether_values() {
        assert_eq!(ENTRANCE_FEE, parse_ether("0.01").unwrap(), "entrance fee");
        assert_eq!(INTERVAL, U256::from(30), "interval");
    }
}
