//! Per-chain deployment records.
//!
//! Each chain has a `<dir>/<chain_id>.json` listing the contracts deployed
//! on it, so later runs can find an existing coordinator mock.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy::primitives::{Address, B256};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use raffle_deploy::{Contract, Deployment};
use serde::{Deserialize, Serialize};

/// A single recorded deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Contract address.
    pub address: Address,
    /// Creation transaction.
    pub transaction_hash: B256,
    /// When the deployment was confirmed.
    pub deployed_at: DateTime<Utc>,
}

/// All contracts deployed on one chain, latest deployment per contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainRecords {
    /// Records keyed by contract.
    pub contracts: BTreeMap<Contract, Record>,
}

/// Record store for a single chain.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
    chain_id: u64,
}

impl RecordStore {
    /// Records for `chain_id` under `dir`.
    pub fn new(dir: impl Into<PathBuf>, chain_id: u64) -> Self {
        Self {
            dir: dir.into(),
            chain_id,
        }
    }

    /// Path of the chain's record file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.chain_id))
    }

    /// Read the chain's records.
    ///
    /// Returns empty records if the file does not exist (first deployment).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<ChainRecords> {
        let path = self.path();
        if !path.exists() {
            return Ok(ChainRecords::default());
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
    }

    /// Latest recorded address of `contract`.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be loaded.
    pub fn address_of(&self, contract: Contract) -> Result<Option<Address>> {
        Ok(self.load()?.contracts.get(&contract).map(|r| r.address))
    }

    /// Record a confirmed deployment, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be loaded or written.
    pub fn record(&self, contract: Contract, deployment: &Deployment) -> Result<()> {
        let mut records = self.load()?;
        records.contracts.insert(
            contract,
            Record {
                address: deployment.address,
                transaction_hash: deployment.transaction_hash,
                deployed_at: Utc::now(),
            },
        );
        save(&self.dir, &self.path(), &records)
    }
}

/// Persist records atomically.
fn save(dir: &Path, path: &Path, records: &ChainRecords) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(records)?.as_bytes())
        .with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    fn store(name: &str) -> RecordStore {
        let dir = std::env::temp_dir().join(format!("raffle-records-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        RecordStore::new(dir, 31337)
    }

    #[test]
    fn empty_before_first_deployment() {
        let store = store("empty");
        assert_eq!(
            store.address_of(Contract::VrfCoordinatorV2Mock).unwrap(),
            None,
            "nothing recorded yet"
        );
    }

    #[test]
    fn latest_deployment_wins() {
        let store = store("latest");
        let first = Deployment {
            address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            transaction_hash: B256::with_last_byte(1),
        };
        let second = Deployment {
            address: address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
            transaction_hash: B256::with_last_byte(2),
        };

        store.record(Contract::VrfCoordinatorV2Mock, &first).unwrap();
        store.record(Contract::Raffle, &first).unwrap();
        store.record(Contract::VrfCoordinatorV2Mock, &second).unwrap();

        assert_eq!(
            store.address_of(Contract::VrfCoordinatorV2Mock).unwrap(),
            Some(second.address),
            "mock replaced"
        );
        assert_eq!(
            store.address_of(Contract::Raffle).unwrap(),
            Some(first.address),
            "raffle untouched"
        );
        assert!(
            store.path().ends_with("31337.json"),
            "records are keyed by chain id"
        );
        std::fs::remove_dir_all(&store.dir).unwrap();
    }
}
