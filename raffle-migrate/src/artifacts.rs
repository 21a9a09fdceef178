//! Compiled contract artifacts.
//!
//! Reads `<dir>/<ContractName>.json` as written by Truffle or Hardhat
//! (`"bytecode": "0x…"`) or Foundry (`"bytecode": { "object": "0x…" }`).

use std::path::{Path, PathBuf};

use alloy::primitives::Bytes;
use anyhow::{Context, Result, bail};
use raffle_deploy::Contract;
use serde::{Deserialize, Deserializer};

/// Creation bytecode as found in either artifact layout.
fn deserialize_bytecode<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BytecodeField {
        Hex(Bytes),
        Object { object: Bytes },
    }
    match BytecodeField::deserialize(deserializer)? {
        BytecodeField::Hex(b) | BytecodeField::Object { object: b } => Ok(b),
    }
}

/// The parts of an artifact needed to deploy.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    /// Contract name, when the artifact records it.
    #[serde(default, rename = "contractName")]
    pub contract_name: Option<String>,
    /// Creation bytecode.
    #[serde(deserialize_with = "deserialize_bytecode")]
    pub bytecode: Bytes,
}

impl Artifact {
    /// Parse an artifact from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON has no usable creation bytecode.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        if artifact.bytecode.is_empty() {
            bail!("artifact has empty bytecode (abstract contract or interface?)");
        }
        Ok(artifact)
    }
}

/// Artifact directory.
#[derive(Debug, Clone)]
pub struct Artifacts {
    dir: PathBuf,
}

impl Artifacts {
    /// Use artifacts under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the artifact for `contract`.
    #[must_use]
    pub fn path(&self, contract: Contract) -> PathBuf {
        self.dir.join(format!("{}.json", contract.name()))
    }

    /// Load the artifact for `contract`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, or names a
    /// different contract.
    pub fn load(&self, contract: Contract) -> Result<Artifact> {
        let path = self.path(contract);
        let artifact = read(&path)?;
        if let Some(name) = &artifact.contract_name
            && name != contract.name()
        {
            bail!("{} holds `{name}`, expected `{contract}`", path.display());
        }
        Ok(artifact)
    }
}

fn read(path: &Path) -> Result<Artifact> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Artifact::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truffle_layout() {
        let a = Artifact::from_json(r#"{"contractName":"Raffle","abi":[],"bytecode":"0x6080"}"#)
            .unwrap();
        assert_eq!(a.contract_name.as_deref(), Some("Raffle"), "name");
        assert_eq!(a.bytecode.as_ref(), &[0x60, 0x80], "bytecode");
    }

    #[test]
    fn foundry_layout() {
        let a = Artifact::from_json(r#"{"abi":[],"bytecode":{"object":"0x6080","linkReferences":{}}}"#)
            .unwrap();
        assert_eq!(a.contract_name, None, "name");
        assert_eq!(a.bytecode.as_ref(), &[0x60, 0x80], "bytecode");
    }

    #[test]
    fn empty_bytecode_is_rejected() {
        assert!(
            Artifact::from_json(r#"{"contractName":"IRaffle","bytecode":"0x"}"#).is_err(),
            "interfaces cannot be deployed"
        );
    }

    #[test]
    fn mismatched_name_is_rejected() {
        let dir = std::env::temp_dir().join(format!("raffle-artifacts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("Raffle.json"),
            r#"{"contractName":"Lottery","bytecode":"0x6080"}"#,
        )
        .unwrap();

        let err = Artifacts::new(&dir).load(Contract::Raffle).unwrap_err();
        assert!(err.to_string().contains("Lottery"), "{err}");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
