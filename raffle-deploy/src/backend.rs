//! Collaborators the sequencer drives.
//!
//! The sequencer only decides *what* to deploy and with which arguments.
//! Signing, broadcasting, artifact loading and block-explorer calls live
//! behind these traits so the decision logic can be exercised without a
//! chain.

use std::collections::HashMap;
use std::future::Future;
use std::hash::BuildHasher;

use alloy::primitives::aliases::U96;
use alloy::primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};

use crate::contracts::Contract;
use crate::error::BoxError;

/// Outcome of a confirmed contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Address of the created contract.
    pub address: Address,
    /// Hash of the creation transaction.
    pub transaction_hash: B256,
}

/// Deploys contracts and talks to the coordinator on a single chain.
///
/// Every call blocks until its transaction is confirmed.
pub trait DeploymentBackend {
    /// Deploy `contract` with already ABI-encoded constructor arguments.
    fn deploy(
        &self,
        contract: Contract,
        constructor_args: Bytes,
    ) -> impl Future<Output = Result<Deployment, BoxError>> + Send;

    /// Address of a previously deployed instance of `contract`, if any.
    fn deployed_instance(
        &self,
        contract: Contract,
    ) -> impl Future<Output = Result<Option<Address>, BoxError>> + Send;

    /// Open a subscription on `coordinator` and return its ID.
    fn create_subscription(
        &self,
        coordinator: Address,
    ) -> impl Future<Output = Result<u64, BoxError>> + Send;

    /// Fund `subscription_id` on `coordinator` with `amount` LINK wei.
    fn fund_subscription(
        &self,
        coordinator: Address,
        subscription_id: u64,
        amount: U96,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Maps network names onto EIP-155 chain IDs.
pub trait NetworkRegistry {
    /// Chain ID configured for `network`.
    fn chain_id(&self, network: &str) -> Option<u64>;
}

impl<T: NetworkRegistry + ?Sized> NetworkRegistry for &T {
    fn chain_id(&self, network: &str) -> Option<u64> {
        (**self).chain_id(network)
    }
}

impl<S: BuildHasher> NetworkRegistry for HashMap<String, u64, S> {
    fn chain_id(&self, network: &str) -> Option<u64> {
        self.get(network).copied()
    }
}

/// Publishes contract source to a block explorer.
pub trait SourceVerifier {
    /// Verify the contract at `address` deployed with `constructor_args`.
    fn verify(
        &self,
        chain_id: u64,
        address: Address,
        constructor_args: &Bytes,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

impl<T: SourceVerifier + Sync + ?Sized> SourceVerifier for &T {
    fn verify(
        &self,
        chain_id: u64,
        address: Address,
        constructor_args: &Bytes,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).verify(chain_id, address, constructor_args)
    }
}

/// Placeholder verifier for sequencers built without a credential.
///
/// It has no values, so it can never be called.
#[derive(Debug, Clone, Copy)]
pub enum NoVerifier {}

impl SourceVerifier for NoVerifier {
    async fn verify(
        &self,
        _chain_id: u64,
        _address: Address,
        _constructor_args: &Bytes,
    ) -> Result<(), BoxError> {
        match *self {}
    }
}
