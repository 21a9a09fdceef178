//! Error types for the deployment sequence.

use alloy::primitives::Address;

use crate::contracts::Contract;

/// Error type returned by collaborator backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = DeployError> = std::result::Result<T, E>;

/// Errors raised while sequencing a deployment.
///
/// Everything except [`DeployError::VerificationFailure`] aborts the run.
/// Contracts deployed before the failure are left in place.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DeployError {
    /// The network name has no chain ID in the registry.
    #[error("network `{0}` is not registered")]
    UnknownNetwork(String),

    /// No deployment profile exists for the chain.
    #[error("no deployment profile for chain {0}")]
    ConfigNotFound(u64),

    /// A production chain profile has no VRF coordinator address.
    #[error("chain {0} has no VRF coordinator configured")]
    MissingCoordinator(u64),

    /// A development deployment needs a mock coordinator but none exists.
    #[error("no {contract} deployed on network `{network}`, run the mocks step first")]
    MockNotDeployed {
        /// Contract that was looked up.
        contract: Contract,
        /// Network that was searched.
        network: String,
    },

    /// Looking up a previously deployed mock failed.
    #[error("looking up the {contract} deployed on network `{network}` failed")]
    MockLookupFailure {
        /// Contract that was looked up.
        contract: Contract,
        /// Network that was searched.
        network: String,
        /// Underlying backend error.
        #[source]
        source: BoxError,
    },

    /// A contract deployment reverted or was rejected.
    #[error("deploying {contract} failed")]
    DeployFailure {
        /// Contract being deployed.
        contract: Contract,
        /// Underlying backend error.
        #[source]
        source: BoxError,
    },

    /// Opening a subscription on the coordinator failed.
    #[error("creating a subscription on {coordinator} failed")]
    SubscriptionFailure {
        /// Coordinator the subscription was requested from.
        coordinator: Address,
        /// Underlying backend error.
        #[source]
        source: BoxError,
    },

    /// Funding an already created subscription failed. The subscription is
    /// left unfunded.
    #[error("funding subscription {subscription_id} on {coordinator} failed")]
    SubscriptionFundingFailure {
        /// Coordinator holding the subscription.
        coordinator: Address,
        /// Subscription that stayed unfunded.
        subscription_id: u64,
        /// Underlying backend error.
        #[source]
        source: BoxError,
    },

    /// Source verification failed. The contract itself is live.
    #[error("verifying {address} failed")]
    VerificationFailure {
        /// Deployed contract address.
        address: Address,
        /// Underlying verifier error.
        #[source]
        source: BoxError,
    },
}
