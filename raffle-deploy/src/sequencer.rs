//! The two migration steps and the order they run in.
//!
//! A run for one network moves through a fixed pipeline:
//!
//! ```text
//! PendingMock -> MockReady | MockSkipped -> RaffleDeployed -> Verified | VerifySkipped | VerifyFailed
//! ```
//!
//! 1. **Mocks** deploys `VRFCoordinatorV2Mock` on development networks and
//!    opens a funded subscription on it. Production networks skip it.
//! 2. **Raffle** deploys the Raffle wired to the mock (development) or to
//!    the coordinator from the chain profile (production), then submits the
//!    source for verification when a verifier is configured.
//!
//! The mock's address and subscription are returned from step 1 and passed
//! explicitly into step 2.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

use crate::backend::{Deployment, DeploymentBackend, NetworkRegistry, NoVerifier, SourceVerifier};
use crate::contracts::{Contract, RaffleArgs, SUBSCRIPTION_FUND_AMOUNT, mock_constructor_args};
use crate::error::{DeployError, Result};
use crate::networks::{self, ChainProfile, NetworkKind};

/// Labels selecting which steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Every step.
    All,
    /// The coordinator mock.
    Mocks,
    /// The Raffle.
    Raffle,
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "mocks" => Ok(Self::Mocks),
            "raffle" => Ok(Self::Raffle),
            other => Err(format!("unknown tag `{other}` (expected all, mocks or raffle)")),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Mocks => "mocks",
            Self::Raffle => "raffle",
        })
    }
}

/// A migration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Deploy and fund the coordinator mock.
    Mocks,
    /// Deploy the Raffle.
    Raffle,
}

impl Step {
    /// Tags this step answers to.
    #[must_use]
    pub const fn tags(self) -> &'static [Tag] {
        match self {
            Self::Mocks => &[Tag::All, Tag::Mocks],
            Self::Raffle => &[Tag::All, Tag::Raffle],
        }
    }

    /// Whether `selected` includes this step. No tags selects every step.
    #[must_use]
    pub fn selected_by(self, selected: &[Tag]) -> bool {
        selected.is_empty() || selected.iter().any(|t| self.tags().contains(t))
    }
}

/// Where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing has run yet.
    PendingMock,
    /// The mock is deployed and its subscription funded.
    MockReady,
    /// The mocks step did not apply.
    MockSkipped,
    /// The Raffle is live.
    RaffleDeployed,
    /// The Raffle source was verified.
    Verified,
    /// Verification did not apply.
    VerifySkipped,
    /// Verification was attempted and failed.
    VerifyFailed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PendingMock => "pending_mock",
            Self::MockReady => "mock_ready",
            Self::MockSkipped => "mock_skipped",
            Self::RaffleDeployed => "raffle_deployed",
            Self::Verified => "verified",
            Self::VerifySkipped => "verify_skipped",
            Self::VerifyFailed => "verify_failed",
        })
    }
}

/// A coordinator mock with a funded subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockCoordinator {
    /// Mock address.
    pub address: Address,
    /// Subscription opened on the mock.
    pub subscription_id: u64,
}

/// A deployed Raffle and the exact arguments it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleDeployment {
    /// Address and creation transaction.
    #[serde(flatten)]
    pub deployment: Deployment,
    /// Constructor arguments passed at creation.
    pub args: RaffleArgs,
}

impl RaffleDeployment {
    /// ABI-encoded constructor arguments, as sent with the creation code.
    #[must_use]
    pub fn constructor_args(&self) -> Bytes {
        self.args.abi_encode()
    }
}

/// Result of the verification step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    /// Development network or no credential.
    Skipped,
    /// The block explorer accepted the source.
    Verified,
    /// Verification failed; the Raffle is live regardless.
    Failed {
        /// Error chain reported by the verifier.
        reason: String,
    },
}

/// Everything a run produced for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReport {
    /// Network name.
    pub network: String,
    /// Resolved chain ID.
    pub chain_id: u64,
    /// Development or production.
    pub kind: NetworkKind,
    /// Mock provisioned by this run.
    pub mock: Option<MockCoordinator>,
    /// Raffle deployed by this run.
    pub raffle: Option<RaffleDeployment>,
    /// Verification result.
    pub verification: Verification,
    /// Last stage reached.
    pub stage: Stage,
}

/// Choose the Raffle constructor arguments for `profile`.
///
/// On development chains the coordinator and subscription come from `mock`
/// and the profile's values are ignored. On production chains they come
/// from the profile and `mock` is ignored. The remaining parameters always
/// come from the profile. `network` only names the target in errors.
///
/// # Errors
///
/// - [`DeployError::MockNotDeployed`] for a development chain without a
///   mock.
/// - [`DeployError::MissingCoordinator`] for a production profile without a
///   coordinator.
pub fn resolve_args(
    network: &str,
    profile: &ChainProfile,
    mock: Option<MockCoordinator>,
) -> Result<RaffleArgs> {
    let (vrf_coordinator, subscription_id) = match profile.kind {
        NetworkKind::Development => {
            let mock = mock.ok_or_else(|| DeployError::MockNotDeployed {
                contract: Contract::VrfCoordinatorV2Mock,
                network: network.to_owned(),
            })?;
            (mock.address, mock.subscription_id)
        }
        NetworkKind::Production => {
            let coordinator = profile
                .vrf_coordinator
                .ok_or(DeployError::MissingCoordinator(profile.chain_id))?;
            (coordinator, profile.subscription_id)
        }
    };

    Ok(RaffleArgs {
        vrf_coordinator,
        entrance_fee: profile.entrance_fee,
        gas_lane: profile.gas_lane,
        subscription_id,
        callback_gas_limit: profile.callback_gas_limit,
        interval: profile.interval,
    })
}

/// Runs the migration steps against one backend.
#[derive(Debug)]
pub struct Sequencer<B, R, V = NoVerifier> {
    backend: B,
    registry: R,
    verifier: Option<V>,
}

impl<B, R> Sequencer<B, R> {
    /// Create a sequencer without source verification.
    pub const fn new(backend: B, registry: R) -> Self {
        Self {
            backend,
            registry,
            verifier: None,
        }
    }
}

impl<B, R, V> Sequencer<B, R, V> {
    /// Attach a verifier. `None` disables verification.
    #[must_use]
    pub fn with_verifier<W>(self, verifier: Option<W>) -> Sequencer<B, R, W> {
        Sequencer {
            backend: self.backend,
            registry: self.registry,
            verifier,
        }
    }

    /// The backend in use.
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B, R, V> Sequencer<B, R, V>
where
    B: DeploymentBackend + Sync,
    R: NetworkRegistry + Sync,
    V: SourceVerifier + Sync,
{
    /// Resolve the chain profile for `network`.
    ///
    /// # Errors
    ///
    /// [`DeployError::UnknownNetwork`] if the registry does not know the
    /// name, [`DeployError::ConfigNotFound`] if its chain has no profile.
    pub fn profile(&self, network: &str) -> Result<&'static ChainProfile> {
        let chain_id = self
            .registry
            .chain_id(network)
            .ok_or_else(|| DeployError::UnknownNetwork(network.to_owned()))?;
        networks::profile(chain_id)
    }

    /// Step 1: deploy the coordinator mock and fund a subscription.
    ///
    /// Returns `None` without touching the backend when `network` resolves
    /// to a production chain.
    ///
    /// # Errors
    ///
    /// Fails on unknown networks or chains, and if the deploy, subscription
    /// or funding call fails.
    pub async fn provision_mock(&self, network: &str) -> Result<Option<MockCoordinator>> {
        let profile = self.profile(network)?;
        self.provision_mock_for(network, profile).await
    }

    async fn provision_mock_for(
        &self,
        network: &str,
        profile: &ChainProfile,
    ) -> Result<Option<MockCoordinator>> {
        if !profile.kind.is_development() {
            tracing::debug!(
                network,
                chain_id = profile.chain_id,
                "production chain, skipping mocks"
            );
            return Ok(None);
        }

        tracing::info!(
            network,
            chain_id = profile.chain_id,
            "development chain, deploying mocks"
        );
        let deployment = self
            .backend
            .deploy(Contract::VrfCoordinatorV2Mock, mock_constructor_args())
            .await
            .map_err(|source| DeployError::DeployFailure {
                contract: Contract::VrfCoordinatorV2Mock,
                source,
            })?;
        tracing::info!(
            network,
            address = %deployment.address,
            tx = %deployment.transaction_hash,
            "mock deployed"
        );

        self.subscribe(deployment.address).await.map(Some)
    }

    /// Open and fund a subscription on `coordinator`.
    async fn subscribe(&self, coordinator: Address) -> Result<MockCoordinator> {
        let subscription_id = self
            .backend
            .create_subscription(coordinator)
            .await
            .map_err(|source| DeployError::SubscriptionFailure {
                coordinator,
                source,
            })?;

        self.backend
            .fund_subscription(coordinator, subscription_id, SUBSCRIPTION_FUND_AMOUNT)
            .await
            .map_err(|source| DeployError::SubscriptionFundingFailure {
                coordinator,
                subscription_id,
                source,
            })?;

        tracing::info!(
            %coordinator,
            subscription_id,
            amount = %SUBSCRIPTION_FUND_AMOUNT,
            "subscription funded"
        );
        Ok(MockCoordinator {
            address: coordinator,
            subscription_id,
        })
    }

    /// Step 2: deploy the Raffle.
    ///
    /// On a development network without `mock`, the previously deployed
    /// mock is looked up on the backend and a new subscription is opened
    /// on it.
    ///
    /// # Errors
    ///
    /// Fails on unknown networks or chains, on a missing mock or
    /// coordinator, and if any backend call fails.
    pub async fn deploy_raffle(
        &self,
        network: &str,
        mock: Option<MockCoordinator>,
    ) -> Result<RaffleDeployment> {
        let profile = self.profile(network)?;
        self.deploy_raffle_with(network, profile, mock).await
    }

    async fn deploy_raffle_with(
        &self,
        network: &str,
        profile: &ChainProfile,
        mock: Option<MockCoordinator>,
    ) -> Result<RaffleDeployment> {
        let mock = match mock {
            None if profile.kind.is_development() => Some(self.existing_mock(network).await?),
            other => other,
        };

        let args = resolve_args(network, profile, mock)?;
        tracing::info!(
            network,
            chain_id = profile.chain_id,
            coordinator = %args.vrf_coordinator,
            subscription_id = args.subscription_id,
            "deploying Raffle"
        );

        let deployment = self
            .backend
            .deploy(Contract::Raffle, args.abi_encode())
            .await
            .map_err(|source| DeployError::DeployFailure {
                contract: Contract::Raffle,
                source,
            })?;
        tracing::info!(
            network,
            address = %deployment.address,
            tx = %deployment.transaction_hash,
            "Raffle deployed"
        );

        Ok(RaffleDeployment { deployment, args })
    }

    async fn existing_mock(&self, network: &str) -> Result<MockCoordinator> {
        let contract = Contract::VrfCoordinatorV2Mock;
        let address = self
            .backend
            .deployed_instance(contract)
            .await
            .map_err(|source| DeployError::MockLookupFailure {
                contract,
                network: network.to_owned(),
                source,
            })?
            .ok_or_else(|| DeployError::MockNotDeployed {
                contract,
                network: network.to_owned(),
            })?;

        tracing::info!(network, %address, "reusing deployed mock");
        self.subscribe(address).await
    }

    /// Submit the Raffle source for verification.
    ///
    /// Runs only on production chains with a verifier attached. Failures
    /// are logged and reported, never returned.
    pub async fn verify(
        &self,
        network: &str,
        profile: &ChainProfile,
        raffle: &RaffleDeployment,
    ) -> Verification {
        if profile.kind.is_development() {
            return Verification::Skipped;
        }
        let Some(verifier) = &self.verifier else {
            tracing::debug!(network, "no verification credential, skipping");
            return Verification::Skipped;
        };

        let address = raffle.deployment.address;
        tracing::info!(network, %address, "verifying");
        match verifier
            .verify(profile.chain_id, address, &raffle.constructor_args())
            .await
        {
            Ok(()) => {
                tracing::info!(network, %address, "verified");
                Verification::Verified
            }
            Err(source) => {
                let reason = source.to_string();
                let err = DeployError::VerificationFailure { address, source };
                tracing::warn!(network, error = %err, %reason, "verification failed");
                Verification::Failed { reason }
            }
        }
    }

    /// Run the steps selected by `tags` for `network`.
    ///
    /// The chain profile is resolved before any backend call, and its
    /// [`NetworkKind`] decides every development/production branch.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Verification failures are recorded in
    /// the report instead.
    pub async fn run(&self, network: &str, tags: &[Tag]) -> Result<DeploymentReport> {
        let profile = self.profile(network)?;
        let mut report = DeploymentReport {
            network: network.to_owned(),
            chain_id: profile.chain_id,
            kind: profile.kind,
            mock: None,
            raffle: None,
            verification: Verification::Skipped,
            stage: Stage::PendingMock,
        };

        if Step::Mocks.selected_by(tags) {
            report.mock = self.provision_mock_for(network, profile).await?;
        }
        report.stage = if report.mock.is_some() {
            Stage::MockReady
        } else {
            Stage::MockSkipped
        };
        tracing::debug!(network, stage = %report.stage, "mocks step done");

        if !Step::Raffle.selected_by(tags) {
            return Ok(report);
        }

        let raffle = self.deploy_raffle_with(network, profile, report.mock).await?;
        report.stage = Stage::RaffleDeployed;

        report.verification = self.verify(network, profile, &raffle).await;
        report.stage = match report.verification {
            Verification::Skipped => Stage::VerifySkipped,
            Verification::Verified => Stage::Verified,
            Verification::Failed { .. } => Stage::VerifyFailed,
        };
        report.raffle = Some(raffle);

        tracing::info!(network, stage = %report.stage, "migration finished");
        Ok(report)
    }
}
