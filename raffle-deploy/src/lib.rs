//! Network configuration and deployment sequencing for the VRF-backed
//! Raffle contract.
//!
//! The crate decides what gets deployed where:
//!
//! - [`networks`] holds the per-chain constructor parameters.
//! - [`sequencer`] runs the two migration steps: deploy and fund a
//!   `VRFCoordinatorV2Mock` on development chains, then deploy the Raffle
//!   wired to that mock or to the chain's live coordinator.
//!
//! Chain access goes through the traits in [`backend`], so the same
//! sequencing runs against a live node or an in-memory recorder.

pub mod backend;
pub mod contracts;
pub mod error;
pub mod networks;
pub mod sequencer;

pub use backend::{Deployment, DeploymentBackend, NetworkRegistry, NoVerifier, SourceVerifier};
pub use contracts::{Contract, RaffleArgs};
pub use error::{BoxError, DeployError};
pub use networks::{ChainProfile, NetworkKind};
pub use sequencer::{DeploymentReport, MockCoordinator, RaffleDeployment, Sequencer, Tag};
