//! Migration runner for the VRF-backed Raffle.
//!
//! Wires the [`raffle_deploy`] sequencer to a live node: contracts are
//! deployed from compiled artifacts with an alloy signing provider, every
//! deployment is recorded per chain, and production deployments can be
//! verified on Etherscan.

pub mod artifacts;
pub mod chain;
pub mod config;
pub mod etherscan;
pub mod records;
