//! Contract bindings and constructor arguments.
//!
//! Only the surface the migrations touch is bound: the two constructors and
//! the subscription calls on the coordinator mock.

#![allow(missing_docs, reason = "sol! expands undocumented items")]

use std::fmt;

use alloy::primitives::aliases::U96;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolConstructor;
use serde::{Deserialize, Serialize};

sol! {
    /// Chainlink `VRFCoordinatorV2Mock` used on development chains.
    #[sol(rpc)]
    contract VRFCoordinatorV2Mock {
        constructor(uint96 baseFee, uint96 gasPriceLink);

        event SubscriptionCreated(uint64 indexed subId, address owner);

        function createSubscription() external returns (uint64 subId);
        function fundSubscription(uint64 subId, uint96 amount) external;
    }
}

sol! {
    /// The lottery contract consuming VRF randomness.
    #[sol(rpc)]
    contract Raffle {
        constructor(
            address vrfCoordinatorV2,
            uint256 entranceFee,
            bytes32 gasLane,
            uint64 subscriptionId,
            uint32 callbackGasLimit,
            uint256 interval
        );
    }
}

/// Flat premium charged by the mock per request: 0.25 LINK.
pub const BASE_FEE: U96 = U96::from_limbs([250_000_000_000_000_000, 0]);

/// LINK per gas unit the mock uses to price callbacks: 1 gwei.
pub const GAS_PRICE_LINK: U96 = U96::from_limbs([1_000_000_000, 0]);

/// Amount funded into a fresh mock subscription: 30 LINK.
pub const SUBSCRIPTION_FUND_AMOUNT: U96 = U96::from_limbs([11_553_255_926_290_448_384, 1]);

/// Contracts deployed by the migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Contract {
    /// The VRF coordinator mock.
    #[serde(rename = "VRFCoordinatorV2Mock")]
    VrfCoordinatorV2Mock,
    /// The Raffle itself.
    Raffle,
}

impl Contract {
    /// Artifact name of the contract.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VrfCoordinatorV2Mock => "VRFCoordinatorV2Mock",
            Self::Raffle => "Raffle",
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// ABI-encoded constructor arguments for the coordinator mock.
#[must_use]
pub fn mock_constructor_args() -> Bytes {
    VRFCoordinatorV2Mock::constructorCall {
        baseFee: BASE_FEE,
        gasPriceLink: GAS_PRICE_LINK,
    }
    .abi_encode()
    .into()
}

/// Resolved Raffle constructor arguments.
///
/// Field order is the constructor's parameter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleArgs {
    /// Coordinator the Raffle requests randomness from.
    pub vrf_coordinator: Address,
    /// Ticket price in wei.
    pub entrance_fee: U256,
    /// VRF key hash.
    pub gas_lane: B256,
    /// Subscription paying for requests.
    pub subscription_id: u64,
    /// Callback gas ceiling.
    pub callback_gas_limit: u32,
    /// Seconds between rounds.
    pub interval: U256,
}

impl RaffleArgs {
    /// ABI-encode the arguments as appended to the creation bytecode.
    #[must_use]
    pub fn abi_encode(&self) -> Bytes {
        Raffle::constructorCall {
            vrfCoordinatorV2: self.vrf_coordinator,
            entranceFee: self.entrance_fee,
            gasLane: self.gas_lane,
            subscriptionId: self.subscription_id,
            callbackGasLimit: self.callback_gas_limit,
            interval: self.interval,
        }
        .abi_encode()
        .into()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::utils::parse_ether;
    use alloy::primitives::{address, b256};

    use super::*;

    #[test]
    fn mock_constants() {
        assert_eq!(BASE_FEE.to_string(), parse_ether("0.25").unwrap().to_string());
        assert_eq!(GAS_PRICE_LINK.to_string(), "1000000000");
        assert_eq!(
            SUBSCRIPTION_FUND_AMOUNT.to_string(),
            parse_ether("30").unwrap().to_string(),
            "fund amount must be 30 LINK"
        );
    }

    #[test]
    fn mock_args_are_two_words() {
        let encoded = mock_constructor_args();
        assert_eq!(encoded.len(), 64, "two static words expected");
        assert_eq!(
            U256::from_be_slice(&encoded[32..]),
            U256::from(1_000_000_000u64),
            "second word is the gas price"
        );
    }

    #[test]
    fn raffle_args_follow_constructor_order() {
        let args = RaffleArgs {
            vrf_coordinator: address!("8103B0A8A00be2DDC778e6e7eaa21791Cd364625"),
            entrance_fee: U256::from(7),
            gas_lane: b256!("787d74caea10b2b357790d5b5247c2f63d1d91572a9846f780606e4d953677ae"),
            subscription_id: 42,
            callback_gas_limit: 50_000,
            interval: U256::from(30),
        };
        let encoded = args.abi_encode();
        assert_eq!(encoded.len(), 6 * 32, "six static words expected");

        let word = |i: usize| &encoded[i * 32..(i + 1) * 32];
        assert_eq!(&word(0)[12..], args.vrf_coordinator.as_slice(), "coordinator");
        assert_eq!(U256::from_be_slice(word(1)), U256::from(7), "entrance fee");
        assert_eq!(word(2), args.gas_lane.as_slice(), "gas lane");
        assert_eq!(U256::from_be_slice(word(3)), U256::from(42), "subscription");
        assert_eq!(U256::from_be_slice(word(4)), U256::from(50_000), "gas limit");
        assert_eq!(U256::from_be_slice(word(5)), U256::from(30), "interval");
    }

    #[test]
    fn contract_names() {
        assert_eq!(Contract::VrfCoordinatorV2Mock.to_string(), "VRFCoordinatorV2Mock");
        assert_eq!(Contract::Raffle.name(), "Raffle");
    }
}
