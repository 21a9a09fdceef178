//! Deployment backend talking to a JSON-RPC node through alloy.

use alloy::network::TransactionBuilder;
use alloy::primitives::aliases::U96;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result, bail};
use raffle_deploy::contracts::VRFCoordinatorV2Mock;
use raffle_deploy::{BoxError, Contract, Deployment, DeploymentBackend};

use crate::artifacts::Artifacts;
use crate::records::RecordStore;

/// Deploys from local artifacts with a signing provider and records every
/// confirmed deployment.
#[derive(Debug, Clone)]
pub struct RpcBackend<P> {
    provider: P,
    artifacts: Artifacts,
    records: RecordStore,
}

impl<P: Provider + Clone> RpcBackend<P> {
    /// Create a backend. `provider` must carry a wallet.
    pub const fn new(provider: P, artifacts: Artifacts, records: RecordStore) -> Self {
        Self {
            provider,
            artifacts,
            records,
        }
    }

    async fn try_deploy(&self, contract: Contract, constructor_args: Bytes) -> Result<Deployment> {
        let artifact = self.artifacts.load(contract)?;
        let mut code = artifact.bytecode.to_vec();
        code.extend_from_slice(&constructor_args);

        let tx = TransactionRequest::default().with_deploy_code(code);
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .with_context(|| format!("sending {contract} creation"))?
            .get_receipt()
            .await
            .with_context(|| format!("waiting for {contract} receipt"))?;

        if !receipt.status() {
            bail!("{contract} creation {} reverted", receipt.transaction_hash);
        }
        let address = receipt
            .contract_address
            .with_context(|| format!("{contract} receipt has no contract address"))?;

        let deployment = Deployment {
            address,
            transaction_hash: receipt.transaction_hash,
        };
        self.records
            .record(contract, &deployment)
            .context("recording deployment")?;
        tracing::debug!(%contract, %address, gas_used = receipt.gas_used, "creation confirmed");
        Ok(deployment)
    }

    async fn try_create_subscription(&self, coordinator: Address) -> Result<u64> {
        let mock = VRFCoordinatorV2Mock::new(coordinator, self.provider.clone());
        let receipt = mock
            .createSubscription()
            .send()
            .await
            .context("sending createSubscription")?
            .get_receipt()
            .await
            .context("waiting for createSubscription receipt")?;

        if !receipt.status() {
            bail!("createSubscription {} reverted", receipt.transaction_hash);
        }
        let created = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<VRFCoordinatorV2Mock::SubscriptionCreated>().ok())
            .context("no SubscriptionCreated event in receipt")?;
        Ok(created.inner.data.subId)
    }

    async fn try_fund_subscription(
        &self,
        coordinator: Address,
        subscription_id: u64,
        amount: U96,
    ) -> Result<()> {
        let mock = VRFCoordinatorV2Mock::new(coordinator, self.provider.clone());
        let receipt = mock
            .fundSubscription(subscription_id, amount)
            .send()
            .await
            .context("sending fundSubscription")?
            .get_receipt()
            .await
            .context("waiting for fundSubscription receipt")?;

        if !receipt.status() {
            bail!("fundSubscription {} reverted", receipt.transaction_hash);
        }
        Ok(())
    }
}

impl<P: Provider + Clone> DeploymentBackend for RpcBackend<P> {
    async fn deploy(
        &self,
        contract: Contract,
        constructor_args: Bytes,
    ) -> Result<Deployment, BoxError> {
        Ok(self.try_deploy(contract, constructor_args).await?)
    }

    async fn deployed_instance(&self, contract: Contract) -> Result<Option<Address>, BoxError> {
        let Some(address) = self.records.address_of(contract)? else {
            return Ok(None);
        };
        // Records survive chain resets; only trust addresses that still hold code.
        let code = self.provider.get_code_at(address).await?;
        if code.is_empty() {
            tracing::warn!(%contract, %address, "recorded address has no code, ignoring");
            return Ok(None);
        }
        Ok(Some(address))
    }

    async fn create_subscription(&self, coordinator: Address) -> Result<u64, BoxError> {
        Ok(self.try_create_subscription(coordinator).await?)
    }

    async fn fund_subscription(
        &self,
        coordinator: Address,
        subscription_id: u64,
        amount: U96,
    ) -> Result<(), BoxError> {
        Ok(self
            .try_fund_subscription(coordinator, subscription_id, amount)
            .await?)
    }
}
