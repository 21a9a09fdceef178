//! Source verification through the Etherscan API.
//!
//! Verification is asynchronous on Etherscan's side: the submission returns
//! a GUID which is then polled with `checkverifystatus` until it passes,
//! fails, or the attempt budget runs out.

use std::time::Duration;

use alloy::hex;
use alloy::primitives::{Address, Bytes};
use anyhow::{Context, Result, bail};
use raffle_deploy::{BoxError, SourceVerifier};
use serde::Deserialize;

use crate::config::VerifyConfig;

/// Per-request timeout for API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Envelope of every Etherscan API answer.
#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: String,
    result: String,
}

impl ApiResponse {
    fn is_ok(&self) -> bool {
        self.status == "1"
    }
}

/// What a status check reported.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Pending,
    Verified,
    Failed(String),
}

fn classify(response: &ApiResponse) -> Status {
    let result = response.result.as_str();
    if response.is_ok() || result.starts_with("Pass") || is_already_verified(result) {
        Status::Verified
    } else if result.starts_with("Pending") || result.contains("in queue") {
        Status::Pending
    } else {
        Status::Failed(result.to_owned())
    }
}

fn is_already_verified(result: &str) -> bool {
    result.to_ascii_lowercase().contains("already verified")
}

/// Etherscan-compatible verifier.
#[derive(Debug, Clone)]
pub struct Etherscan {
    client: reqwest::Client,
    api_key: String,
    config: VerifyConfig,
    /// Standard-JSON compiler input, read once up front.
    source: String,
}

impl Etherscan {
    /// Create a verifier authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the standard-JSON input cannot be read or the
    /// HTTP client cannot be built.
    pub fn new(api_key: String, config: VerifyConfig) -> Result<Self> {
        let source = std::fs::read_to_string(&config.source)
            .with_context(|| format!("reading {}", config.source.display()))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            api_key,
            config,
            source,
        })
    }

    async fn call(&self, chain_id: u64, form: &[(&str, &str)]) -> Result<ApiResponse> {
        let chain = chain_id.to_string();
        let response = self
            .client
            .post(&self.config.api_url)
            .query(&[("chainid", chain.as_str())])
            .form(form)
            .send()
            .await
            .context("calling verification API")?
            .error_for_status()?
            .json::<ApiResponse>()
            .await
            .context("decoding verification API response")?;
        Ok(response)
    }

    /// Submit the source and return the GUID to poll, or `None` if the
    /// contract is already verified.
    async fn submit(
        &self,
        chain_id: u64,
        address: Address,
        constructor_args: &Bytes,
    ) -> Result<Option<String>> {
        let address = address.to_string();
        let args = hex::encode(constructor_args);

        let response = self
            .call(
                chain_id,
                &[
                    ("apikey", self.api_key.as_str()),
                    ("module", "contract"),
                    ("action", "verifysourcecode"),
                    ("contractaddress", address.as_str()),
                    ("sourceCode", self.source.as_str()),
                    ("codeformat", "solidity-standard-json-input"),
                    ("contractname", self.config.contract_name.as_str()),
                    ("compilerversion", self.config.compiler_version.as_str()),
                    // Etherscan's spelling.
                    ("constructorArguements", args.as_str()),
                ],
            )
            .await?;

        if response.is_ok() {
            return Ok(Some(response.result));
        }
        if is_already_verified(&response.result) {
            tracing::info!(%address, "already verified");
            return Ok(None);
        }
        bail!("submission rejected: {} ({})", response.result, response.message)
    }

    async fn check(&self, chain_id: u64, guid: &str) -> Result<Status> {
        let response = self
            .call(
                chain_id,
                &[
                    ("apikey", self.api_key.as_str()),
                    ("module", "contract"),
                    ("action", "checkverifystatus"),
                    ("guid", guid),
                ],
            )
            .await?;
        Ok(classify(&response))
    }

    async fn try_verify(
        &self,
        chain_id: u64,
        address: Address,
        constructor_args: &Bytes,
    ) -> Result<()> {
        let Some(guid) = self.submit(chain_id, address, constructor_args).await? else {
            return Ok(());
        };
        tracing::info!(chain_id, %address, %guid, "verification submitted");

        let interval = Duration::from_secs(self.config.poll_interval_secs);
        for attempt in 1..=self.config.poll_attempts {
            tokio::time::sleep(interval).await;
            match self.check(chain_id, &guid).await? {
                Status::Verified => return Ok(()),
                Status::Pending => {
                    tracing::debug!(chain_id, %guid, attempt, "verification pending");
                }
                Status::Failed(reason) => bail!("verification failed: {reason}"),
            }
        }
        bail!(
            "verification still pending after {} checks (guid {guid})",
            self.config.poll_attempts
        )
    }
}

impl SourceVerifier for Etherscan {
    async fn verify(
        &self,
        chain_id: u64,
        address: Address,
        constructor_args: &Bytes,
    ) -> Result<(), BoxError> {
        Ok(self.try_verify(chain_id, address, constructor_args).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, result: &str) -> ApiResponse {
        ApiResponse {
            status: status.to_owned(),
            message: String::new(),
            result: result.to_owned(),
        }
    }

    #[test]
    fn status_classification() {
        assert_eq!(classify(&response("1", "Pass - Verified")), Status::Verified, "pass");
        assert_eq!(classify(&response("0", "Pending in queue")), Status::Pending, "pending");
        assert_eq!(
            classify(&response("0", "Already Verified")),
            Status::Verified,
            "already verified"
        );
        assert_eq!(
            classify(&response("0", "Fail - Unable to verify")),
            Status::Failed("Fail - Unable to verify".to_owned()),
            "fail"
        );
    }

    #[test]
    fn standard_input_is_read_on_construction() {
        let path = std::env::temp_dir().join("raffle-migrate-etherscan-input.json");
        std::fs::write(&path, r#"{"language":"Solidity"}"#).unwrap();
        let config = VerifyConfig {
            source: path.clone(),
            ..VerifyConfig::default()
        };
        let verifier = Etherscan::new("key".to_owned(), config).unwrap();
        assert_eq!(verifier.source, r#"{"language":"Solidity"}"#, "input kept");
        std::fs::remove_file(&path).unwrap();

        let missing = VerifyConfig {
            source: std::env::temp_dir().join("raffle-migrate-no-such-input.json"),
            ..VerifyConfig::default()
        };
        let err = Etherscan::new("key".to_owned(), missing).unwrap_err();
        assert!(err.to_string().contains("no-such-input"), "{err}");
    }

    #[test]
    fn response_envelope_parses() {
        let r: ApiResponse =
            serde_json::from_str(r#"{"status":"1","message":"OK","result":"abc123"}"#).unwrap();
        assert!(r.is_ok(), "status 1 is ok");
        assert_eq!(r.result, "abc123", "guid");
    }
}
