//! Greeters contract access through Alloy
//!
//! The relay account is the contract owner: it is the only account allowed
//! to call `greet`, while the proof keeps the greeter anonymous.

use alloy::{
    contract,
    network::EthereumWallet,
    primitives::{Address, B256, U256},
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::{Revert, SolError, SolEvent},
    transports::{
        http::{Client, Http},
        TransportError,
    },
};
use anyhow::{Context, Result};
use std::future::Future;

use crate::config::Config;
use crate::error::{ContractCallError, EXECUTION_REVERTED_CODE, INTERNAL_ERROR_CODE};
use crate::models::SOLIDITY_PROOF_WORDS;

sol! {
    #[sol(rpc)]
    interface Greeters {
        function greeters() external view returns (uint256);
        function greet(bytes32 greeting, uint256 nullifierHash, uint256[8] calldata proof) external;

        event NewGreeting(bytes32 greeting);
    }
}

/// Result of a confirmed `greet` transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetOutcome {
    pub tx_hash: B256,
    /// `NewGreeting` payloads emitted by the contract, in log order
    pub greetings: Vec<B256>,
}

/// Request/response access to the Greeters contract.
pub trait GreeterContract: Send + Sync + 'static {
    fn address(&self) -> Address;

    /// Read-only call, used as a connectivity check.
    fn greeters(&self) -> impl Future<Output = Result<U256, ContractCallError>> + Send;

    /// Send `greet` and wait for the transaction to be mined.
    fn greet(
        &self,
        greeting: B256,
        nullifier_hash: U256,
        proof: [U256; SOLIDITY_PROOF_WORDS],
    ) -> impl Future<Output = Result<GreetOutcome, ContractCallError>> + Send;
}

pub struct AlloyGreeters<P> {
    provider: P,
    address: Address,
}

/// Build the long-lived relay provider (signing wallet + recommended fillers).
pub fn connect(config: &Config) -> Result<AlloyGreeters<impl Provider<Http<Client>> + 'static>> {
    let address: Address = config
        .greeters_address
        .parse()
        .context("Invalid GREETERS_ADDRESS")?;

    let signer: PrivateKeySigner = config.private_key.parse().context("Invalid PRIVATE_KEY")?;
    tracing::info!("Relay wallet: {}", signer.address());

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(config.rpc_url.parse().context("Invalid RPC_URL")?);

    Ok(AlloyGreeters { provider, address })
}

impl<P> GreeterContract for AlloyGreeters<P>
where
    P: Provider<Http<Client>> + 'static,
{
    fn address(&self) -> Address {
        self.address
    }

    async fn greeters(&self) -> Result<U256, ContractCallError> {
        let contract = Greeters::new(self.address, &self.provider);
        let result = contract.greeters().call().await.map_err(contract_error)?;
        Ok(result._0)
    }

    async fn greet(
        &self,
        greeting: B256,
        nullifier_hash: U256,
        proof: [U256; SOLIDITY_PROOF_WORDS],
    ) -> Result<GreetOutcome, ContractCallError> {
        let contract = Greeters::new(self.address, &self.provider);

        let call = contract.greet(greeting, nullifier_hash, proof);
        let pending = call.send().await.map_err(contract_error)?;

        tracing::debug!("greet sent: tx={:?}", pending.tx_hash());

        let receipt = pending.get_receipt().await.map_err(|e| transport_error(&e))?;

        let greetings = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.inner.address == self.address)
            .filter_map(|log| Greeters::NewGreeting::decode_log_data(&log.inner.data, true).ok())
            .map(|event| event.greeting)
            .collect();

        confirm(receipt.transaction_hash, receipt.status(), greetings)
    }
}

/// Outcome of a mined `greet` transaction; a failed status is a revert.
pub fn confirm(
    tx_hash: B256,
    succeeded: bool,
    greetings: Vec<B256>,
) -> Result<GreetOutcome, ContractCallError> {
    if !succeeded {
        return Err(ContractCallError::new(
            EXECUTION_REVERTED_CODE,
            format!("transaction {} reverted", tx_hash),
        ));
    }
    Ok(GreetOutcome { tx_hash, greetings })
}

fn contract_error(err: contract::Error) -> ContractCallError {
    match err {
        contract::Error::TransportError(err) => transport_error(&err),
        other => ContractCallError::new(INTERNAL_ERROR_CODE, other.to_string()),
    }
}

fn transport_error(err: &TransportError) -> ContractCallError {
    let Some(payload) = err.as_error_resp() else {
        return ContractCallError::new(INTERNAL_ERROR_CODE, err.to_string());
    };

    let error = ContractCallError::new(payload.code, payload.message.to_string());
    match payload.data.as_ref().and_then(|data| decode_revert(data.get())) {
        Some(reason) => error.with_revert_reason(reason),
        None => error,
    }
}

/// Decode the raw JSON `data` member of an RPC error as `Error(string)`.
fn decode_revert(raw: &str) -> Option<String> {
    let encoded: String = serde_json::from_str(raw).ok()?;
    let bytes = hex::decode(encoded.trim_start_matches("0x")).ok()?;
    Revert::abi_decode(&bytes, true).ok().map(|revert| revert.reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_revert_payload() {
        let revert = Revert {
            reason: "SemaphoreCore: you cannot use the same nullifier twice".to_string(),
        };
        let raw = format!("\"0x{}\"", hex::encode(revert.abi_encode()));

        assert_eq!(
            decode_revert(&raw).as_deref(),
            Some("SemaphoreCore: you cannot use the same nullifier twice")
        );
    }

    const NULLIFIER_REASON: &str = "SemaphoreCore: you cannot use the same nullifier twice";

    // Payload data is a RawValue, which only deserializes from text
    fn error_response(payload: serde_json::Value) -> TransportError {
        TransportError::ErrorResp(serde_json::from_str(&payload.to_string()).unwrap())
    }

    #[test]
    fn test_hardhat_error_keeps_code_and_quoted_reason() {
        let err = transport_error(&error_response(serde_json::json!({
            "code": -32603,
            "message": format!(
                "Error: VM Exception while processing transaction: reverted with reason string '{}'",
                NULLIFIER_REASON
            ),
            "data": { "message": "revert", "txHash": null }
        })));

        assert_eq!(err.code, -32603);
        assert_eq!(err.revert_reason, None);
        assert_eq!(err.reason(), Some(NULLIFIER_REASON));
    }

    #[test]
    fn test_geth_error_decodes_revert_data() {
        let revert = Revert {
            reason: NULLIFIER_REASON.to_string(),
        };
        let err = contract_error(contract::Error::TransportError(error_response(serde_json::json!({
            "code": 3,
            "message": format!("execution reverted: {}", NULLIFIER_REASON),
            "data": format!("0x{}", hex::encode(revert.abi_encode()))
        }))));

        assert_eq!(err.code, 3);
        assert_eq!(err.revert_reason.as_deref(), Some(NULLIFIER_REASON));
        assert_eq!(err.reason(), Some(NULLIFIER_REASON));
    }

    #[test]
    fn test_non_rpc_failures_are_internal_errors() {
        let err = transport_error(&TransportError::NullResp);
        assert_eq!(err.code, INTERNAL_ERROR_CODE);
        assert_eq!(err.reason(), None);

        let err = contract_error(contract::Error::UnknownFunction("greeters".to_string()));
        assert_eq!(err.code, INTERNAL_ERROR_CODE);
        assert_eq!(err.revert_reason, None);
    }

    #[test]
    fn test_failed_receipt_status_is_a_revert() {
        let tx_hash = B256::repeat_byte(0x11);

        let err = confirm(tx_hash, false, Vec::new()).unwrap_err();
        assert_eq!(err.code, EXECUTION_REVERTED_CODE);
        assert_eq!(err.reason(), None);

        let outcome = confirm(tx_hash, true, Vec::new()).unwrap();
        assert_eq!(outcome.tx_hash, tx_hash);
        assert!(outcome.greetings.is_empty());
    }

    #[test]
    fn test_decode_revert_ignores_other_payloads() {
        assert_eq!(decode_revert("\"0xdeadbeef\""), None);
        assert_eq!(decode_revert("{\"message\":\"nope\"}"), None);
        assert_eq!(decode_revert("null"), None);
    }
}
