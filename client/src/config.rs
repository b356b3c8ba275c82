//! Client configuration

use anyhow::{Context, Result};
use ethers::signers::LocalWallet;
use std::env;

/// Greeters deployment watched by default.
pub const DEFAULT_GREETERS_ADDRESS: &str = "0xf4AE7E15B1012edceD8103510eeB560a9343AFd3";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub greeters_address: String,
    pub snarkjs: String,
    private_key: Option<String>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string()),
            greeters_address: env::var("GREETERS_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_GREETERS_ADDRESS.to_string()),
            snarkjs: env::var("SNARKJS").unwrap_or_else(|_| "snarkjs".to_string()),
            private_key: env::var("PRIVATE_KEY").ok(),
        }
    }

    /// Wallet that signs the identity message.
    pub fn wallet(&self) -> Result<LocalWallet> {
        let key = self
            .private_key
            .as_deref()
            .context("PRIVATE_KEY must be set to sign the identity message")?;
        key.trim_start_matches("0x")
            .parse()
            .context("Invalid PRIVATE_KEY")
    }
}
