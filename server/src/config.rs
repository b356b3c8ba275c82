//! Configuration management

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Greeters deployment used by the demo frontend.
pub const DEFAULT_GREETERS_ADDRESS: &str = "0xf4AE7E15B1012edceD8103510eeB560a9343AFd3";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub rpc_url: String,
    pub greeters_address: String,
    pub private_key: String, // Funded relay account, only owner may call `greet`
    pub public_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Invalid PORT")?,

            rpc_url: env::var("RPC_URL")
                .or_else(|_| env::var("HARMONY_URL"))
                .unwrap_or_else(|_| "http://localhost:8545".to_string()),

            greeters_address: env::var("GREETERS_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_GREETERS_ADDRESS.to_string()),

            private_key: env::var("PRIVATE_KEY").context("PRIVATE_KEY must be set")?,

            public_dir: env::var("PUBLIC_DIR")
                .unwrap_or_else(|_| "public".to_string())
                .into(),
        })
    }
}
