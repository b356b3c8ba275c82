//! Client error types

use thiserror::Error;

use crate::form::ValidationErrors;
use crate::merkle::MerkleError;
use crate::prover::ProverError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid form input: {0}")]
    Validation(ValidationErrors),

    #[error("Signature request failed: {0}")]
    Signer(String),

    #[error("Could not load identity commitments: {0}")]
    Commitments(String),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Prover(#[from] ProverError),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Relay request failed: {0}")]
    Relay(#[from] reqwest::Error),

    #[error("Unexpected relay response {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Event subscription failed: {0}")]
    Feed(String),
}
