//! Proof generation
//!
//! The Semaphore circuit itself is external: [`SnarkjsProver`] drives the
//! snarkjs CLI with the compiled circuit (`semaphore.wasm`) and proving key
//! (`semaphore_final.zkey`).

use std::future::Future;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;

use crate::semaphore::{FullProof, Groth16Proof, PublicSignals, SemaphoreWitness};

#[derive(Debug, Error)]
pub enum ProverError {
    #[error("Proof generation failed: {0}")]
    ProofGenerationError(String),

    #[error("Invalid prover output: {0}")]
    InvalidOutput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates a Semaphore proof for a witness.
pub trait Prover: Send + Sync {
    fn prove(
        &self,
        witness: &SemaphoreWitness,
    ) -> impl Future<Output = Result<FullProof, ProverError>> + Send;
}

/// Shells out to `snarkjs groth16 fullprove`.
pub struct SnarkjsProver {
    snarkjs: PathBuf,
    wasm: PathBuf,
    zkey: PathBuf,
}

impl SnarkjsProver {
    pub fn new(snarkjs: impl Into<PathBuf>, wasm: impl Into<PathBuf>, zkey: impl Into<PathBuf>) -> Self {
        Self {
            snarkjs: snarkjs.into(),
            wasm: wasm.into(),
            zkey: zkey.into(),
        }
    }

    fn check_artifact(path: &Path) -> Result<(), ProverError> {
        if !path.exists() {
            return Err(ProverError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Circuit artifact not found: {}", path.display()),
            )));
        }
        Ok(())
    }
}

impl Prover for SnarkjsProver {
    async fn prove(&self, witness: &SemaphoreWitness) -> Result<FullProof, ProverError> {
        Self::check_artifact(&self.wasm)?;
        Self::check_artifact(&self.zkey)?;

        let workdir = tempfile::tempdir()?;
        let input_path = workdir.path().join("input.json");
        let proof_path = workdir.path().join("proof.json");
        let public_path = workdir.path().join("public.json");

        // 1. Write the circuit input
        tokio::fs::write(&input_path, serde_json::to_vec(&witness.circuit_input())?).await?;

        // 2. Witness calculation + Groth16 proof in one go
        tracing::debug!("running {} groth16 fullprove", self.snarkjs.display());
        let output = Command::new(&self.snarkjs)
            .arg("groth16")
            .arg("fullprove")
            .arg(&input_path)
            .arg(&self.wasm)
            .arg(&self.zkey)
            .arg(&proof_path)
            .arg(&public_path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProverError::ProofGenerationError(format!(
                "snarkjs groth16 fullprove failed: {}",
                stderr.trim()
            )));
        }

        // 3. Read proof and public signals
        let proof: Groth16Proof = serde_json::from_slice(&tokio::fs::read(&proof_path).await?)?;
        let signals: Vec<String> = serde_json::from_slice(&tokio::fs::read(&public_path).await?)?;
        let public_signals = PublicSignals::from_snarkjs(&signals)?;

        if public_signals.nullifier_hash != witness.nullifier_hash() {
            return Err(ProverError::InvalidOutput(
                "nullifier hash does not match the witness".to_string(),
            ));
        }

        Ok(FullProof {
            proof,
            public_signals,
        })
    }
}

/// Produces the correct public signals with an all-zero proof.
///
/// Only accepted by a verifier that skips pairing checks; used in tests and
/// against local development deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockProver;

impl Prover for MockProver {
    async fn prove(&self, witness: &SemaphoreWitness) -> Result<FullProof, ProverError> {
        let zero = || "0".to_string();
        let one = || "1".to_string();

        Ok(FullProof {
            proof: Groth16Proof {
                pi_a: vec![zero(), zero(), one()],
                pi_b: vec![vec![zero(), zero()], vec![zero(), zero()], vec![one(), zero()]],
                pi_c: vec![zero(), zero(), one()],
                protocol: "groth16".to_string(),
                curve: "bn128".to_string(),
            },
            public_signals: witness.public_signals(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn witness() -> SemaphoreWitness {
        SemaphoreWitness {
            identity_nullifier: U256::from(1u64),
            identity_trapdoor: U256::from(2u64),
            tree_path_indices: vec![0, 1],
            tree_siblings: vec![U256::from(3u64), U256::from(4u64)],
            external_nullifier: U256::from(5u64),
            signal_hash: U256::from(6u64),
        }
    }

    #[tokio::test]
    async fn test_mock_prover_public_signals() {
        let witness = witness();
        let proof = MockProver.prove(&witness).await.unwrap();

        assert_eq!(proof.public_signals.nullifier_hash, witness.nullifier_hash());
        assert_eq!(proof.public_signals.signal_hash, U256::from(6u64));
        assert_eq!(proof.public_signals.merkle_root, witness.merkle_root());
    }

    #[tokio::test]
    async fn test_snarkjs_prover_missing_artifacts() {
        let prover = SnarkjsProver::new("snarkjs", "/nonexistent/semaphore.wasm", "/nonexistent/semaphore_final.zkey");
        let err = prover.prove(&witness()).await.unwrap_err();
        assert!(matches!(err, ProverError::IoError(_)));
        assert!(err.to_string().contains("semaphore.wasm"));
    }
}
