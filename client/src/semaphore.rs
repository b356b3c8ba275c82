//! Semaphore witness, public signals and Groth16 proof packing

use alloy_primitives::{keccak256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::encoding::format_bytes32_string;
use crate::error::ClientError;
use crate::identity::Identity;
use crate::merkle::MerkleProof;
use crate::poseidon::{poseidon1, poseidon2};
use crate::prover::ProverError;

/// Words in the verifier's `uint256[8]` proof argument.
pub const SOLIDITY_PROOF_WORDS: usize = 8;

/// keccak256 of the `bytes32` encoded signal, shifted into the field.
pub fn signal_hash(signal: &str) -> Result<U256, ClientError> {
    let word = format_bytes32_string(signal)?;
    Ok(U256::from_be_bytes(keccak256(word).0) >> 8)
}

/// poseidon(external_nullifier, identity_nullifier)
pub fn nullifier_hash(external_nullifier: U256, identity_nullifier: U256) -> U256 {
    poseidon2(external_nullifier, identity_nullifier)
}

/// Private and public inputs of the Semaphore circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemaphoreWitness {
    pub identity_nullifier: U256,
    pub identity_trapdoor: U256,
    pub tree_path_indices: Vec<u8>,
    pub tree_siblings: Vec<U256>,
    pub external_nullifier: U256,
    pub signal_hash: U256,
}

impl SemaphoreWitness {
    pub fn new(
        identity: &Identity,
        merkle_proof: &MerkleProof,
        external_nullifier: U256,
        signal: &str,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            identity_nullifier: identity.nullifier(),
            identity_trapdoor: identity.trapdoor(),
            tree_path_indices: merkle_proof.path_indices.clone(),
            tree_siblings: merkle_proof.siblings.clone(),
            external_nullifier,
            signal_hash: signal_hash(signal)?,
        })
    }

    pub fn nullifier_hash(&self) -> U256 {
        nullifier_hash(self.external_nullifier, self.identity_nullifier)
    }

    /// Root implied by the identity commitment and the witness path.
    pub fn merkle_root(&self) -> U256 {
        let identity_secret = poseidon2(self.identity_nullifier, self.identity_trapdoor);
        let proof = MerkleProof {
            root: U256::ZERO,
            leaf: poseidon1(identity_secret),
            siblings: self.tree_siblings.clone(),
            path_indices: self.tree_path_indices.clone(),
        };
        proof.compute_root()
    }

    /// Public signals the circuit will output for this witness.
    pub fn public_signals(&self) -> PublicSignals {
        PublicSignals {
            merkle_root: self.merkle_root(),
            nullifier_hash: self.nullifier_hash(),
            signal_hash: self.signal_hash,
            external_nullifier: self.external_nullifier,
        }
    }

    /// Circuit input document, field elements as decimal strings.
    pub fn circuit_input(&self) -> Value {
        let decimal = |values: &[U256]| values.iter().map(U256::to_string).collect::<Vec<_>>();

        json!({
            "identityNullifier": self.identity_nullifier.to_string(),
            "identityTrapdoor": self.identity_trapdoor.to_string(),
            "treePathIndices": self.tree_path_indices,
            "treeSiblings": decimal(&self.tree_siblings),
            "externalNullifier": self.external_nullifier.to_string(),
            "signalHash": self.signal_hash.to_string(),
        })
    }
}

/// Groth16 proof in snarkjs' JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub curve: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicSignals {
    pub merkle_root: U256,
    pub nullifier_hash: U256,
    pub signal_hash: U256,
    pub external_nullifier: U256,
}

impl PublicSignals {
    /// Parse snarkjs' `public.json`: `[root, nullifierHash, signalHash, externalNullifier]`.
    pub fn from_snarkjs(signals: &[String]) -> Result<Self, ProverError> {
        let [merkle_root, nullifier_hash, signal_hash, external_nullifier] = signals else {
            return Err(ProverError::InvalidOutput(format!(
                "expected 4 public signals, got {}",
                signals.len()
            )));
        };

        Ok(Self {
            merkle_root: parse_field(merkle_root)?,
            nullifier_hash: parse_field(nullifier_hash)?,
            signal_hash: parse_field(signal_hash)?,
            external_nullifier: parse_field(external_nullifier)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullProof {
    pub proof: Groth16Proof,
    pub public_signals: PublicSignals,
}

/// Reorder a snarkjs proof into the `uint256[8]` the Solidity verifier takes.
///
/// G2 coordinates are swapped because the verifier expects `(c1, c0)`.
pub fn pack_to_solidity_proof(
    proof: &Groth16Proof,
) -> Result<[U256; SOLIDITY_PROOF_WORDS], ProverError> {
    let a = |i: usize| coordinate(&proof.pi_a, i, "pi_a");
    let c = |i: usize| coordinate(&proof.pi_c, i, "pi_c");
    let b = |i: usize, j: usize| {
        proof
            .pi_b
            .get(i)
            .ok_or_else(|| ProverError::InvalidOutput(format!("pi_b[{}] missing", i)))
            .and_then(|row| coordinate(row, j, "pi_b"))
    };

    Ok([a(0)?, a(1)?, b(0, 1)?, b(0, 0)?, b(1, 1)?, b(1, 0)?, c(0)?, c(1)?])
}

fn coordinate(values: &[String], index: usize, name: &str) -> Result<U256, ProverError> {
    let value = values
        .get(index)
        .ok_or_else(|| ProverError::InvalidOutput(format!("{}[{}] missing", name, index)))?;
    parse_field(value)
}

fn parse_field(value: &str) -> Result<U256, ProverError> {
    U256::from_str(value).map_err(|e| ProverError::InvalidOutput(format!("{:?}: {}", value, e)))
}
