//! Semaphore identity
//!
//! The identity is derived deterministically from a wallet signature over
//! [`IDENTITY_MESSAGE`], so the same wallet recovers the same identity each
//! session without persisting any secret.

use alloy_primitives::U256;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::poseidon::{poseidon1, poseidon2, to_field};

/// Message the wallet signs to seed the identity.
pub const IDENTITY_MESSAGE: &str = "Sign this message to create your identity!";

#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    trapdoor: U256,
    nullifier: U256,
}

impl Identity {
    /// Derive the identity from a signed message (the `0x` signature hex).
    pub fn from_message(message: &str) -> Self {
        let message_hash = sha256_hex(message.as_bytes());

        Self {
            trapdoor: hash_to_field(&format!("{}identity_trapdoor", message_hash)),
            nullifier: hash_to_field(&format!("{}identity_nullifier", message_hash)),
        }
    }

    /// Random identity, not recoverable from any wallet.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            trapdoor: random_field(&mut rng),
            nullifier: random_field(&mut rng),
        }
    }

    pub fn trapdoor(&self) -> U256 {
        self.trapdoor
    }

    pub fn nullifier(&self) -> U256 {
        self.nullifier
    }

    /// poseidon(nullifier, trapdoor)
    pub fn secret(&self) -> U256 {
        poseidon2(self.nullifier, self.trapdoor)
    }

    /// Public commitment registered in the group: poseidon(secret).
    pub fn commitment(&self) -> U256 {
        poseidon1(self.secret())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("commitment", &self.commitment())
            .finish_non_exhaustive()
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hash_to_field(text: &str) -> U256 {
    to_field(U256::from_be_slice(&Sha256::digest(text.as_bytes())))
}

fn random_field(rng: &mut impl RngCore) -> U256 {
    // 31 bytes always fit in the field
    let mut bytes = [0u8; 31];
    rng.fill_bytes(&mut bytes);
    U256::from_be_slice(&bytes)
}
