//! In-memory Greeters double for tests and local demos
//!
//! Mirrors the contract's observable behavior: a nullifier hash can only be
//! used once, and every accepted greeting emits one `NewGreeting`.

use alloy::primitives::{keccak256, Address, B256, U256};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::error::{ContractCallError, INTERNAL_ERROR_CODE};
use crate::models::SOLIDITY_PROOF_WORDS;
use crate::services::greeters::{confirm, GreetOutcome, GreeterContract};

/// Node message used when a nullifier hash is replayed.
pub const DOUBLE_SIGNAL_MESSAGE: &str = "VM Exception while processing transaction: reverted with \
     reason string 'SemaphoreCore: you cannot use the same nullifier twice'";

pub struct MockGreeters {
    address: Address,
    group_id: U256,
    used_nullifiers: Mutex<HashSet<U256>>,
    greetings: Mutex<Vec<B256>>,
    emit_events: AtomicBool,
    revert_on_chain: AtomicBool,
    offline: AtomicBool,
}

impl MockGreeters {
    pub fn new() -> Self {
        Self {
            address: Address::repeat_byte(0x42),
            group_id: U256::from(1u64),
            used_nullifiers: Mutex::new(HashSet::new()),
            greetings: Mutex::new(Vec::new()),
            emit_events: AtomicBool::new(true),
            revert_on_chain: AtomicBool::new(false),
            offline: AtomicBool::new(false),
        }
    }

    /// Accept transactions without emitting `NewGreeting`.
    pub fn silence_events(&self) {
        self.emit_events.store(false, Ordering::SeqCst);
    }

    /// Mine every `greet` with a failed status and no logs.
    pub fn revert_on_chain(&self) {
        self.revert_on_chain.store(true, Ordering::SeqCst);
    }

    /// Fail every call as if the node were unreachable.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    /// Greetings accepted so far (test assertions).
    pub async fn greetings(&self) -> Vec<B256> {
        self.greetings.lock().await.clone()
    }

    fn check_online(&self) -> Result<(), ContractCallError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ContractCallError::new(
                INTERNAL_ERROR_CODE,
                "error sending request: connection refused",
            ));
        }
        Ok(())
    }
}

impl Default for MockGreeters {
    fn default() -> Self {
        Self::new()
    }
}

impl GreeterContract for MockGreeters {
    fn address(&self) -> Address {
        self.address
    }

    async fn greeters(&self) -> Result<U256, ContractCallError> {
        self.check_online()?;
        Ok(self.group_id)
    }

    async fn greet(
        &self,
        greeting: B256,
        nullifier_hash: U256,
        proof: [U256; SOLIDITY_PROOF_WORDS],
    ) -> Result<GreetOutcome, ContractCallError> {
        self.check_online()?;

        let mut used_nullifiers = self.used_nullifiers.lock().await;
        if used_nullifiers.contains(&nullifier_hash) {
            return Err(ContractCallError::new(INTERNAL_ERROR_CODE, DOUBLE_SIGNAL_MESSAGE));
        }

        let mut preimage = Vec::with_capacity(32 * (SOLIDITY_PROOF_WORDS + 2));
        preimage.extend_from_slice(greeting.as_slice());
        preimage.extend_from_slice(&nullifier_hash.to_be_bytes::<32>());
        for word in proof {
            preimage.extend_from_slice(&word.to_be_bytes::<32>());
        }

        let tx_hash = keccak256(&preimage);

        // Reverted transactions leave no state and no logs behind
        if self.revert_on_chain.load(Ordering::SeqCst) {
            return confirm(tx_hash, false, Vec::new());
        }

        used_nullifiers.insert(nullifier_hash);
        self.greetings.lock().await.push(greeting);

        let greetings = if self.emit_events.load(Ordering::SeqCst) {
            vec![greeting]
        } else {
            Vec::new()
        };

        confirm(tx_hash, true, greetings)
    }
}
