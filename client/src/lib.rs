//! Anonymous greeting client
//!
//! Derives a Semaphore identity from a wallet signature, proves membership
//! in the registered identity set and hands the proof to the relay, which
//! submits it to the Greeters contract.

pub mod config;
pub mod encoding;
pub mod error;
pub mod events;
pub mod flow;
pub mod form;
pub mod identity;
pub mod merkle;
pub mod poseidon;
pub mod prover;
pub mod relay;
pub mod semaphore;

pub use error::ClientError;
