//! Greeting event feed
//!
//! Independent of the submission flow: any `NewGreeting` emitted by the
//! contract, by anyone, lands in the observed list.

use ethers::prelude::*;
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::{Stream, StreamExt};
use std::sync::Arc;

use crate::encoding::parse_bytes32_string;
use crate::error::ClientError;

abigen!(
    Greeters,
    r#"[
        event NewGreeting(bytes32 greeting)
    ]"#
);

/// Raw `bytes32` greetings as they arrive from the chain.
pub type RawGreeting = [u8; 32];

/// Append-only list of observed greetings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GreetingEvents {
    entries: Vec<String>,
}

impl GreetingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode and append one greeting.
    pub fn record(&mut self, raw: &RawGreeting) -> Result<String, ClientError> {
        let greeting = parse_bytes32_string(raw)?;
        self.entries.push(greeting.clone());
        Ok(greeting)
    }

    /// Drain `stream` into the list, calling `on_new` after each append.
    ///
    /// Undecodable greetings are skipped; a feed error ends the loop.
    pub async fn follow<S>(
        &mut self,
        mut stream: S,
        mut on_new: impl FnMut(&[String]),
    ) -> Result<(), ClientError>
    where
        S: Stream<Item = Result<RawGreeting, ClientError>> + Unpin,
    {
        while let Some(item) = stream.next().await {
            let raw = item?;
            match self.record(&raw) {
                Ok(greeting) => {
                    tracing::info!("NewGreeting: {}", greeting);
                    on_new(&self.entries);
                }
                Err(e) => tracing::warn!("Skipping undecodable greeting 0x{}: {}", hex::encode(raw), e),
            }
        }
        Ok(())
    }
}

/// Watch `NewGreeting` logs of the contract at `address`.
///
/// Polls an HTTP filter from a background task; the receiver closes when the
/// task stops.
pub fn subscribe(
    rpc_url: &str,
    address: &str,
) -> Result<UnboundedReceiver<Result<RawGreeting, ClientError>>, ClientError> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .map_err(|e| ClientError::Feed(format!("invalid RPC URL {}: {}", rpc_url, e)))?;
    let address: Address = address
        .parse()
        .map_err(|e| ClientError::Feed(format!("invalid contract address {}: {}", address, e)))?;

    let (tx, rx) = mpsc::unbounded();
    let contract = Greeters::new(address, Arc::new(provider));

    tokio::spawn(async move {
        let event = contract.new_greeting_filter();
        let mut stream = match event.stream().await {
            Ok(stream) => stream,
            Err(e) => {
                let _ = tx.unbounded_send(Err(ClientError::Feed(e.to_string())));
                return;
            }
        };

        while let Some(item) = stream.next().await {
            let item = item
                .map(|log| log.greeting)
                .map_err(|e| ClientError::Feed(e.to_string()));
            if tx.unbounded_send(item).is_err() {
                tracing::debug!("greeting feed receiver dropped");
                break;
            }
        }
    });

    Ok(rx)
}
