//! HTTP handlers for the greeting relay

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::encoding::{format_bytes32_string, parse_bytes32_string};
use crate::error::RelayError;
use crate::models::*;
use crate::services::greeters::GreeterContract;

/// Shared application state
pub struct AppState<C> {
    pub contract: Arc<C>,
}

impl<C> AppState<C> {
    pub fn new(contract: C) -> Self {
        Self {
            contract: Arc::new(contract),
        }
    }
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            contract: Arc::clone(&self.contract),
        }
    }
}

/// Health check endpoint
pub async fn health<C: GreeterContract>(
    State(state): State<AppState<C>>,
) -> Result<Json<HealthResponse>, RelayError> {
    let group_id = state.contract.greeters().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        greeters: state.contract.address().to_string(),
        group_id: group_id.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Relay an anonymous greeting to the Greeters contract.
///
/// Answers 200 with the decoded greeting when the transaction emitted
/// `NewGreeting`, and 200 with an empty body when it emitted nothing.
pub async fn greet<C: GreeterContract>(
    State(state): State<AppState<C>>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let request: GreetRequest =
        serde_json::from_slice(&body).map_err(|e| RelayError::MalformedRequest(e.to_string()))?;

    let greeting = format_bytes32_string(&request.greeting)?;
    let nullifier_hash = request.nullifier_hash.to_u256()?;
    let proof = request.solidity_proof.to_words()?;

    // Connectivity check only, the value is not used
    let group_id = state.contract.greeters().await?;
    tracing::debug!("greeters() = {}", group_id);

    let outcome = state.contract.greet(greeting, nullifier_hash, proof).await?;
    tracing::info!("greet confirmed: tx={:?}, events={}", outcome.tx_hash, outcome.greetings.len());

    match outcome.greetings.first() {
        Some(raw) => {
            let message = parse_bytes32_string(raw)?;
            tracing::info!("New greeting: {}", message);
            Ok(Json(GreetResponse { message }).into_response())
        }
        None => {
            tracing::warn!("greet tx {:?} emitted no NewGreeting event", outcome.tx_hash);
            Ok(StatusCode::OK.into_response())
        }
    }
}
