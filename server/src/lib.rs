//! Greeting relay
//!
//! Receives anonymous greetings with their Semaphore proof over HTTP and
//! forwards them to the Greeters contract from the funded relay account.

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod config;
pub mod encoding;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use handlers::AppState;
use services::greeters::GreeterContract;

/// Build the relay router; files under `public_dir` are served at `/`.
pub fn router<C: GreeterContract>(state: AppState<C>, public_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::<C>))
        .route("/api/greet", post(handlers::greet::<C>))
        // identityCommitments.json and other static assets
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
}
