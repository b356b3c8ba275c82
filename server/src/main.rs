//! Greeting relay server
//!
//! Holds the Greeters owner account and submits proofs on behalf of
//! anonymous group members.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use greeter_server::{config::Config, handlers::AppState, services::greeters};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greeter_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting greeting relay");
    tracing::info!("RPC: {}", config.rpc_url);
    tracing::info!("Greeters: {}", config.greeters_address);

    let contract = greeters::connect(&config)?;
    let app = greeter_server::router(AppState::new(contract), &config.public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
