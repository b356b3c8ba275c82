//! Anonymous greeting client
//!
//! 1. Sign a fixed message and derive a Semaphore identity
//! 2. Prove membership in the registered identity set
//! 3. Hand the proof to the relay, which puts the greeting onchain

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use greeter_client::config::ClientConfig;
use greeter_client::events::{self, GreetingEvents};
use greeter_client::flow::{submit_form, GreeterView, MessageSigner, SubmissionContext};
use greeter_client::form::UserInput;
use greeter_client::identity::{Identity, IDENTITY_MESSAGE};
use greeter_client::prover::{MockProver, Prover, SnarkjsProver};
use greeter_client::relay::{CommitmentSource, RelayClient};

#[derive(Parser)]
#[command(name = "greeter")]
#[command(about = "Send an anonymous greeting through the relay")]
struct Cli {
    /// Relay server URL
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prove membership and submit a greeting
    Greet {
        #[arg(long, default_value = "Tester")]
        name: String,

        #[arg(long, default_value = "18")]
        age: f64,

        #[arg(long, default_value = "Blockstreet 20")]
        address: String,

        /// Greeting text, at most 32 characters
        #[arg(short, long, default_value = "Hello World!")]
        greeting: String,

        /// Commitments URL or file (defaults to the relay's identityCommitments.json)
        #[arg(long)]
        commitments: Option<String>,

        /// Compiled Semaphore circuit
        #[arg(long, default_value = "./semaphore.wasm")]
        wasm: String,

        /// Proving key
        #[arg(long, default_value = "./semaphore_final.zkey")]
        zkey: String,

        /// Skip snarkjs and send a zero proof (dev chains only)
        #[arg(long)]
        mock_prover: bool,
    },

    /// Print the identity commitment derived from PRIVATE_KEY
    Identity {
        /// Fresh random identity instead, e.g. to pad a test group
        #[arg(long)]
        random: bool,
    },

    /// Follow NewGreeting events
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    match cli.command {
        Commands::Greet {
            name,
            age,
            address,
            greeting,
            commitments,
            wasm,
            zkey,
            mock_prover,
        } => {
            let input = UserInput {
                name,
                age: Some(age),
                address,
                greet: greeting,
            };
            let relay = RelayClient::new(&cli.server);
            let source = CommitmentSource::parse(
                &commitments.unwrap_or_else(|| relay.commitments_url()),
            );
            let wallet = config.wallet()?;

            if mock_prover {
                println!("=== MOCK PROVER ===\n");
                let ctx = SubmissionContext::new(wallet, MockProver, relay, source);
                greet(&ctx, &input).await?;
            } else {
                let prover = SnarkjsProver::new(&config.snarkjs, wasm, zkey);
                let ctx = SubmissionContext::new(wallet, prover, relay, source);
                greet(&ctx, &input).await?;
            }
        }

        Commands::Identity { random } => {
            let identity = if random {
                Identity::random()
            } else {
                let wallet = config.wallet()?;
                Identity::from_message(&wallet.sign(IDENTITY_MESSAGE).await?)
            };

            println!("Identity commitment:");
            println!("  {}", identity.commitment());
            println!("\nAdd it to identityCommitments.json to join the group.");
        }

        Commands::Watch => {
            println!("Watching NewGreeting on {} via {}\n", config.greeters_address, config.rpc_url);
            let feed = events::subscribe(&config.rpc_url, &config.greeters_address)?;

            let mut observed = GreetingEvents::new();
            observed
                .follow(feed, |entries| {
                    println!("Others Onchain data:");
                    for (i, entry) in entries.iter().enumerate() {
                        println!("  {:>3}. {}", i + 1, entry);
                    }
                })
                .await
                .context("Greeting feed stopped")?;
        }
    }

    Ok(())
}

async fn greet<S: MessageSigner, P: Prover>(
    ctx: &SubmissionContext<S, P>,
    input: &UserInput,
) -> Result<()> {
    let mut view = GreeterView::default();
    println!("{}", view.logs);

    let result = submit_form(&mut view, ctx, input).await;

    println!("\n[{:?}] {}", view.stage, view.logs);
    println!("Your Onchain data:");
    println!("  {}", view.greeting.as_deref().unwrap_or("-"));

    result?;
    Ok(())
}
