//! Submission flow and the state it renders

use alloy_primitives::U256;
use std::future::Future;

use ethers::signers::{LocalWallet, Signer};

use crate::error::ClientError;
use crate::form::UserInput;
use crate::identity::{Identity, IDENTITY_MESSAGE};
use crate::merkle::{generate_merkle_proof, TREE_DEPTH};
use crate::prover::Prover;
use crate::relay::{fetch_commitments, CommitmentSource, GreetSubmission, RelayClient, RelayOutcome};
use crate::semaphore::{pack_to_solidity_proof, SemaphoreWitness};

pub const INITIAL_LOG: &str = "Connect your wallet and greet!";
pub const CREATING_IDENTITY_LOG: &str = "Creating your Semaphore identity...";
pub const CREATING_PROOF_LOG: &str = "Creating your Semaphore proof...";
pub const ONCHAIN_LOG: &str = "Your anonymous greeting is onchain :)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Idle,
    AwaitingSignature,
    AwaitingProof,
    AwaitingConfirmation,
    Done,
    Failed,
}

/// What the user sees: the status line and their confirmed greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreeterView {
    pub logs: String,
    pub stage: SubmissionStage,
    pub greeting: Option<String>,
}

impl Default for GreeterView {
    fn default() -> Self {
        Self {
            logs: INITIAL_LOG.to_string(),
            stage: SubmissionStage::Idle,
            greeting: None,
        }
    }
}

impl GreeterView {
    fn advance(&mut self, stage: SubmissionStage, logs: Option<&str>) {
        tracing::debug!("{:?} -> {:?}", self.stage, stage);
        self.stage = stage;
        if let Some(logs) = logs {
            self.logs = logs.to_string();
        }
    }
}

/// Signs the identity message. Returns the `0x` signature hex.
pub trait MessageSigner: Send + Sync {
    fn sign(&self, message: &str) -> impl Future<Output = Result<String, ClientError>> + Send;
}

impl MessageSigner for LocalWallet {
    async fn sign(&self, message: &str) -> Result<String, ClientError> {
        let signature = self
            .sign_message(message)
            .await
            .map_err(|e| ClientError::Signer(e.to_string()))?;
        Ok(format!("0x{}", hex::encode(signature.to_vec())))
    }
}

/// Everything one submission needs, passed in explicitly.
pub struct SubmissionContext<S, P> {
    pub signer: S,
    pub prover: P,
    pub relay: RelayClient,
    pub commitments: CommitmentSource,
    pub tree_depth: usize,
}

impl<S: MessageSigner, P: Prover> SubmissionContext<S, P> {
    pub fn new(signer: S, prover: P, relay: RelayClient, commitments: CommitmentSource) -> Self {
        Self {
            signer,
            prover,
            relay,
            commitments,
            tree_depth: TREE_DEPTH,
        }
    }

    /// Sign the fixed message and derive the identity.
    pub async fn identity(&self) -> Result<Identity, ClientError> {
        let signature = self.signer.sign(IDENTITY_MESSAGE).await?;
        Ok(Identity::from_message(&signature))
    }
}

/// Validate the form, then submit its greeting.
///
/// Nothing leaves the machine when validation fails.
pub async fn submit_form<S: MessageSigner, P: Prover>(
    view: &mut GreeterView,
    ctx: &SubmissionContext<S, P>,
    input: &UserInput,
) -> Result<RelayOutcome, ClientError> {
    input.validate().map_err(ClientError::Validation)?;
    submit_greeting(view, ctx, &input.greet).await
}

/// Single attempt; a failure is final and the view is marked `Failed`.
pub async fn submit_greeting<S: MessageSigner, P: Prover>(
    view: &mut GreeterView,
    ctx: &SubmissionContext<S, P>,
    greeting: &str,
) -> Result<RelayOutcome, ClientError> {
    match run(view, ctx, greeting).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            tracing::error!("Greeting submission failed: {}", e);
            view.advance(SubmissionStage::Failed, None);
            Err(e)
        }
    }
}

async fn run<S: MessageSigner, P: Prover>(
    view: &mut GreeterView,
    ctx: &SubmissionContext<S, P>,
    greeting: &str,
) -> Result<RelayOutcome, ClientError> {
    view.advance(SubmissionStage::AwaitingSignature, Some(CREATING_IDENTITY_LOG));

    let identity = ctx.identity().await?;
    let commitment = identity.commitment();
    tracing::debug!("identity commitment {}", commitment);

    let commitments = fetch_commitments(ctx.relay.http(), &ctx.commitments).await?;
    let merkle_proof = generate_merkle_proof(ctx.tree_depth, U256::ZERO, &commitments, commitment)?;

    view.advance(SubmissionStage::AwaitingProof, Some(CREATING_PROOF_LOG));

    // The group root doubles as the external nullifier
    let witness = SemaphoreWitness::new(&identity, &merkle_proof, merkle_proof.root, greeting)?;
    let full_proof = ctx.prover.prove(&witness).await?;
    let solidity_proof = pack_to_solidity_proof(&full_proof.proof)?;

    view.advance(SubmissionStage::AwaitingConfirmation, None);

    let submission = GreetSubmission::new(
        greeting,
        full_proof.public_signals.nullifier_hash,
        solidity_proof,
    );
    let outcome = ctx.relay.submit(&submission).await?;

    match &outcome {
        RelayOutcome::Accepted { message } => {
            if message.is_none() {
                tracing::warn!("Relay accepted the greeting without a NewGreeting event");
            }
            view.greeting = message.clone();
            view.advance(SubmissionStage::Done, Some(ONCHAIN_LOG));
        }
        RelayOutcome::Rejected(reason) => {
            tracing::warn!("Relay rejected the greeting: {}", reason);
            view.advance(SubmissionStage::Failed, Some(reason.as_str()));
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prover::MockProver;

    // Well-known development key (hardhat account #0)
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    struct RefusingSigner;

    impl MessageSigner for RefusingSigner {
        async fn sign(&self, _message: &str) -> Result<String, ClientError> {
            Err(ClientError::Signer("User denied message signature".into()))
        }
    }

    #[test]
    fn test_initial_view() {
        let view = GreeterView::default();
        assert_eq!(view.logs, INITIAL_LOG);
        assert_eq!(view.stage, SubmissionStage::Idle);
        assert_eq!(view.greeting, None);
    }

    #[tokio::test]
    async fn test_wallet_identity_is_deterministic() {
        let wallet: LocalWallet = DEV_KEY.parse().unwrap();
        let first = wallet.sign(IDENTITY_MESSAGE).await.unwrap();
        let second = wallet.sign(IDENTITY_MESSAGE).await.unwrap();

        assert!(first.starts_with("0x"));
        assert_eq!(first.len(), 2 + 65 * 2);
        assert_eq!(Identity::from_message(&first), Identity::from_message(&second));
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        // Nothing listens on port 9; any request would fail with a relay error
        let ctx = SubmissionContext::new(
            RefusingSigner,
            MockProver,
            RelayClient::new("http://127.0.0.1:9"),
            CommitmentSource::Url("http://127.0.0.1:9/identityCommitments.json".into()),
        );
        let mut view = GreeterView::default();
        let input = UserInput {
            greet: "x".repeat(33),
            ..Default::default()
        };

        let err = submit_form(&mut view, &ctx, &input).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(view, GreeterView::default());
    }

    #[tokio::test]
    async fn test_signer_failure_marks_view_failed() {
        let ctx = SubmissionContext::new(
            RefusingSigner,
            MockProver,
            RelayClient::new("http://127.0.0.1:9"),
            CommitmentSource::File("identityCommitments.json".into()),
        );
        let mut view = GreeterView::default();

        let err = submit_greeting(&mut view, &ctx, "Hello World!").await.unwrap_err();
        assert!(matches!(err, ClientError::Signer(_)));
        assert_eq!(view.stage, SubmissionStage::Failed);
        assert_eq!(view.logs, CREATING_IDENTITY_LOG);
    }
}
