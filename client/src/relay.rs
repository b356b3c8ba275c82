//! Relay HTTP client and identity commitment loading

use alloy_primitives::U256;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ClientError;
use crate::semaphore::SOLIDITY_PROOF_WORDS;

/// Body of `POST /api/greet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetSubmission {
    pub greeting: String,
    pub nullifier_hash: String,
    pub solidity_proof: Vec<String>,
}

impl GreetSubmission {
    pub fn new(
        greeting: &str,
        nullifier_hash: U256,
        solidity_proof: [U256; SOLIDITY_PROOF_WORDS],
    ) -> Self {
        Self {
            greeting: greeting.to_string(),
            nullifier_hash: nullifier_hash.to_string(),
            solidity_proof: solidity_proof.iter().map(U256::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// 200. `message` is `None` when the transaction emitted no greeting.
    Accepted { message: Option<String> },
    /// 500 with the relay's reason text.
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct AcceptedBody {
    message: String,
}

pub struct RelayClient {
    client: Client,
    server: String,
}

impl RelayClient {
    pub fn new(server: &str) -> Self {
        Self {
            client: Client::new(),
            server: server.trim_end_matches('/').to_string(),
        }
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub async fn submit(&self, submission: &GreetSubmission) -> Result<RelayOutcome, ClientError> {
        let url = format!("{}/api/greet", self.server);
        let body = serde_json::to_string(submission)
            .map_err(|e| ClientError::Encoding(e.to_string()))?;

        tracing::debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => Ok(RelayOutcome::Rejected(text)),
            s if s.is_success() => {
                if text.trim().is_empty() {
                    return Ok(RelayOutcome::Accepted { message: None });
                }
                let body: AcceptedBody = serde_json::from_str(&text).map_err(|_| {
                    ClientError::UnexpectedStatus {
                        status: s.as_u16(),
                        body: text.clone(),
                    }
                })?;
                Ok(RelayOutcome::Accepted {
                    message: Some(body.message),
                })
            }
            s => Err(ClientError::UnexpectedStatus {
                status: s.as_u16(),
                body: text,
            }),
        }
    }

    /// Commitments published next to the relay.
    pub fn commitments_url(&self) -> String {
        format!("{}/identityCommitments.json", self.server)
    }
}

/// Where the registered identity commitments come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitmentSource {
    Url(String),
    File(PathBuf),
}

impl CommitmentSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            CommitmentSource::Url(source.to_string())
        } else {
            CommitmentSource::File(PathBuf::from(source))
        }
    }
}

pub async fn fetch_commitments(
    client: &Client,
    source: &CommitmentSource,
) -> Result<Vec<U256>, ClientError> {
    let text = match source {
        CommitmentSource::Url(url) => {
            let resp = client.get(url).send().await?;
            if !resp.status().is_success() {
                return Err(ClientError::Commitments(format!(
                    "GET {} returned {}",
                    url,
                    resp.status()
                )));
            }
            resp.text().await?
        }
        CommitmentSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClientError::Commitments(format!("{}: {}", path.display(), e)))?,
    };

    parse_commitments(&text)
}

/// JSON array of commitments, each a decimal/`0x` string or a number.
///
/// Numbers must fit in a `u64`; real commitments are published as strings.
pub fn parse_commitments(text: &str) -> Result<Vec<U256>, ClientError> {
    let values: Vec<Value> =
        serde_json::from_str(text).map_err(|e| ClientError::Commitments(e.to_string()))?;

    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let parsed = match value {
                Value::String(s) => U256::from_str(s).ok(),
                Value::Number(n) => n.as_u64().map(U256::from),
                _ => None,
            };
            parsed.ok_or_else(|| {
                ClientError::Commitments(format!("entry {} is not a commitment: {}", i, value))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_wire_format() {
        let proof = [U256::from(1u64); SOLIDITY_PROOF_WORDS];
        let submission = GreetSubmission::new("Hello World!", U256::from(42u64), proof);
        let json: Value = serde_json::to_value(&submission).unwrap();

        assert_eq!(json["greeting"], "Hello World!");
        assert_eq!(json["nullifierHash"], "42");
        assert_eq!(json["solidityProof"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_parse_commitments() {
        let commitments = parse_commitments(r#"["123", 7, "0x10"]"#).unwrap();
        assert_eq!(
            commitments,
            vec![U256::from(123u64), U256::from(7u64), U256::from(16u64)]
        );
    }

    #[test]
    fn test_parse_commitments_rejects_garbage() {
        assert!(parse_commitments(r#"["abc"]"#).is_err());
        assert!(parse_commitments(r#"{"a": 1}"#).is_err());
        assert!(parse_commitments("[18446744073709551616]").is_err());
    }

    #[test]
    fn test_commitment_source() {
        assert_eq!(
            CommitmentSource::parse("http://localhost:3000/identityCommitments.json"),
            CommitmentSource::Url("http://localhost:3000/identityCommitments.json".into())
        );
        assert_eq!(
            CommitmentSource::parse("./public/identityCommitments.json"),
            CommitmentSource::File("./public/identityCommitments.json".into())
        );
    }

    #[test]
    fn test_server_trailing_slash() {
        let relay = RelayClient::new("http://localhost:3000/");
        assert_eq!(
            relay.commitments_url(),
            "http://localhost:3000/identityCommitments.json"
        );
    }
}
