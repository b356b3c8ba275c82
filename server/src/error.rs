//! Error types for the greeting relay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body returned when no revert reason can be recovered from a failure.
pub const UNKNOWN_ERROR: &str = "Unknown error!";

/// Header carrying the numeric error code alongside the plain-text reason.
pub const ERROR_CODE_HEADER: &str = "x-error-code";

/// JSON-RPC style codes for failures that never reached the node.
pub const PARSE_ERROR_CODE: i64 = -32700;
pub const INVALID_PARAMS_CODE: i64 = -32602;
pub const INTERNAL_ERROR_CODE: i64 = -32603;

/// Mined transaction whose execution reverted.
pub const EXECUTION_REVERTED_CODE: i64 = -32000;

/// A failed contract read or transaction, as reported by the node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("contract call failed with code {code}: {message}")]
pub struct ContractCallError {
    pub code: i64,
    pub message: String,
    /// Decoded `Error(string)` revert payload, when the node returned one.
    pub revert_reason: Option<String>,
}

impl ContractCallError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            revert_reason: None,
        }
    }

    pub fn with_revert_reason(mut self, reason: impl Into<String>) -> Self {
        self.revert_reason = Some(reason.into());
        self
    }

    /// Human-readable revert reason: the decoded revert payload if any,
    /// otherwise the text quoted inside the node's message.
    pub fn reason(&self) -> Option<&str> {
        self.revert_reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
            .or_else(|| quoted_reason(&self.message))
    }
}

/// Text between the first and the last single quote of `message`.
///
/// Hardhat style nodes report reverts as
/// `reverted with reason string 'SemaphoreCore: ...'`.
pub fn quoted_reason(message: &str) -> Option<&str> {
    let start = message.find('\'')? + 1;
    let end = message.rfind('\'')?;
    if end <= start {
        return None;
    }
    Some(&message[start..end])
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid greeting: {0}")]
    InvalidGreeting(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error(transparent)]
    ContractCall(#[from] ContractCallError),
}

impl RelayError {
    pub fn code(&self) -> i64 {
        match self {
            RelayError::MalformedRequest(_) => PARSE_ERROR_CODE,
            RelayError::InvalidGreeting(_) | RelayError::InvalidNumber(_) => INVALID_PARAMS_CODE,
            RelayError::ContractCall(err) => err.code,
        }
    }

    /// Reason sent back to the caller; falls back to [`UNKNOWN_ERROR`].
    pub fn reason(&self) -> &str {
        match self {
            RelayError::ContractCall(err) => err.reason().unwrap_or(UNKNOWN_ERROR),
            _ => UNKNOWN_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        tracing::error!(code = self.code(), "greet relay failed: {}", self);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(ERROR_CODE_HEADER, self.code().to_string())],
            self.reason().to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_reason_spans_first_to_last_quote() {
        let message = "VM Exception while processing transaction: reverted with reason string \
                       'SemaphoreCore: you cannot use the same nullifier twice'";
        assert_eq!(
            quoted_reason(message),
            Some("SemaphoreCore: you cannot use the same nullifier twice")
        );

        assert_eq!(quoted_reason("a 'b' and 'c'"), Some("b' and 'c"));
    }

    #[test]
    fn test_quoted_reason_missing_or_single_quote() {
        assert_eq!(quoted_reason("execution reverted"), None);
        assert_eq!(quoted_reason("it's broken"), None);
        assert_eq!(quoted_reason("''"), None);
    }

    #[test]
    fn test_revert_payload_takes_precedence() {
        let err = ContractCallError::new(3, "execution reverted: 'ignored'")
            .with_revert_reason("Ownable: caller is not the owner");
        assert_eq!(err.reason(), Some("Ownable: caller is not the owner"));

        let err = ContractCallError::new(3, "reverted 'quoted'").with_revert_reason("");
        assert_eq!(err.reason(), Some("quoted"));
    }

    #[test]
    fn test_relay_error_fallbacks() {
        let err = RelayError::MalformedRequest("missing field `greeting`".into());
        assert_eq!(err.reason(), UNKNOWN_ERROR);
        assert_eq!(err.code(), PARSE_ERROR_CODE);

        let err = RelayError::from(ContractCallError::new(-32000, "nonce too low"));
        assert_eq!(err.reason(), UNKNOWN_ERROR);
        assert_eq!(err.code(), -32000);
    }
}
