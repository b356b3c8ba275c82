//! Data models for API requests/responses

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RelayError;

/// Number of words in a packed Groth16 proof (`uint256[8]`).
pub const SOLIDITY_PROOF_WORDS: usize = 8;

/// Greeting submission from the client.
///
/// Clients post the JSON document as a plain-text body, so the handler
/// parses it itself instead of relying on the content type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetRequest {
    pub greeting: String,
    pub nullifier_hash: NumericValue,
    pub solidity_proof: SolidityProof,
}

/// A uint256 sent either as a decimal / `0x` string or as a JSON number.
///
/// JSON numbers are limited to `u64`; field elements travel as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Text(String),
    Number(serde_json::Number),
}

impl NumericValue {
    pub fn to_u256(&self) -> Result<U256, RelayError> {
        match self {
            NumericValue::Text(text) => U256::from_str(text.trim())
                .map_err(|e| RelayError::InvalidNumber(format!("{:?}: {}", text, e))),
            NumericValue::Number(number) => number
                .as_u64()
                .map(U256::from)
                .ok_or_else(|| RelayError::InvalidNumber(number.to_string())),
        }
    }
}

/// Groth16 proof in the verifier's `uint256[8]` layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SolidityProof {
    Words(Vec<NumericValue>),
    /// `0x` hex of the 256 byte big-endian concatenation of the words
    Packed(String),
}

impl SolidityProof {
    pub fn to_words(&self) -> Result<[U256; SOLIDITY_PROOF_WORDS], RelayError> {
        let words = match self {
            SolidityProof::Words(values) => values
                .iter()
                .map(NumericValue::to_u256)
                .collect::<Result<Vec<_>, _>>()?,
            SolidityProof::Packed(encoded) => {
                let bytes = hex::decode(encoded.trim_start_matches("0x"))
                    .map_err(|e| RelayError::InvalidNumber(format!("Invalid proof encoding: {}", e)))?;
                if bytes.len() != SOLIDITY_PROOF_WORDS * 32 {
                    return Err(RelayError::InvalidNumber(format!(
                        "packed proof must be {} bytes, got {}",
                        SOLIDITY_PROOF_WORDS * 32,
                        bytes.len()
                    )));
                }
                bytes.chunks(32).map(U256::from_be_slice).collect()
            }
        };

        let count = words.len();
        words.try_into().map_err(|_| {
            RelayError::InvalidNumber(format!(
                "proof must have {} words, got {}",
                SOLIDITY_PROOF_WORDS, count
            ))
        })
    }
}

/// Confirmed greeting, decoded from the `NewGreeting` event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub greeters: String,
    pub group_id: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GreetRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_parse_snarkjs_style_request() {
        let request = parse(
            r#"{"greeting":"Hello World!","nullifierHash":"123","solidityProof":["1","2","3","4","5","6","7","8"]}"#,
        );
        assert_eq!(request.greeting, "Hello World!");
        assert_eq!(request.nullifier_hash.to_u256().unwrap(), U256::from(123u64));
        let words = request.solidity_proof.to_words().unwrap();
        assert_eq!(words[7], U256::from(8u64));
    }

    #[test]
    fn test_nullifier_hash_accepts_number_and_hex() {
        let request = parse(r#"{"greeting":"hi","nullifierHash":42,"solidityProof":[1,2,3,4,5,6,7,8]}"#);
        assert_eq!(request.nullifier_hash.to_u256().unwrap(), U256::from(42u64));

        let request = parse(r#"{"greeting":"hi","nullifierHash":"0x2a","solidityProof":"0x00"}"#);
        assert_eq!(request.nullifier_hash.to_u256().unwrap(), U256::from(42u64));
    }

    #[test]
    fn test_json_number_above_u64_is_rejected() {
        let request = parse(
            r#"{"greeting":"hi","nullifierHash":18446744073709551616,"solidityProof":"0x00"}"#,
        );
        assert!(matches!(
            request.nullifier_hash.to_u256(),
            Err(RelayError::InvalidNumber(_))
        ));

        let request = parse(
            r#"{"greeting":"hi","nullifierHash":"18446744073709551616","solidityProof":"0x00"}"#,
        );
        assert_eq!(
            request.nullifier_hash.to_u256().unwrap(),
            U256::from(u64::MAX) + U256::from(1u64)
        );
    }

    #[test]
    fn test_packed_proof() {
        let mut hex_words = String::from("0x");
        for i in 1..=8u8 {
            hex_words.push_str(&format!("{:064x}", i));
        }
        let proof = SolidityProof::Packed(hex_words);
        let words = proof.to_words().unwrap();
        assert_eq!(words[0], U256::from(1u64));
        assert_eq!(words[7], U256::from(8u64));

        assert!(SolidityProof::Packed("0x00".into()).to_words().is_err());
    }

    #[test]
    fn test_wrong_word_count_rejected() {
        let request = parse(r#"{"greeting":"hi","nullifierHash":"1","solidityProof":["1","2"]}"#);
        assert!(matches!(
            request.solidity_proof.to_words(),
            Err(RelayError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let result = serde_json::from_str::<GreetRequest>(r#"{"greeting":"hi","nullifierHash":"1"}"#);
        assert!(result.is_err());
    }
}
