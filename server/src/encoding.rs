//! `bytes32` string encoding shared with the Greeters contract

use alloy::primitives::B256;

use crate::error::RelayError;

/// Encode `text` as a zero-terminated, zero-padded `bytes32`.
pub fn format_bytes32_string(text: &str) -> Result<B256, RelayError> {
    let bytes = text.as_bytes();
    if bytes.len() > 31 {
        return Err(RelayError::InvalidGreeting(format!(
            "bytes32 string must be less than 32 bytes, got {}",
            bytes.len()
        )));
    }

    let mut word = [0u8; 32];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(word))
}

/// Decode a `bytes32` produced by [`format_bytes32_string`].
pub fn parse_bytes32_string(word: &B256) -> Result<String, RelayError> {
    let end = word
        .iter()
        .position(|byte| *byte == 0)
        .ok_or_else(|| RelayError::InvalidGreeting("invalid bytes32 string - no null terminator".into()))?;

    String::from_utf8(word[..end].to_vec())
        .map_err(|e| RelayError::InvalidGreeting(format!("invalid utf-8 in bytes32 string: {}", e)))
}
