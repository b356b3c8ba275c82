//! `bytes32` strings, as stored by the Greeters contract

use crate::error::ClientError;

/// Zero-terminated, zero-padded `bytes32` encoding of `text`.
pub fn format_bytes32_string(text: &str) -> Result<[u8; 32], ClientError> {
    let bytes = text.as_bytes();
    if bytes.len() > 31 {
        return Err(ClientError::Encoding(format!(
            "bytes32 string must be less than 32 bytes, got {}",
            bytes.len()
        )));
    }

    let mut word = [0u8; 32];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(word)
}

pub fn parse_bytes32_string(word: &[u8; 32]) -> Result<String, ClientError> {
    let end = word
        .iter()
        .position(|byte| *byte == 0)
        .ok_or_else(|| ClientError::Encoding("invalid bytes32 string - no null terminator".into()))?;

    String::from_utf8(word[..end].to_vec()).map_err(|e| ClientError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_fits_in_31_bytes() {
        let word = format_bytes32_string("Hi").unwrap();
        assert_eq!(&word[..3], b"Hi\0");
        assert_eq!(parse_bytes32_string(&word).unwrap(), "Hi");

        assert!(format_bytes32_string(&"x".repeat(32)).is_err());
    }

    #[test]
    fn test_unterminated_word_is_rejected() {
        assert!(parse_bytes32_string(&[b'x'; 32]).is_err());
    }
}
