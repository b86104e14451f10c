//! Ciphertext and key sources.
//!
//! A source file holds one line of symbols. The trailing newline is not part
//! of the payload.

use std::path::Path;
use tracing::debug;

use crate::core::cipher::validate;
use crate::error::{ProtocolError, Result};

/// Drop one trailing `\n` (or `\r\n`) if present.
pub fn strip_newline(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
    }
    bytes
}

/// Read a source file and check that every byte is a symbol.
///
/// # Errors
/// `Argument` if the file cannot be read, `InvalidSymbol` if it holds
/// anything but `A`..`Z` and space.
pub async fn read_text<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let raw = tokio::fs::read(path).await.map_err(|e| {
        ProtocolError::Argument(format!("cannot read '{}': {e}", path.display()))
    })?;

    let text = strip_newline(raw);
    validate(&text)?;

    debug!(path = %path.display(), len = text.len(), "Read text source");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_strip_newline() {
        assert_eq!(strip_newline(b"ABC\n".to_vec()), b"ABC");
        assert_eq!(strip_newline(b"ABC\r\n".to_vec()), b"ABC");
        assert_eq!(strip_newline(b"ABC".to_vec()), b"ABC");
        assert_eq!(strip_newline(b"AB \n\n".to_vec()), b"AB \n");
        assert_eq!(strip_newline(Vec::new()), b"");
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_read_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HELLO WORLD").unwrap();

        let text = read_text(file.path()).await.unwrap();
        assert_eq!(text, b"HELLO WORLD");
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_read_text_rejects_bad_characters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HELLO, WORLD").unwrap();

        let err = read_text(file.path()).await.unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidSymbol { byte: b',', position: 5 }));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = read_text("/nonexistent/otp/source").await.unwrap_err();
        assert!(matches!(err, ProtocolError::Argument(_)));
    }
}
