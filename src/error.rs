//! # Error Types
//!
//! Error handling for the one-time-pad service.
//!
//! This module defines every failure a client invocation or a server worker
//! can run into, from argument problems caught before any socket is opened to
//! transport failures in the middle of an exchange.
//!
//! ## Error Categories
//! - **Argument Errors**: missing or invalid command-line input
//! - **Key Errors**: a key shorter than the text it has to cover
//! - **Connection Errors**: no resolved address accepted the connection
//! - **Handshake Errors**: the peer answered with a different service tag
//! - **Transport Errors**: a read or write on the stream failed or the peer left early
//! - **Payload Errors**: bad symbols, malformed headers, oversized declared lengths
//!
//! Every error is local to one client invocation or one server worker.
//!
//! ## Example Usage
//! ```rust
//! use otp_protocol::error::{ProtocolError, Result};
//!
//! fn check_lengths(text: usize, key: usize) -> Result<()> {
//!     if key < text {
//!         return Err(ProtocolError::KeyTooShort { text, key });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_lengths(4, 4).is_ok());
//! assert_eq!(check_lengths(5, 4).unwrap_err().exit_code(), 1);
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Transport errors
    pub const ERR_ZERO_WRITE: &str = "Peer stopped accepting bytes (write returned 0)";
    pub const ERR_SHORT_READ: &str = "Connection closed before the declared length arrived";

    /// Header errors
    pub const ERR_MISSING_TAG: &str = "Header carries no service tag";
    pub const ERR_MISSING_TEXT_LEN: &str = "Header carries no text length";
    pub const ERR_MISSING_KEY_LEN: &str = "Header carries no key length";
    pub const ERR_HEADER_NOT_ASCII: &str = "Header is not ASCII text";
    pub const ERR_HEADER_TOO_LONG: &str = "Header text does not fit the fixed header size";

    /// Connection errors
    pub const ERR_NO_ADDRESS: &str = "Host resolved to no addresses";
}

/// Primary error type for all protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Argument error: {0}")]
    Argument(String),

    #[error("Key is not long enough: text has {text} symbols, key has {key}")]
    KeyTooShort { text: usize, key: usize },

    #[error("Failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("Handshake failed: expected tag {expected:?}, got {received:?}")]
    HandshakeMismatch { expected: String, received: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Invalid handshake header: {0}")]
    InvalidHeader(String),

    #[error("Declared payload too large: {0} bytes")]
    OversizedPayload(usize),

    #[error("Invalid symbol 0x{byte:02x} at position {position}")]
    InvalidSymbol { byte: u8, position: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Process exit status for this error.
    ///
    /// Unreachable servers exit with 2, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProtocolError::Connect { .. } => 2,
            _ => 1,
        }
    }

    /// Whether this error came from the byte stream itself rather than from
    /// the content of the exchange.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProtocolError::Io(_) | ProtocolError::Transport(_) | ProtocolError::ConnectionClosed
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
