//! # Transport Layer
//!
//! Exact-length byte delivery over a stream socket.
//!
//! The protocol carries no delimiters after the header, so every exchange is
//! a read or write of a length both sides already agreed on. The helpers here
//! retry partial reads and writes until that length is reached, and turn any
//! I/O failure into a [`ProtocolError::Transport`](crate::error::ProtocolError)
//! that ends the connection.

pub mod exact;

pub use exact::{receive_exact, receive_payload, send_exact, ReadMode};
