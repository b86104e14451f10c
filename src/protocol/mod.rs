//! # Protocol Layer
//!
//! The handshake that opens every exchange. Payload transfer after the
//! handshake is plain exact-length I/O (see [`crate::transport`]).

pub mod handshake;

#[cfg(test)]
mod tests;
