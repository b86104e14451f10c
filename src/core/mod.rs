//! # Core Protocol Components
//!
//! The symbol alphabet, the pad arithmetic, and the handshake header record.
//!
//! ## Components
//! - **Cipher**: 27-symbol alphabet with modular encode/decode
//! - **Header**: fixed-size handshake record and its codec
//!
//! ## Wire Format
//! ```text
//! C->S [Header(len(tag)+23)]
//! S->C [Tag(len(tag))]
//! C->S [Text(textLen)] [Key(keyLen)]
//! S->C [Result(textLen)]
//! ```
//!
//! ## Limits
//! - Maximum payload size: 100000 bytes per payload
//! - Declared lengths are validated before any payload buffer is allocated

pub mod cipher;
pub mod header;
