//! # Modular Pad Cipher
//!
//! The 27-symbol alphabet (`A`..`Z` plus space) and the one-time-pad
//! arithmetic over it.
//!
//! ```text
//! rank:  A=0  B=1  ...  Z=25  ' '=26
//! decode(c, p) = (rank(c) - rank(p)) mod 27
//! encode(m, p) = (rank(m) + rank(p)) mod 27
//! ```
//!
//! Only the first `text.len()` symbols of a key are consumed; anything after
//! that is ignored.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of symbols in the alphabet
pub const ALPHABET_SIZE: u8 = 27;

/// Symbols ordered by rank
pub const ALPHABET: &[u8; ALPHABET_SIZE as usize] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ ";

/// One of the 27 symbols, stored as its rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u8);

impl Symbol {
    /// The space symbol, rank 26
    pub const SPACE: Symbol = Symbol(26);

    /// Build a symbol from its rank, `None` outside 0..=26
    pub const fn from_rank(rank: u8) -> Option<Self> {
        if rank < ALPHABET_SIZE {
            Some(Symbol(rank))
        } else {
            None
        }
    }

    /// Build a symbol from its ASCII byte
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A'..=b'Z' => Some(Symbol(byte - b'A')),
            b' ' => Some(Symbol::SPACE),
            _ => None,
        }
    }

    /// Rank of this symbol in 0..=26
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0
    }

    /// ASCII byte of this symbol
    #[inline]
    pub const fn as_byte(self) -> u8 {
        ALPHABET[self.0 as usize]
    }
}

impl TryFrom<u8> for Symbol {
    type Error = u8;

    fn try_from(byte: u8) -> std::result::Result<Self, Self::Error> {
        Symbol::from_byte(byte).ok_or(byte)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

/// Subtract the pad symbol from the cipher symbol, mod 27.
#[inline]
pub fn decode_symbol(cipher: Symbol, pad: Symbol) -> Symbol {
    let rank = (i16::from(cipher.rank()) - i16::from(pad.rank())).rem_euclid(ALPHABET_SIZE.into());
    Symbol(rank as u8)
}

/// Add the pad symbol to the plain symbol, mod 27.
#[inline]
pub fn encode_symbol(plain: Symbol, pad: Symbol) -> Symbol {
    Symbol((plain.rank() + pad.rank()) % ALPHABET_SIZE)
}

/// Check that every byte is a symbol, reporting the first one that isn't.
pub fn validate(bytes: &[u8]) -> Result<()> {
    match bytes.iter().position(|b| Symbol::from_byte(*b).is_none()) {
        Some(position) => Err(ProtocolError::InvalidSymbol {
            byte: bytes[position],
            position,
        }),
        None => Ok(()),
    }
}

fn apply(text: &[u8], key: &[u8], op: fn(Symbol, Symbol) -> Symbol) -> Result<Vec<u8>> {
    if key.len() < text.len() {
        return Err(ProtocolError::KeyTooShort {
            text: text.len(),
            key: key.len(),
        });
    }

    text.iter()
        .zip(key)
        .enumerate()
        .map(|(position, (&t, &k))| {
            let t = Symbol::try_from(t)
                .map_err(|byte| ProtocolError::InvalidSymbol { byte, position })?;
            let k = Symbol::try_from(k)
                .map_err(|byte| ProtocolError::InvalidSymbol { byte, position })?;
            Ok(op(t, k).as_byte())
        })
        .collect()
}

/// Decode `text` with the leading `text.len()` symbols of `key`.
///
/// # Errors
/// `KeyTooShort` if the key cannot cover the text, `InvalidSymbol` on any
/// byte outside the alphabet.
pub fn decode(text: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    apply(text, key, decode_symbol)
}

/// Encode `text` with the leading `text.len()` symbols of `key`.
///
/// # Errors
/// Same as [`decode`].
pub fn encode(text: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    apply(text, key, encode_symbol)
}

/// Which way a service runs the pad.
///
/// Each direction answers to its own service tag, so a client can only talk
/// to a daemon of the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Plain text in, cipher text out
    #[serde(rename = "enc")]
    Encode,
    /// Cipher text in, plain text out
    #[default]
    #[serde(rename = "dec")]
    Decode,
}

impl Direction {
    /// Service tag exchanged in the handshake
    pub const fn tag(self) -> &'static str {
        match self {
            Direction::Encode => "enc",
            Direction::Decode => "dec",
        }
    }

    /// Run the pad over `text` in this direction.
    pub fn apply(self, text: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        match self {
            Direction::Encode => encode(text, key),
            Direction::Decode => decode(text, key),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Direction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dec" | "decode" => Ok(Direction::Decode),
            "enc" | "encode" => Ok(Direction::Encode),
            other => Err(ProtocolError::Argument(format!(
                "unknown direction '{other}' (expected 'dec' or 'enc')"
            ))),
        }
    }
}
