//! # Handshake Header
//!
//! The header is the only framed record on the wire. It has no length prefix:
//! both ends derive its size from the service tag.
//!
//! ```text
//! "<tag> <textLen> <keyLen>" zero-padded to len(tag) + 23 bytes
//! ```
//!
//! [`HeaderCodec`] owns that rule. Its decoder yields nothing until the full
//! fixed-size record is buffered, so a header that arrives in pieces is
//! handled the same as one that arrives whole.

use bytes::{BufMut, BytesMut};
use std::fmt;
use tokio_util::codec::{Decoder, Encoder};

use crate::config::HEADER_PADDING;
use crate::error::{constants, ProtocolError, Result};

/// Parsed handshake header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub tag: String,
    pub text_len: usize,
    pub key_len: usize,
}

impl Header {
    pub fn new(tag: impl Into<String>, text_len: usize, key_len: usize) -> Self {
        Self {
            tag: tag.into(),
            text_len,
            key_len,
        }
    }

    /// Check declared lengths before they are used to size any buffer.
    ///
    /// # Errors
    /// `InvalidHeader` for an empty text, `OversizedPayload` for a length
    /// above `max_payload`, `KeyTooShort` when the key cannot cover the text.
    pub fn validate(&self, max_payload: usize) -> Result<()> {
        if self.text_len == 0 {
            return Err(ProtocolError::InvalidHeader(
                "declared text length is zero".into(),
            ));
        }
        if self.text_len > max_payload {
            return Err(ProtocolError::OversizedPayload(self.text_len));
        }
        if self.key_len > max_payload {
            return Err(ProtocolError::OversizedPayload(self.key_len));
        }
        if self.key_len < self.text_len {
            return Err(ProtocolError::KeyTooShort {
                text: self.text_len,
                key: self.key_len,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.tag, self.text_len, self.key_len)
    }
}

/// Fixed header size for a given service tag
#[inline]
pub const fn header_size(tag: &str) -> usize {
    tag.len() + HEADER_PADDING
}

/// Fixed-size codec for [`Header`] records
#[derive(Debug, Clone, Copy)]
pub struct HeaderCodec {
    size: usize,
}

impl HeaderCodec {
    /// Codec for headers carrying `tag`
    pub const fn for_tag(tag: &str) -> Self {
        Self {
            size: header_size(tag),
        }
    }

    /// Bytes in one header on the wire
    pub const fn size(&self) -> usize {
        self.size
    }
}

fn parse_len(token: Option<&str>, missing: &str) -> Result<usize> {
    let token = token.ok_or_else(|| ProtocolError::InvalidHeader(missing.into()))?;
    token
        .parse::<usize>()
        .map_err(|_| ProtocolError::InvalidHeader(format!("length '{token}' is not a number")))
}

/// Parse the text of a header record, ignoring the zero padding.
pub fn parse_header(raw: &[u8]) -> Result<Header> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let text = std::str::from_utf8(&raw[..end])
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| ProtocolError::InvalidHeader(constants::ERR_HEADER_NOT_ASCII.into()))?;

    let mut tokens = text.split_whitespace();
    let tag = tokens
        .next()
        .ok_or_else(|| ProtocolError::InvalidHeader(constants::ERR_MISSING_TAG.into()))?;
    let text_len = parse_len(tokens.next(), constants::ERR_MISSING_TEXT_LEN)?;
    let key_len = parse_len(tokens.next(), constants::ERR_MISSING_KEY_LEN)?;

    Ok(Header::new(tag, text_len, key_len))
}

impl Encoder<Header> for HeaderCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Header, dst: &mut BytesMut) -> Result<()> {
        let text = item.to_string();
        if text.len() > self.size {
            return Err(ProtocolError::InvalidHeader(
                constants::ERR_HEADER_TOO_LONG.into(),
            ));
        }

        dst.reserve(self.size);
        dst.put_slice(text.as_bytes());
        dst.put_bytes(0, self.size - text.len());
        Ok(())
    }
}

impl Decoder for HeaderCodec {
    type Item = Header;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Header>> {
        if src.len() < self.size {
            src.reserve(self.size - src.len());
            return Ok(None);
        }

        let raw = src.split_to(self.size);
        parse_header(&raw).map(Some)
    }
}
