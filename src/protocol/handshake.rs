//! Service-tag handshake
//!
//! The client opens every exchange with a fixed-size header naming the
//! service it expects and the lengths of the two payloads that follow. The
//! server answers with its own tag and nothing else. The tag is a cleartext
//! service discriminator: it keeps an encode client away from a decode daemon
//! and vice versa, and is not authentication.
//!
//! Both sides read their half of the handshake with [`ReadMode::Full`], so a
//! header split across several segments is still read whole.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, instrument, warn};

use crate::core::header::{Header, HeaderCodec};
use crate::error::{ProtocolError, Result};
use crate::transport::{receive_exact, send_exact, ReadMode};

/// What the server does when the client's header names another service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandshakePolicy {
    /// Reply with the server tag, then drop the connection
    #[default]
    Strict,
    /// Reply with the server tag, log the mismatch and serve the request anyway
    Lenient,
}

impl fmt::Display for HandshakePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakePolicy::Strict => f.write_str("strict"),
            HandshakePolicy::Lenient => f.write_str("lenient"),
        }
    }
}

impl FromStr for HandshakePolicy {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(HandshakePolicy::Strict),
            "lenient" => Ok(HandshakePolicy::Lenient),
            other => Err(ProtocolError::Argument(format!(
                "unknown handshake policy '{other}' (expected 'strict' or 'lenient')"
            ))),
        }
    }
}

/// Send the header and check the server's reply.
///
/// # Errors
/// `HandshakeMismatch` if the server answers with another tag,
/// `ConnectionClosed` if it hangs up before answering, transport errors as
/// they occur.
#[instrument(skip(conn))]
pub async fn client_handshake<S>(
    conn: &mut S,
    tag: &str,
    text_len: usize,
    key_len: usize,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let mut codec = HeaderCodec::for_tag(tag);
    let mut buf = BytesMut::with_capacity(codec.size());
    codec.encode(Header::new(tag, text_len, key_len), &mut buf)?;
    send_exact(conn, &buf).await?;

    let (reply, n) = receive_exact(conn, tag.len(), ReadMode::Full).await?;
    if n == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }

    let reply = &reply[..n];
    if reply != tag.as_bytes() {
        return Err(ProtocolError::HandshakeMismatch {
            expected: tag.to_string(),
            received: String::from_utf8_lossy(reply).into_owned(),
        });
    }

    debug!("Server accepted handshake");
    Ok(())
}

/// Read the client's header, answer with `tag`, and return the declared lengths.
///
/// The reply is sent before the tag comparison, so a mismatched client learns
/// which service it reached. Declared lengths are checked against
/// `max_payload` before they are returned.
///
/// # Errors
/// `HandshakeMismatch` under [`HandshakePolicy::Strict`], `InvalidHeader`,
/// `OversizedPayload` or `KeyTooShort` for unusable headers,
/// `ConnectionClosed` if the client leaves mid-header.
#[instrument(skip(conn))]
pub async fn server_handshake<S>(
    conn: &mut S,
    tag: &str,
    max_payload: usize,
    policy: HandshakePolicy,
) -> Result<Header>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let mut codec = HeaderCodec::for_tag(tag);
    let (mut raw, n) = receive_exact(conn, codec.size(), ReadMode::Full).await?;
    if n < codec.size() {
        return Err(ProtocolError::ConnectionClosed);
    }

    let header = codec
        .decode(&mut raw)?
        .ok_or_else(|| ProtocolError::InvalidHeader("incomplete header".into()))?;

    send_exact(conn, tag.as_bytes()).await?;

    if header.tag != tag {
        match policy {
            HandshakePolicy::Strict => {
                return Err(ProtocolError::HandshakeMismatch {
                    expected: tag.to_string(),
                    received: header.tag,
                });
            }
            HandshakePolicy::Lenient => {
                warn!(expected = tag, received = %header.tag, "Handshake tag mismatch, continuing");
            }
        }
    }

    header.validate(max_payload)?;

    debug!(text_len = header.text_len, key_len = header.key_len, "Handshake complete");
    Ok(header)
}
