//! Client side of the exchange.
//!
//! Everything that can be checked locally is checked before a socket is
//! opened: symbols, empty text, the key covering the text, and the payload
//! limit. Only then does the client connect, run the handshake, and send.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, instrument};

use crate::config::NetworkConfig;
use crate::core::cipher::{validate, Direction};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::handshake::client_handshake;
use crate::transport::{receive_payload, send_exact};

/// One-shot client for the pad daemon
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    direction: Direction,
    max_payload: usize,
}

impl Client {
    pub fn new(host: impl Into<String>, direction: Direction, max_payload: usize) -> Self {
        Self {
            host: host.into(),
            direction,
            max_payload,
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(
            config.client.host.clone(),
            config.client.direction,
            config.transport.max_payload_size,
        )
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Reject a request that the daemon could never serve.
    ///
    /// # Errors
    /// `Argument` for an empty text, `InvalidSymbol`, `KeyTooShort`,
    /// `OversizedPayload`.
    pub fn check(&self, text: &[u8], key: &[u8]) -> Result<()> {
        if text.is_empty() {
            return Err(ProtocolError::Argument("text is empty".into()));
        }
        validate(text)?;
        validate(key)?;
        if key.len() < text.len() {
            return Err(ProtocolError::KeyTooShort {
                text: text.len(),
                key: key.len(),
            });
        }
        if text.len() > self.max_payload {
            return Err(ProtocolError::OversizedPayload(text.len()));
        }
        if key.len() > self.max_payload {
            return Err(ProtocolError::OversizedPayload(key.len()));
        }
        Ok(())
    }

    /// Check, connect, and run one exchange against the daemon on `port`.
    #[instrument(skip(self, text, key), fields(host = %self.host, direction = %self.direction))]
    pub async fn request(&self, port: u16, text: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        self.check(text, key)?;
        let mut stream = connect(&self.host, port).await?;
        exchange(&mut stream, self.direction, text, key).await
    }
}

/// Connect to the first resolved address of `host:port` that accepts.
///
/// # Errors
/// `Connect` when resolution fails or no address accepts.
#[instrument]
pub async fn connect(host: &str, port: u16) -> Result<TcpStream> {
    let address = format!("{host}:{port}");
    let addrs = lookup_host((host, port))
        .await
        .map_err(|e| ProtocolError::Connect {
            address: address.clone(),
            reason: e.to_string(),
        })?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                debug!(%addr, "Connected");
                return Ok(stream);
            }
            Err(e) => {
                debug!(%addr, error = %e, "Connect attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(ProtocolError::Connect {
        address,
        reason: last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| constants::ERR_NO_ADDRESS.to_string()),
    })
}

/// Run handshake, send both payloads, and read back `text.len()` bytes.
///
/// Nothing past the header is sent unless the server answers with the
/// expected tag.
pub async fn exchange<S>(conn: &mut S, direction: Direction, text: &[u8], key: &[u8]) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    client_handshake(conn, direction.tag(), text.len(), key.len()).await?;

    send_exact(conn, text).await?;
    send_exact(conn, key).await?;

    let result = receive_payload(conn, text.len()).await?;
    let _ = conn.shutdown().await;

    Ok(result.to_vec())
}
