//! Per-connection exchange, server side.
//!
//! A worker owns one accepted stream for its whole life: handshake, two
//! payload reads, one pad operation, one reply, close. Nothing is shared with
//! other workers except the atomic metrics counters.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};

use crate::config::NetworkConfig;
use crate::core::cipher::Direction;
use crate::error::Result;
use crate::protocol::handshake::{server_handshake, HandshakePolicy};
use crate::transport::{receive_payload, send_exact};
use crate::utils::metrics::{global_metrics, Timer};

/// Everything a worker needs to know, copied into each task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerContext {
    pub direction: Direction,
    pub policy: HandshakePolicy,
    pub max_payload: usize,
}

impl From<&NetworkConfig> for WorkerContext {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            direction: config.server.direction,
            policy: config.server.handshake_policy,
            max_payload: config.transport.max_payload_size,
        }
    }
}

/// Run one full exchange on `conn` and close it.
///
/// Returns the number of result bytes sent back.
///
/// # Errors
/// Any handshake, payload, or transport failure. The caller only logs it:
/// a failed exchange ends this connection and nothing else.
#[instrument(skip_all, fields(direction = %ctx.direction))]
pub async fn handle_connection<S>(mut conn: S, ctx: WorkerContext) -> Result<usize>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let metrics = global_metrics();
    let _timer = Timer::start("exchange");

    metrics.handshake_attempt();
    let header =
        match server_handshake(&mut conn, ctx.direction.tag(), ctx.max_payload, ctx.policy).await {
            Ok(header) => {
                metrics.handshake_success();
                header
            }
            Err(e) => {
                metrics.handshake_failed();
                return Err(e);
            }
        };

    let text = receive_payload(&mut conn, header.text_len).await?;
    metrics.payload_received(text.len() as u64);
    let key = receive_payload(&mut conn, header.key_len).await?;
    metrics.payload_received(key.len() as u64);

    let result = ctx.direction.apply(&text, &key)?;

    let sent = send_exact(&mut conn, &result).await?;
    metrics.payload_sent(sent as u64);

    // peer may already be gone; the reply is out either way
    let _ = conn.shutdown().await;

    debug!(text_len = header.text_len, key_len = header.key_len, sent, "Exchange complete");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_PAYLOAD_SIZE;
    use crate::error::ProtocolError;
    use crate::protocol::handshake::client_handshake;
    use tokio::io::duplex;

    fn ctx(direction: Direction, policy: HandshakePolicy) -> WorkerContext {
        WorkerContext {
            direction,
            policy,
            max_payload: MAX_PAYLOAD_SIZE,
        }
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_worker_decodes_over_stream() {
        let (mut client, server) = duplex(1024);
        let worker = tokio::spawn(handle_connection(
            server,
            ctx(Direction::Decode, HandshakePolicy::Strict),
        ));

        client_handshake(&mut client, "dec", 4, 6).await.unwrap();
        send_exact(&mut client, b"NBHR").await.unwrap();
        send_exact(&mut client, b"AAAAZZ").await.unwrap();
        let plain = receive_payload(&mut client, 4).await.unwrap();

        assert_eq!(&plain[..], b"NBHR");
        assert_eq!(worker.await.unwrap().unwrap(), 4);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_worker_encodes_over_stream() {
        let (mut client, server) = duplex(1024);
        let worker = tokio::spawn(handle_connection(
            server,
            ctx(Direction::Encode, HandshakePolicy::Strict),
        ));

        client_handshake(&mut client, "enc", 3, 3).await.unwrap();
        send_exact(&mut client, b"AZ ").await.unwrap();
        send_exact(&mut client, b"BBB").await.unwrap();
        let cipher = receive_payload(&mut client, 3).await.unwrap();

        assert_eq!(&cipher[..], b"B A");
        assert!(worker.await.unwrap().is_ok());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_worker_rejects_bad_symbols() {
        let (mut client, server) = duplex(1024);
        let worker = tokio::spawn(handle_connection(
            server,
            ctx(Direction::Decode, HandshakePolicy::Strict),
        ));

        client_handshake(&mut client, "dec", 3, 3).await.unwrap();
        send_exact(&mut client, b"a!c").await.unwrap();
        send_exact(&mut client, b"AAA").await.unwrap();

        let err = worker.await.unwrap().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidSymbol { byte: b'a', position: 0 }));
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_worker_fails_when_client_leaves_mid_payload() {
        let (mut client, server) = duplex(1024);
        let worker = tokio::spawn(handle_connection(
            server,
            ctx(Direction::Decode, HandshakePolicy::Strict),
        ));

        client_handshake(&mut client, "dec", 10, 10).await.unwrap();
        send_exact(&mut client, b"ABC").await.unwrap();
        drop(client);

        let err = worker.await.unwrap().unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));
    }
}
