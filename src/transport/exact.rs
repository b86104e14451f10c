use bytes::{Bytes, BytesMut};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{constants, ProtocolError, Result};

/// How long a receive keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Keep reading until the buffer is full or the peer closes
    Full,
    /// Return after the first read that produces data
    Available,
}

/// Write all of `bytes`, retrying partial writes.
///
/// Returns the number of bytes written, which is always `bytes.len()`.
///
/// # Errors
/// `Transport` if the write fails or the peer stops accepting bytes. There is
/// no partial-success result.
pub async fn send_exact<W>(conn: &mut W, bytes: &[u8]) -> Result<usize>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut sent = 0;

    while sent < bytes.len() {
        match conn.write(&bytes[sent..]).await {
            Ok(0) => return Err(ProtocolError::Transport(constants::ERR_ZERO_WRITE.into())),
            Ok(n) => {
                sent += n;
                trace!(written = n, remaining = bytes.len() - sent, "Partial write");
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProtocolError::Transport(format!("write failed: {e}"))),
        }
    }

    conn.flush()
        .await
        .map_err(|e| ProtocolError::Transport(format!("flush failed: {e}")))?;

    Ok(sent)
}

/// Read up to `len` bytes into a zero-initialized buffer.
///
/// The buffer always has length `len`; the returned count says how much of it
/// was filled. A count of zero means the peer closed before sending anything.
/// With [`ReadMode::Full`] the call only returns short if the peer closed.
///
/// # Errors
/// `Transport` if a read fails.
pub async fn receive_exact<R>(conn: &mut R, len: usize, mode: ReadMode) -> Result<(BytesMut, usize)>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::zeroed(len);
    let mut filled = 0;

    while filled < len {
        match conn.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => {
                filled += n;
                trace!(read = n, filled, len, "Partial read");
                if mode == ReadMode::Available {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProtocolError::Transport(format!("read failed: {e}"))),
        }
    }

    Ok((buf, filled))
}

/// Read exactly `len` bytes of payload.
///
/// # Errors
/// `ConnectionClosed` if the peer leaves before `len` bytes arrive, otherwise
/// as [`receive_exact`].
pub async fn receive_payload<R>(conn: &mut R, len: usize) -> Result<Bytes>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let (buf, filled) = receive_exact(conn, len, ReadMode::Full).await?;
    if filled < len {
        trace!(filled, len, "{}", constants::ERR_SHORT_READ);
        return Err(ProtocolError::ConnectionClosed);
    }
    Ok(buf.freeze())
}
