//! # Connection Acceptor
//!
//! Binds the listening socket and hands every accepted connection to its own
//! worker task.
//!
//! ```text
//! Init -> Listening -> (Accepting <-> Dispatching)* -> Shutdown
//! ```
//!
//! Finished workers are reaped from a `JoinSet` inside the same `select!` as
//! the accept, so reclaiming them never holds up the next accept. A worker
//! that fails or panics is logged by the reaper and counted; the acceptor and
//! the other workers carry on.

use futures::StreamExt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::service::worker::{handle_connection, WorkerContext};
use crate::utils::metrics::global_metrics;

type WorkerOutcome = (SocketAddr, Result<usize>);

/// A bound listener ready to serve
pub struct Acceptor {
    listener: TcpListener,
    ctx: WorkerContext,
    shutdown_timeout: Duration,
}

/// Bind the configured address and start listening.
///
/// # Errors
/// `ConfigError` for an unusable address, `Io` if the socket cannot be bound.
#[instrument(skip(config), fields(address = %config.server.address))]
pub async fn bind(config: &NetworkConfig) -> Result<Acceptor> {
    config.validate_strict()?;
    let addr = config.server.socket_addr()?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(config.server.backlog)?;

    info!(
        address = %listener.local_addr()?,
        direction = %config.server.direction,
        policy = %config.server.handshake_policy,
        "Listening"
    );

    Ok(Acceptor {
        listener,
        ctx: WorkerContext::from(config),
        shutdown_timeout: config.server.shutdown_timeout,
    })
}

impl Acceptor {
    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown_rx` fires or its sender is dropped.
    ///
    /// # Errors
    /// An accept error ends the acceptor and is returned. Worker errors never
    /// reach this far.
    pub async fn serve(self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<()> {
        let Acceptor {
            listener,
            ctx,
            shutdown_timeout,
        } = self;

        let mut incoming = TcpListenerStream::new(listener);
        let mut workers: JoinSet<WorkerOutcome> = JoinSet::new();
        let metrics = global_metrics();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!(active = workers.len(), "Shutting down acceptor");
                    break;
                }

                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    reap(joined);
                    while let Some(joined) = workers.try_join_next() {
                        reap(joined);
                    }
                }

                accepted = incoming.next() => {
                    let stream = match accepted {
                        Some(Ok(stream)) => stream,
                        Some(Err(e)) => {
                            error!(error = %e, "Accept failed");
                            return Err(e.into());
                        }
                        None => break,
                    };

                    let peer = match stream.peer_addr() {
                        Ok(peer) => peer,
                        Err(e) => {
                            // reset between accept and dispatch
                            debug!(error = %e, "Dropping connection without peer address");
                            continue;
                        }
                    };

                    metrics.connection_established();
                    debug!(%peer, "Dispatching connection");

                    let span = info_span!("worker", %peer);
                    workers.spawn(
                        async move { (peer, handle_connection(stream, ctx).await) }.instrument(span),
                    );
                }
            }
        }

        drop(incoming);
        drain(workers, shutdown_timeout).await;
        Ok(())
    }
}

/// Account for one finished worker.
fn reap(joined: std::result::Result<WorkerOutcome, JoinError>) {
    let metrics = global_metrics();
    metrics.connection_closed();

    match joined {
        Ok((peer, Ok(sent))) => {
            metrics.exchange_completed();
            debug!(%peer, sent, "Worker finished");
        }
        Ok((peer, Err(e))) => {
            metrics.worker_failed();
            warn!(%peer, error = %e, "Worker failed");
        }
        Err(e) if e.is_panic() => {
            metrics.worker_panicked();
            error!(error = %e, "Worker panicked");
        }
        Err(e) => {
            debug!(error = %e, "Worker cancelled");
        }
    }
}

/// Wait for in-flight workers, aborting whatever is left after `timeout`.
async fn drain(mut workers: JoinSet<WorkerOutcome>, timeout: Duration) {
    if workers.is_empty() {
        return;
    }

    info!(active = workers.len(), "Waiting for workers to finish");
    let waited = tokio::time::timeout(timeout, async {
        while let Some(joined) = workers.join_next().await {
            reap(joined);
        }
    })
    .await;

    if waited.is_err() {
        warn!(remaining = workers.len(), "Shutdown timeout reached, aborting workers");
        workers.abort_all();
        while let Some(joined) = workers.join_next().await {
            reap(joined);
        }
    }
}

/// Run the daemon until ctrl-c.
pub async fn start_server(config: &NetworkConfig) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            info!("Received CTRL+C signal, shutting down");
            let _ = shutdown_tx.send(()).await;
        }
    });

    start_server_with_shutdown(config, shutdown_rx).await
}

/// Run the daemon until `shutdown_rx` fires.
pub async fn start_server_with_shutdown(
    config: &NetworkConfig,
    shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    let acceptor = bind(config).await?;
    acceptor.serve(shutdown_rx).await?;
    global_metrics().log_metrics();
    Ok(())
}
