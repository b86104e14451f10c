//! # otp-protocol
//!
//! A one-time-pad daemon and client speaking a small length-declared TCP
//! protocol.
//!
//! A client sends a fixed-size header naming the service and the lengths of
//! two payloads, waits for the daemon to echo its service tag, then sends the
//! text and the key. The daemon runs the pad over the text and sends back
//! exactly as many bytes as the text had. One connection carries exactly one
//! exchange.
//!
//! ## Layout
//! - [`core`]: symbol alphabet, pad arithmetic, handshake header codec
//! - [`transport`]: exact-length send and receive
//! - [`protocol`]: the service-tag handshake
//! - [`service`]: acceptor, per-connection worker, client
//! - [`config`], [`error`], [`utils`]: configuration, errors, logging, metrics
//!
//! ## Example
//! ```rust,no_run
//! use otp_protocol::config::NetworkConfig;
//! use otp_protocol::service::{bind, Client};
//! use tokio::sync::mpsc;
//!
//! # async fn run() -> otp_protocol::error::Result<()> {
//! let config = NetworkConfig::default();
//! let acceptor = bind(&config).await?;
//! let port = acceptor.local_addr()?.port();
//! let (_shutdown_tx, shutdown_rx) = mpsc::channel(1);
//! tokio::spawn(acceptor.serve(shutdown_rx));
//!
//! let plain = Client::from_config(&config)
//!     .request(port, b"NBHR", b"AAAA")
//!     .await?;
//! assert_eq!(plain, b"NBHR");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use crate::core::cipher::{decode, decode_symbol, encode, encode_symbol, Direction, Symbol};
pub use crate::error::{ProtocolError, Result};
