//! # Service Layer
//!
//! The daemon and the client built on the protocol layer.
//!
//! ## Components
//! - **Server**: listening socket, accept loop, worker reaping, shutdown
//! - **Worker**: one connection's full exchange on the daemon side
//! - **Client**: local checks, connect, one exchange

pub mod client;
pub mod server;
pub mod worker;

pub use client::Client;
pub use server::{bind, start_server, start_server_with_shutdown, Acceptor};
