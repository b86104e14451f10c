//! # Utility Modules
//!
//! Supporting pieces around the protocol core.
//!
//! ## Components
//! - **Logging**: `tracing-subscriber` setup from [`LoggingConfig`](crate::config::LoggingConfig)
//! - **Metrics**: thread-safe observability counters
//! - **Text**: reading ciphertext and key sources from disk
//! - **Keygen**: random pads over the 27-symbol alphabet

pub mod keygen;
pub mod logging;
pub mod metrics;
pub mod text;

pub use metrics::{global_metrics, Metrics, MetricsSnapshot};
