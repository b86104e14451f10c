#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use otp_protocol::config::NetworkConfig;
use otp_protocol::service::{bind, Client};
use otp_protocol::{Direction, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A daemon bound to an ephemeral loopback port
pub struct Daemon {
    pub port: u16,
    pub shutdown: mpsc::Sender<()>,
    pub handle: JoinHandle<Result<()>>,
}

impl Daemon {
    pub async fn stop(self) -> Result<()> {
        self.shutdown.send(()).await.expect("acceptor still running");
        self.handle.await.expect("acceptor task panicked")
    }
}

pub fn loopback_config(direction: Direction) -> NetworkConfig {
    NetworkConfig::default_with_overrides(|config| {
        config.server.address = "127.0.0.1:0".to_string();
        config.server.direction = direction;
        config.server.shutdown_timeout = Duration::from_secs(2);
        config.client.host = "127.0.0.1".to_string();
        config.client.direction = direction;
    })
}

pub async fn spawn_daemon(config: &NetworkConfig) -> Daemon {
    let acceptor = bind(config).await.expect("bind loopback");
    let port = acceptor.local_addr().unwrap().port();
    let (shutdown, rx) = mpsc::channel(1);
    let handle = tokio::spawn(acceptor.serve(rx));
    Daemon {
        port,
        shutdown,
        handle,
    }
}

pub fn client(direction: Direction) -> Client {
    Client::from_config(&loopback_config(direction))
}
