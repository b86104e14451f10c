//! Pad daemon: listens on a port and serves one exchange per connection
//! until killed.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use otp_protocol::config::NetworkConfig;
use otp_protocol::protocol::handshake::HandshakePolicy;
use otp_protocol::service::start_server;
use otp_protocol::utils::logging::init_logging;
use otp_protocol::{Direction, Result};

#[derive(Parser)]
#[command(name = "otp_dec_d", version)]
#[command(about = "One-time-pad daemon: decodes (or encodes) text sent by clients", long_about = None)]
struct Cli {
    /// Port to listen on, on all local addresses unless the config says otherwise
    port: u16,

    /// Pad direction served: 'dec' or 'enc'
    #[arg(short, long)]
    direction: Option<Direction>,

    /// What to do when a client names another service: 'strict' or 'lenient'
    #[arg(long)]
    policy: Option<HandshakePolicy>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = NetworkConfig::load(cli.config.as_deref())?;
    config.server = config.server.with_port(cli.port)?;
    if let Some(direction) = cli.direction {
        config.server.direction = direction;
    }
    if let Some(policy) = cli.policy {
        config.server.handshake_policy = policy;
    }

    init_logging(&config.logging)?;
    info!(app = %config.logging.app_name, "Starting daemon");

    start_server(&config).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("SERVER: {e}");
        std::process::exit(e.exit_code());
    }
}
