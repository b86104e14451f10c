//! Pad client: sends a text and a key to the daemon and prints the result.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use otp_protocol::config::NetworkConfig;
use otp_protocol::service::Client;
use otp_protocol::utils::logging::init_logging;
use otp_protocol::utils::text::read_text;
use otp_protocol::{Direction, Result};

#[derive(Parser)]
#[command(name = "otp_dec", version)]
#[command(about = "Send a text and a pad to the one-time-pad daemon", long_about = None)]
struct Cli {
    /// File holding the text (ciphertext when decoding)
    text: PathBuf,

    /// File holding the pad; must be at least as long as the text
    key: PathBuf,

    /// Port the daemon listens on
    port: u16,

    /// Pad direction requested: 'dec' or 'enc'
    #[arg(short, long)]
    direction: Option<Direction>,

    /// Host the daemon runs on
    #[arg(long)]
    host: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = NetworkConfig::load(cli.config.as_deref())?;
    if let Some(direction) = cli.direction {
        config.client.direction = direction;
    }
    if let Some(host) = cli.host {
        config.client.host = host;
    }
    config.validate_strict()?;

    init_logging(&config.logging)?;

    let text = read_text(&cli.text).await?;
    let key = read_text(&cli.key).await?;

    let result = Client::from_config(&config)
        .request(cli.port, &text, &key)
        .await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&result)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("CLIENT: {e}");
        std::process::exit(e.exit_code());
    }
}
