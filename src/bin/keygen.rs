//! Prints a random pad of the requested length, followed by a newline.

use clap::Parser;
use std::io::Write;

use otp_protocol::utils::keygen::generate_key;

#[derive(Parser)]
#[command(name = "keygen", version)]
#[command(about = "Generate a one-time pad over A-Z and space", long_about = None)]
struct Cli {
    /// Number of symbols to generate
    length: usize,
}

fn main() {
    let cli = Cli::parse();
    let mut key = generate_key(&mut rand::rng(), cli.length);
    key.push(b'\n');

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(&key).and_then(|()| stdout.flush()) {
        eprintln!("KEYGEN: {e}");
        std::process::exit(1);
    }
}
