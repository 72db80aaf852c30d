// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relaycast - a Telegram video broadcast bot.
//!
//! This is the binary entry point for the relaycast bot.

mod router;
mod serve;

use clap::{Parser, Subcommand};

/// Relaycast - a Telegram video broadcast bot.
#[derive(Parser, Debug)]
#[command(name = "relaycast", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the relaycast bot.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match relaycast_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            relaycast_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("relaycast: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config =
            relaycast_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.name, "relaycast");
    }
}
