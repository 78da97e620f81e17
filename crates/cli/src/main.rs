//! Chaty CLI — the main entry point.
//!
//! Commands:
//! - `run`   — Start the full bot (transport + engine + gateway)
//! - `seed`  — Seed the FAQ table with the default entries

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "chaty",
    about = "Chaty — WhatsApp FAQ support bot",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the full bot runtime
    Run {
        /// Override the gateway port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Seed the FAQ table with the default entries
    Seed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { port } => commands::run::run(port).await?,
        Commands::Seed => commands::seed::run().await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_port() {
        let cli = Cli::try_parse_from(["chaty", "run", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Run { port } => assert_eq!(port, Some(8080)),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn parses_seed_with_global_verbose() {
        let cli = Cli::try_parse_from(["chaty", "seed", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Seed));
    }
}
