mod gemini_client;
mod cli;

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Message to send to the tutor
    #[arg(short, long)]
    input: Option<String>,

    /// Seconds to wait for a text explanation
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a tutoring session
    Chat {
        /// Message to send to the tutor
        #[arg(short, long)]
        input: Option<String>,

        /// Seconds to wait for a text explanation
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let (input, timeout_secs, verbose) = match cli.command {
        Some(Commands::Chat {
            input,
            timeout_secs,
            verbose,
        }) => (input, timeout_secs, verbose),
        None => (cli.input, cli.timeout_secs, cli.verbose),
    };

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Starting Counticus");

    let interactive = input.is_none();
    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        input,
        interactive,
        Duration::from_secs(timeout_secs),
    );
    chat_context.run().await
}
