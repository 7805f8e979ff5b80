//! Loupe CLI, the main entry point.
//!
//! Commands:
//! - `init`   Write a default config file
//! - `chat`   Interactive chat or single-message mode
//! - `serve`  Start the HTTP gateway with live inspection streams
//! - `tools`  List the tools the agent can call

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "loupe",
    about = "Loupe: a tool-calling agent you can watch think",
    version
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
    /// Write a default configuration file
    Init,

    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Print inspection events to stderr while the agent works
        #[arg(long)]
        trace: bool,
    },

    /// Start the HTTP gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List available tools and their schemas
    Tools,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Chat prints inspection itself (with --trace); keep its log output quiet.
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Chat { .. }, false) => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Chat { message, trace } => commands::chat::run(message, trace).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Tools => commands::tools::run()?,
    }

    Ok(())
}
