//! tinykv - Command-line client for tinykv
//!
//! Provides both a REPL and one-shot command execution.

mod commands;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::time::Duration;
use tinykv_client::{ConnectionConfig, Session};
use tinykv_protocol::{ValueKind, DEFAULT_HOST, DEFAULT_PORT};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tinykv")]
#[command(about = "Command-line client for the tinykv key-value store")]
#[command(version)]
struct Cli {
    /// Server host
    #[arg(long, env = "TINYKV_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, env = "TINYKV_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Key region size in bytes (must match the server)
    #[arg(long, env = "TINYKV_MAX_KEY_SIZE")]
    max_key_size: Option<usize>,

    /// Maximum value size in bytes
    #[arg(long, env = "TINYKV_MAX_VALUE_SIZE")]
    max_value_size: Option<usize>,

    /// Response timeout in milliseconds (waits indefinitely if unset)
    #[arg(long, env = "TINYKV_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive REPL
    Repl,

    /// Ping the server
    Ping,

    /// Get the value stored under a key
    Get {
        key: String,

        /// Expected value type (string, number, bool)
        #[arg(short = 't', long = "type", default_value = "string")]
        kind: ValueKind,
    },

    /// Store a value under a key
    Set {
        key: String,

        value: String,

        /// Value type (string, number, bool)
        #[arg(short = 't', long = "type", default_value = "string")]
        kind: ValueKind,
    },

    /// Check whether a key exists
    Exists { key: String },

    /// Delete a key
    Delete { key: String },
}

impl Cli {
    fn connection_config(&self) -> Result<ConnectionConfig, tinykv_client::ClientError> {
        let mut builder = ConnectionConfig::builder()
            .host(self.host.clone())
            .port(self.port);
        if let Some(size) = self.max_key_size {
            builder = builder.max_key_size(size);
        }
        if let Some(size) = self.max_value_size {
            builder = builder.max_value_size(size);
        }
        if let Some(ms) = self.timeout_ms {
            builder = builder.request_timeout(Duration::from_millis(ms));
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.connection_config()?;
    let session = Session::new(config);

    match cli.command {
        Some(Commands::Repl) | None => {
            repl::run(session).await?;
        }
        Some(cmd) => {
            session.connect().await.map_err(|e| {
                eprintln!("{}: {}", "Connection failed".red(), e);
                e
            })?;

            let result = commands::execute(&session, cmd).await;
            session.close().await?;

            match result {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    eprintln!("{}: {}", "Error".red(), e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
