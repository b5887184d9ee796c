use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod job;
pub mod migrate;
pub mod serve;

use job::JobId;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Create or upgrade the db schema
    Migrate {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start an interactive travel chat session
    Chat {},
    /// Run a periodic job once
    Job {
        #[arg(long, value_enum)]
        id: JobId,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Migrate {}) => {
            migrate::run(&config.db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Chat {}) => {
            chat::run(config).await?;
        }
        Some(Command::Job { id }) => {
            job::run(id, config).await?;
        }
        None => {}
    }

    Ok(())
}
