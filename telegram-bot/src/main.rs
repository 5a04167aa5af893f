//! `mbot` binary.

use anyhow::Result;
use clap::Parser;
use telegram_bot::{load_config, run_bot, run_export, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = load_config(token)?;
            run_bot(config).await
        }
        Commands::Export { hours, dir } => {
            let config = load_config(None)?;
            match run_export(config, hours, dir).await? {
                Some(outcome) => println!("Exported {} messages to {}", outcome.rows, outcome.path.display()),
                None => println!("No messages to export"),
            }
            Ok(())
        }
    }
}
