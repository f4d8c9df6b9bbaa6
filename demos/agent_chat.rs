//! Terminal channel for the orchestrator
//!
//! Reads one message per line from stdin and prints the agent's reply.
//! Configuration comes from the environment (a `.env` file is loaded first).
//! Press Ctrl-C while a reply is pending to cancel that message; send an empty
//! line to quit.
//!
//! Run with: cargo run --example agent_chat

use anyhow::Context;
use switchyard::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    let orchestrator = Orchestrator::from_config(&config).context("invalid configuration")?;
    let user = std::env::var("USER").unwrap_or_else(|_| "local".to_string());

    println!("Switchyard agent ({})", config.llm.model);
    println!("Type a message and press Enter. Send an empty line to exit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            println!("\nGoodbye!");
            break;
        }

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        match orchestrator.process(&user, "terminal", message, &cancel).await {
            Ok(reply) => println!("Assistant: {}\n", reply),
            Err(SwitchyardError::Cancelled) => println!("(cancelled)\n"),
            Err(e) => eprintln!("Error: {}\n", e),
        }

        watcher.abort();
    }

    Ok(())
}
