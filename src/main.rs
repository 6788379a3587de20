// ABOUTME: Main entry point for the smsgate gateway
// ABOUTME: Loads config, initializes logging, starts the backends, and serves inbound SMS

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smsgate::backend::build_registry;
use smsgate::config::Config;
use smsgate::{logging, paths};
use smsgate_core::{BackendRegistry, ChannelRouter, IncomingMessage, OutgoingMessage, SendOutcome};
use smsgate_modem::ModemRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_stream::StreamExt;

#[derive(Parser)]
#[command(name = "smsgate", version, about = "Send and receive SMS through GSM modems")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the configured backends and log every inbound message
    Run {
        /// Answer each inbound message with its own text
        #[arg(long)]
        echo: bool,
        /// Also write JSON logs (to [logging].dir or the platform data dir)
        #[arg(long)]
        log_to_file: bool,
    },
    /// Send one SMS and exit
    Send {
        recipient: String,
        text: String,
        /// Backend to send through
        #[arg(long, default_value = "gsm")]
        via: String,
    },
    /// Print the resolved configuration with secrets redacted
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut logs = logging::init();

    let config = Config::load()?;
    match cli.command {
        Command::Run { echo, log_to_file } => {
            let log_dir = config
                .logging
                .dir
                .as_ref()
                .map(PathBuf::from)
                .or_else(|| if log_to_file { paths::log_dir() } else { None });
            if let Some(dir) = log_dir {
                logs.write_json_to(&dir)?;
            }
            run(config, echo).await
        }
        Command::Send {
            recipient,
            text,
            via,
        } => send_one(config, &via, OutgoingMessage::new(recipient, text)).await,
        Command::CheckConfig => {
            print!("{}", config.to_redacted_toml()?);
            Ok(())
        }
    }
}

/// Start every backend, failing on the first error
async fn start_backends(registry: &BackendRegistry) -> Result<()> {
    for (id, result) in registry.start_all().await {
        result.with_context(|| format!("Backend '{}' failed to start", id))?;
    }
    Ok(())
}

async fn run(config: Config, echo: bool) -> Result<()> {
    tracing::info!(backends = ?config.gsm.as_ref().map(|g| &g.id), echo, "Starting smsgate");

    let (router, inbox) = ChannelRouter::new();
    let registry = build_registry(&config, &ModemRegistry::default(), Arc::new(router))?;
    start_backends(&registry).await?;

    for health in registry.health() {
        tracing::info!(backend = %health.backend_id, kind = health.kind, state = %health.state, "Backend ready");
    }

    let mut messages = inbox.into_stream();
    loop {
        tokio::select! {
            next = messages.next() => match next {
                Some(message) => handle_incoming(&registry, message, echo).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, shutting down");
                break;
            }
        }
    }
    Ok(())
}

async fn handle_incoming(registry: &BackendRegistry, message: IncomingMessage, echo: bool) {
    tracing::info!(
        origin = %message.origin,
        sender = %message.sender,
        sent = %message.sent,
        text = %message.text,
        "Incoming SMS"
    );

    if !echo {
        return;
    }
    let text = message.text.clone();
    match registry.reply(&message, text).await {
        Ok(SendOutcome::Sent) => tracing::debug!(recipient = %message.sender, "Echo sent"),
        Ok(SendOutcome::Failed) => tracing::warn!(recipient = %message.sender, "Echo not sent"),
        Err(e) => tracing::error!(error = %e, "Echo failed"),
    }
}

async fn send_one(config: Config, via: &str, message: OutgoingMessage) -> Result<()> {
    let (router, _inbox) = ChannelRouter::new();
    let registry = build_registry(&config, &ModemRegistry::default(), Arc::new(router))?;
    start_backends(&registry).await?;

    let outcome = registry.send(via, &message).await?;
    if !outcome.is_sent() {
        anyhow::bail!("Backend '{}' declined to send the message", via);
    }
    tracing::info!(recipient = %message.recipient(), backend = %via, "SMS sent");
    Ok(())
}
