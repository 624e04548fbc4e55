//! cp-gateway: chatprint Main Binary
//!
//! Usage:
//!   chatprint                    - Start the Discord bot
//!   chatprint --config <path>    - Use a specific config file
//!   chatprint --check            - Validate config and check the print service
//!   chatprint --help             - Show help

use cp_core::{Config, MessageForwarder};
use cp_discord::DiscordBot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Forward messages until Ctrl+C
    Run,
    /// Validate configuration and exit
    Check,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    mode: RunMode,
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = parse_args(std::env::args().skip(1))?;

    match options.mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("chatprint {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load(options.config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    let forwarder = MessageForwarder::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create print client: {}", e))?;
    let forwarder = Arc::new(forwarder);

    tracing::info!("Starting chatprint...");
    tracing::info!(
        "Forwarding channel {} to {} ({:?})",
        config.discord.channel_id,
        forwarder.client().base_url(),
        forwarder.policy()
    );

    let reachable = check_print_service(&forwarder).await;

    match options.mode {
        RunMode::Check => {
            if reachable {
                println!("Configuration OK, print service reachable");
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "Configuration OK, but print service at {} is unreachable",
                    forwarder.client().base_url()
                ))
            }
        }
        _ => run_bot(config, forwarder).await,
    }
}

/// Parse command line arguments
fn parse_args<I>(args: I) -> anyhow::Result<Options>
where
    I: IntoIterator<Item = String>,
{
    let mut mode = RunMode::Run;
    let mut config_path = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a path"))?;
                config_path = Some(PathBuf::from(path));
            }
            "--check" => mode = RunMode::Check,
            "--help" | "-h" => return Ok(Options { mode: RunMode::Help, config_path }),
            "--version" | "-v" => return Ok(Options { mode: RunMode::Version, config_path }),
            _ => {}
        }
    }

    Ok(Options { mode, config_path })
}

/// Print help message
fn print_help() {
    println!("chatprint - Print Discord channel messages on a receipt printer");
    println!();
    println!("Usage:");
    println!("  chatprint                    Start the Discord bot");
    println!("  chatprint --config <path>    Load configuration from <path>");
    println!("  chatprint --check            Validate configuration and check the print service");
    println!("  chatprint --help             Show this help message");
    println!("  chatprint --version          Show version");
    println!();
    println!("Environment Variables:");
    println!("  DISCORD_TOKEN              Discord bot token (required)");
    println!("  DISCORD_CHANNEL_ID         Channel to forward (required)");
    println!("  DISCORD_GUILD_ID           Guild for slash command registration");
    println!("  ADMIN_USER_IDS             Comma-separated admin user IDs");
    println!("  PRINTER_BASE_URL           Print service URL (default: http://127.0.0.1:5000)");
    println!("  PRINTER_FONT_SIZE          Font size (default: 30)");
    println!("  PRINTER_TIMEOUT_SECS       HTTP timeout in seconds");
    println!("  FORWARD_TRUNCATE_LENGTH    Keep only the first N characters");
    println!("  FORWARD_CHAT_MODE          Send chat_mode to the printer (default: true)");
    println!("  FORWARD_REACT_ON_SUCCESS   React with a checkmark (default: true)");
    println!("  FORWARD_TIMEZONE           utc or local (default: utc)");
}

/// Query the print service once; an unreachable service is not fatal
async fn check_print_service(forwarder: &MessageForwarder) -> bool {
    match forwarder.client().status().await {
        Ok(status) => {
            tracing::info!(
                "Print service is {} ({} jobs queued)",
                status.status,
                status.queue_size
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                "Print service at {} is not reachable: {}",
                forwarder.client().base_url(),
                e
            );
            false
        }
    }
}

/// Run the Discord bot until Ctrl+C
async fn run_bot(config: Config, forwarder: Arc<MessageForwarder>) -> anyhow::Result<()> {
    let bot = DiscordBot::with_forwarder(config, forwarder);

    let mut handle = tokio::spawn(async move {
        if let Err(e) = bot.start().await {
            tracing::error!("Discord bot error: {}", e);
        }
    });
    tracing::info!("Discord bot started");
    tracing::info!("Press Ctrl+C to exit");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
            handle.abort();
        }
        result = &mut handle => {
            result?;
            return Err(anyhow::anyhow!("Discord bot stopped unexpectedly"));
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
