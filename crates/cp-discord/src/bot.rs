//! Discord Bot implementation using Serenity and poise

use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::info;

use cp_core::{Config, MessageForwarder};

use crate::commands::{self, Data};
use crate::error::{DiscordError, Result};
use crate::handler;

/// Discord Bot that forwards one channel to the printer
pub struct DiscordBot {
    config: Config,
    forwarder: Arc<MessageForwarder>,
}

impl DiscordBot {
    /// Create a new Discord Bot instance
    pub fn new(config: Config) -> Result<Self> {
        let forwarder = MessageForwarder::from_config(&config)?;

        Ok(Self {
            config,
            forwarder: Arc::new(forwarder),
        })
    }

    /// Create with a shared forwarder
    pub fn with_forwarder(config: Config, forwarder: Arc<MessageForwarder>) -> Self {
        Self { config, forwarder }
    }

    pub fn forwarder(&self) -> Arc<MessageForwarder> {
        self.forwarder.clone()
    }

    /// Gateway intents needed to read channel messages
    pub fn intents() -> serenity::GatewayIntents {
        // MESSAGE_CONTENT is privileged and must be enabled in the developer portal
        serenity::GatewayIntents::GUILDS
            | serenity::GatewayIntents::GUILD_MESSAGES
            | serenity::GatewayIntents::MESSAGE_CONTENT
    }

    /// Start the Discord bot
    pub async fn start(&self) -> Result<()> {
        let token = self.config.discord.token.trim();
        if token.is_empty() {
            return Err(DiscordError::TokenNotSet);
        }

        info!("Starting Discord bot...");

        let data = Data {
            forwarder: self.forwarder.clone(),
            admin_user_ids: self.config.discord.admin_user_ids.clone(),
        };
        let guild_id = self.config.discord.guild_id;

        let framework = poise::Framework::builder()
            .options(poise::FrameworkOptions {
                commands: commands::get_commands(),
                event_handler: |ctx, event, framework, data| {
                    Box::pin(handler::event_handler(ctx, event, framework, data))
                },
                ..Default::default()
            })
            .setup(move |ctx, _ready, framework| {
                Box::pin(async move {
                    register_commands(ctx, &framework.options().commands, guild_id).await?;
                    Ok(data)
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(token, Self::intents())
            .framework(framework)
            .await?;

        client.start().await?;

        Ok(())
    }
}

/// Register slash commands in the configured guild, or globally
async fn register_commands(
    ctx: &serenity::Context,
    commands: &[poise::Command<Data, DiscordError>],
    guild_id: Option<u64>,
) -> Result<()> {
    match guild_id {
        Some(id) => {
            poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(id)).await?;
            info!("Registered {} commands in guild {}", commands.len(), id);
        }
        None => {
            poise::builtins::register_globally(ctx, commands).await?;
            info!("Registered {} commands globally", commands.len());
        }
    }

    Ok(())
}
