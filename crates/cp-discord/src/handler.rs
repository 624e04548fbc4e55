//! Discord event handler implementation using poise Framework

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

use cp_core::{Acknowledge, ForwardOutcome, IncomingMessage};

use crate::commands::Data;
use crate::error::{DiscordError, Result};

/// Adds reactions to the message that triggered the event
pub struct ReactionAcknowledger<'a> {
    ctx: &'a serenity::Context,
    msg: &'a serenity::Message,
}

impl<'a> ReactionAcknowledger<'a> {
    pub fn new(ctx: &'a serenity::Context, msg: &'a serenity::Message) -> Self {
        Self { ctx, msg }
    }
}

#[async_trait]
impl Acknowledge for ReactionAcknowledger<'_> {
    async fn acknowledge(&self, emoji: &str) -> cp_core::Result<()> {
        self.msg
            .react(self.ctx, serenity::ReactionType::Unicode(emoji.to_string()))
            .await
            .map(|_| ())
            .map_err(|e| cp_core::Error::Acknowledge(e.to_string()))
    }
}

/// Name shown on the printout: global display name, falling back to the username
pub(crate) fn display_name(global_name: Option<&str>, username: &str) -> String {
    global_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(username)
        .to_string()
}

pub(crate) fn created_at(unix_seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(unix_seconds, 0).unwrap_or_else(Utc::now)
}

/// Convert a gateway message into the platform-neutral form
pub fn to_incoming(msg: &serenity::Message) -> IncomingMessage {
    IncomingMessage {
        author_name: display_name(msg.author.global_name.as_deref(), &msg.author.name),
        author_is_bot: msg.author.bot,
        channel_id: msg.channel_id.get(),
        created_at: created_at(msg.timestamp.unix_timestamp()),
        content: msg.content.clone(),
    }
}

/// Dispatch gateway events
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, DiscordError>,
    data: &Data,
) -> Result<()> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "Logged in as {} ({} guilds), forwarding channel {}",
                data_about_bot.user.name,
                data_about_bot.guilds.len(),
                data.forwarder.channel_id()
            );
        }
        serenity::FullEvent::Message { new_message } => {
            handle_message(ctx, new_message, data).await;
        }
        _ => {}
    }

    Ok(())
}

/// Forward a message to the printer
///
/// Never fails: print errors are logged so the event loop keeps running.
pub async fn handle_message(ctx: &serenity::Context, msg: &serenity::Message, data: &Data) {
    let incoming = to_incoming(msg);
    let ack = ReactionAcknowledger::new(ctx, msg);

    match data.forwarder.forward(&incoming, &ack).await {
        Ok(ForwardOutcome::Skipped(reason)) => {
            debug!("Ignored message {}: {:?}", msg.id, reason);
        }
        Ok(ForwardOutcome::Printed { acknowledged, .. }) => {
            debug!("Printed message {} (acknowledged: {})", msg.id, acknowledged);
        }
        Err(e) => {
            error!("Failed to print message {} from {}: {}", msg.id, incoming.author_name, e);
        }
    }
}
