//! Message forwarding
//!
//! Decides whether a chat message is eligible, renders it and sends it to
//! the print service. Each call is independent; nothing is shared between
//! invocations except the read-only forwarder itself.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{Config, PrinterConfig};
use crate::error::Result;
use crate::message::{ForwardedMessage, IncomingMessage, TimestampZone};
use crate::printer::{PrintClient, PrintTextRequest};

/// Reaction added to the source message after a successful print
pub const SUCCESS_REACTION: &str = "✅";

/// How eligible messages are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardPolicy {
    /// Keep only the first N characters of content
    pub truncate_length: Option<usize>,
    /// Send `chat_mode: true` with the job
    pub chat_mode: bool,
    /// React with [`SUCCESS_REACTION`] when the print service accepts the job
    pub react_on_success: bool,
}

impl ForwardPolicy {
    /// Full content, chat mode, reaction on success
    pub fn chat() -> Self {
        Self {
            truncate_length: None,
            chat_mode: true,
            react_on_success: true,
        }
    }

    /// First 100 characters only, no chat mode, no reaction
    pub fn compact() -> Self {
        Self {
            truncate_length: Some(100),
            chat_mode: false,
            react_on_success: false,
        }
    }
}

impl Default for ForwardPolicy {
    fn default() -> Self {
        Self::chat()
    }
}

/// Adds a visible acknowledgement to the message that was printed
#[async_trait]
pub trait Acknowledge: Send + Sync {
    /// React to the source message with `emoji`
    async fn acknowledge(&self, emoji: &str) -> Result<()>;
}

/// Why a message was not forwarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BotAuthor,
    OtherChannel,
}

/// Result of handling one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Skipped(SkipReason),
    Printed {
        /// The text block that was sent
        text: String,
        /// Whether the success reaction was added
        acknowledged: bool,
    },
}

/// Forwards messages from one channel to the print service
pub struct MessageForwarder {
    client: PrintClient,
    channel_id: u64,
    policy: ForwardPolicy,
    timezone: TimestampZone,
    printer: PrinterConfig,
}

impl MessageForwarder {
    pub fn new(client: PrintClient, channel_id: u64, policy: ForwardPolicy) -> Self {
        Self {
            client,
            channel_id,
            policy,
            timezone: TimestampZone::default(),
            printer: PrinterConfig::default(),
        }
    }

    /// Build a forwarder from validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = PrintClient::from_config(&config.printer)?;

        Ok(Self {
            client,
            channel_id: config.discord.channel_id,
            policy: config.forward_policy(),
            timezone: config.forward.timezone,
            printer: config.printer.clone(),
        })
    }

    pub fn policy(&self) -> ForwardPolicy {
        self.policy
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    pub fn client(&self) -> &PrintClient {
        &self.client
    }

    /// Apply the eligibility filter
    pub fn check_eligible(&self, msg: &IncomingMessage) -> std::result::Result<(), SkipReason> {
        if msg.author_is_bot {
            return Err(SkipReason::BotAuthor);
        }
        if msg.channel_id != self.channel_id {
            return Err(SkipReason::OtherChannel);
        }
        Ok(())
    }

    /// Build the JSON body for an eligible message
    pub fn build_request(&self, msg: &IncomingMessage) -> PrintTextRequest {
        let forwarded =
            ForwardedMessage::from_incoming(msg, self.policy.truncate_length, self.timezone);

        PrintTextRequest::new(forwarded.to_string(), self.printer.font_size)
            .chat_mode(self.policy.chat_mode)
            .with_printer_options(&self.printer)
    }

    /// Handle one incoming message
    ///
    /// Print failures are returned to the caller. A failed acknowledgement
    /// is logged and reported through `acknowledged: false`.
    pub async fn forward(
        &self,
        msg: &IncomingMessage,
        ack: &dyn Acknowledge,
    ) -> Result<ForwardOutcome> {
        if let Err(reason) = self.check_eligible(msg) {
            debug!("Skipping message: {:?}", reason);
            return Ok(ForwardOutcome::Skipped(reason));
        }

        let request = self.build_request(msg);
        info!("{}", request.text);

        self.client.print_text(&request).await?;

        let acknowledged = if self.policy.react_on_success {
            match ack.acknowledge(SUCCESS_REACTION).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to add success reaction: {}", e);
                    false
                }
            }
        } else {
            false
        };

        Ok(ForwardOutcome::Printed {
            text: request.text,
            acknowledged,
        })
    }
}
