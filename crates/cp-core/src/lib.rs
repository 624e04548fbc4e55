//! cp-core: chatprint core library
//!
//! Configuration, message formatting, the print service client and the
//! forwarder that ties them together. Platform adapters live in their own
//! crates and hand messages over as [`IncomingMessage`].

pub mod config;
pub mod error;
pub mod forward;
pub mod message;
pub mod printer;

pub use config::{Config, DiscordConfig, ForwardConfig, PrinterConfig};
pub use error::{Error, Result};
pub use forward::{
    Acknowledge, ForwardOutcome, ForwardPolicy, MessageForwarder, SUCCESS_REACTION, SkipReason,
};
pub use message::{ForwardedMessage, IncomingMessage, TimestampZone};
pub use printer::{PrintClient, PrintServiceStatus, PrintTextRequest};
