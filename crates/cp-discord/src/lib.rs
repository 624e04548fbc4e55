//! cp-discord: Discord Gateway for chatprint
//!
//! Discord の指定チャンネルに投稿されたメッセージを印刷サービスへ転送します。
//! Serenity 0.12 と poise を使用して Discord Gateway に接続します。

pub mod bot;
pub mod commands;
pub mod error;
pub mod handler;

pub use bot::DiscordBot;
pub use commands::Data;
pub use error::{DiscordError, Result};
pub use handler::ReactionAcknowledger;
