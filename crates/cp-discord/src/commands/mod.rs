//! Slash commands for Discord bot (poise implementation)

mod clear_queue;
mod help;
mod printer;

use std::sync::Arc;

use cp_core::MessageForwarder;

/// User data stored and accessible in all command invocations
pub struct Data {
    pub forwarder: Arc<MessageForwarder>,
    pub admin_user_ids: Vec<u64>,
}

impl Data {
    /// An empty admin list allows everyone
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_user_ids.is_empty() || self.admin_user_ids.contains(&user_id)
    }
}

/// Error type for commands
pub type Error = crate::error::DiscordError;

/// Context type for commands
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Export commands for registration
pub use clear_queue::clear_queue;
pub use help::help;
pub use printer::printer;

/// Get all commands for registration
pub fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![printer(), clear_queue(), help()]
}
