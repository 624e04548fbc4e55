//! Chat message types and the printed text block

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layout of the timestamp line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time zone used when rendering the timestamp line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    #[default]
    Utc,
    /// The host's local time zone
    Local,
}

impl FromStr for TimestampZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown time zone '{}', expected 'utc' or 'local'", other)),
        }
    }
}

/// A chat message as seen by the forwarder, independent of the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Display name of the author
    pub author_name: String,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    pub channel_id: u64,
    pub created_at: DateTime<Utc>,
    pub content: String,
}

/// The text block sent to the printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedMessage {
    pub timestamp: String,
    pub author_display_name: String,
    pub content: String,
}

impl ForwardedMessage {
    /// Build the printed block, keeping at most `truncate_length` characters of content
    pub fn from_incoming(
        msg: &IncomingMessage,
        truncate_length: Option<usize>,
        zone: TimestampZone,
    ) -> Self {
        let content = match truncate_length {
            Some(limit) => truncate_chars(&msg.content, limit),
            None => msg.content.clone(),
        };

        Self {
            timestamp: format_timestamp(&msg.created_at, zone),
            author_display_name: msg.author_name.clone(),
            content,
        }
    }
}

impl fmt::Display for ForwardedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}:\n{}",
            self.timestamp, self.author_display_name, self.content
        )
    }
}

/// Format a creation time as `yyyy-MM-dd HH:mm:ss`
pub fn format_timestamp(at: &DateTime<Utc>, zone: TimestampZone) -> String {
    match zone {
        TimestampZone::Utc => at.format(TIMESTAMP_FORMAT).to_string(),
        TimestampZone::Local => at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Keep the first `limit` characters (not bytes) of `text`
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(content: &str) -> IncomingMessage {
        IncomingMessage {
            author_name: "Alice".to_string(),
            author_is_bot: false,
            channel_id: 1,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_text_block_layout() {
        let forwarded =
            ForwardedMessage::from_incoming(&message("hello"), None, TimestampZone::Utc);
        assert_eq!(forwarded.to_string(), "2024-01-01 00:00:00\nAlice:\nhello");
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2023, 12, 31, 23, 5, 9).unwrap();
        assert_eq!(format_timestamp(&at, TimestampZone::Utc), "2023-12-31 23:05:09");
    }

    #[test]
    fn test_truncate_long_content() {
        let long = "a".repeat(150);
        let forwarded =
            ForwardedMessage::from_incoming(&message(&long), Some(100), TimestampZone::Utc);
        assert_eq!(forwarded.content, "a".repeat(100));
    }

    #[test]
    fn test_short_content_unchanged() {
        let exact = "b".repeat(100);
        let forwarded =
            ForwardedMessage::from_incoming(&message(&exact), Some(100), TimestampZone::Utc);
        assert_eq!(forwarded.content, exact);

        let forwarded =
            ForwardedMessage::from_incoming(&message("hi"), Some(100), TimestampZone::Utc);
        assert_eq!(forwarded.content, "hi");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("こんにちは", 3), "こんに");
        assert_eq!(truncate_chars("ab✅cd", 3), "ab✅");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_timestamp_zone_from_str() {
        assert_eq!("UTC".parse::<TimestampZone>(), Ok(TimestampZone::Utc));
        assert_eq!(" local ".parse::<TimestampZone>(), Ok(TimestampZone::Local));
        assert!("mars".parse::<TimestampZone>().is_err());
    }
}
