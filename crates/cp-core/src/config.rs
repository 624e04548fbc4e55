//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. chatprint.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。
//! 読み込み後に必ず [`Config::validate`] が実行されます。

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::Error;
use crate::forward::ForwardPolicy;
use crate::message::TimestampZone;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "chatprint.toml";

/// Discord configuration
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token
    pub token: String,

    /// The only channel whose messages are forwarded
    pub channel_id: u64,

    /// Guild for slash command registration (global when unset)
    pub guild_id: Option<u64>,

    /// Users allowed to run admin commands
    pub admin_user_ids: Vec<u64>,
}

/// Print service configuration
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Base URL of the print service
    pub base_url: String,

    /// Font size sent with every text job
    pub font_size: u32,

    /// Request timeout; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,

    /// Font passed through to the print service
    pub font_name: Option<String>,

    /// Print head energy passed through to the print service
    pub energy: Option<u32>,

    /// Paper feed after the job, passed through to the print service
    pub feed_amount: Option<u32>,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            font_size: default_font_size(),
            timeout_secs: None,
            font_name: None,
            energy: None,
            feed_amount: None,
        }
    }
}

/// Forwarding behavior
#[derive(Debug, Clone)]
pub struct ForwardConfig {
    /// Keep only the first N characters of the message content
    pub truncate_length: Option<usize>,

    /// Send `chat_mode: true` to the print service
    pub chat_mode: bool,

    /// React with a checkmark after a successful print
    pub react_on_success: bool,

    /// Time zone used for the printed timestamp
    pub timezone: TimestampZone,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            truncate_length: None,
            chat_mode: true,
            react_on_success: true,
            timezone: TimestampZone::Utc,
        }
    }
}

/// Main configuration for chatprint
#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordConfig,

    pub printer: PrinterConfig,

    pub forward: ForwardConfig,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_font_size() -> u32 {
    30
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `./chatprint.toml` is used
    /// when present, otherwise only environment variables.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        if let Some(path) = path {
            return Self::from_toml_file(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// TOML 設定ファイルから設定を読み込む
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_toml_str(&toml_content)
    }

    /// Parse a TOML document, then apply environment overrides and validate
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        Self::from_toml_str_with(content, |key| std::env::var(key).ok())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_toml_str_with<F>(content: &str, lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = Self::expand_env_vars(content);

        let toml_config: TomlConfig = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut cfg = Self::from_toml_config(toml_config);
        cfg.apply_overrides(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::from_toml_config(TomlConfig::default());
        cfg.apply_overrides(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// TOML 構造から Config を構築
    fn from_toml_config(toml: TomlConfig) -> Self {
        let discord = toml.discord.unwrap_or_default();
        let printer = toml.printer.unwrap_or_default();
        let forward = toml.forward.unwrap_or_default();

        let printer_defaults = PrinterConfig::default();
        let forward_defaults = ForwardConfig::default();

        Config {
            discord: DiscordConfig {
                token: discord.token.unwrap_or_default(),
                channel_id: discord.channel_id.unwrap_or_default(),
                guild_id: discord.guild_id,
                admin_user_ids: discord.admin_user_ids.unwrap_or_default(),
            },
            printer: PrinterConfig {
                base_url: printer.base_url.unwrap_or(printer_defaults.base_url),
                font_size: printer.font_size.unwrap_or(printer_defaults.font_size),
                timeout_secs: printer.timeout_secs,
                font_name: printer.font_name,
                energy: printer.energy,
                feed_amount: printer.feed_amount,
            },
            forward: ForwardConfig {
                truncate_length: forward.truncate_length,
                chat_mode: forward.chat_mode.unwrap_or(forward_defaults.chat_mode),
                react_on_success: forward
                    .react_on_success
                    .unwrap_or(forward_defaults.react_on_success),
                timezone: forward.timezone.unwrap_or(forward_defaults.timezone),
            },
        }
    }

    /// 環境変数で設定を上書きする
    fn apply_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Discord 設定の上書き
        if let Some(token) = get("DISCORD_TOKEN").or_else(|| get("DISCORD_BOT_TOKEN")) {
            self.discord.token = token;
        }
        if let Some(id) = get("DISCORD_CHANNEL_ID") {
            self.discord.channel_id = parse_value("DISCORD_CHANNEL_ID", &id)?;
        }
        if let Some(id) = get("DISCORD_GUILD_ID") {
            self.discord.guild_id = Some(parse_value("DISCORD_GUILD_ID", &id)?);
        }
        if let Some(ids) = get("ADMIN_USER_IDS") {
            self.discord.admin_user_ids = ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_value("ADMIN_USER_IDS", s))
                .collect::<crate::Result<Vec<u64>>>()?;
        }

        // Printer 設定の上書き
        if let Some(url) = get("PRINTER_BASE_URL") {
            self.printer.base_url = url;
        }
        if let Some(size) = get("PRINTER_FONT_SIZE") {
            self.printer.font_size = parse_value("PRINTER_FONT_SIZE", &size)?;
        }
        if let Some(secs) = get("PRINTER_TIMEOUT_SECS") {
            self.printer.timeout_secs = Some(parse_value("PRINTER_TIMEOUT_SECS", &secs)?);
        }

        // Forward 設定の上書き
        if let Some(len) = get("FORWARD_TRUNCATE_LENGTH") {
            self.forward.truncate_length = Some(parse_value("FORWARD_TRUNCATE_LENGTH", &len)?);
        }
        if let Some(flag) = get("FORWARD_CHAT_MODE") {
            self.forward.chat_mode = flag.to_lowercase() != "false";
        }
        if let Some(flag) = get("FORWARD_REACT_ON_SUCCESS") {
            self.forward.react_on_success = flag.to_lowercase() != "false";
        }
        if let Some(zone) = get("FORWARD_TIMEZONE") {
            self.forward.timezone = parse_value("FORWARD_TIMEZONE", &zone)?;
        }

        Ok(())
    }

    /// Check the loaded values before anything connects
    pub fn validate(&self) -> crate::Result<()> {
        if self.discord.token.trim().is_empty() {
            return Err(Error::Config(
                "Discord token not set (DISCORD_TOKEN or [discord].token)".to_string(),
            ));
        }

        if self.discord.channel_id == 0 {
            return Err(Error::Config(
                "Target channel not set (DISCORD_CHANNEL_ID or [discord].channel_id)".to_string(),
            ));
        }

        if self.discord.guild_id == Some(0) {
            return Err(Error::Config("guild_id must be non-zero".to_string()));
        }

        let url = reqwest::Url::parse(&self.printer.base_url).map_err(|e| {
            Error::Config(format!("Invalid printer base_url {}: {}", self.printer.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Unsupported printer base_url scheme: {}",
                url.scheme()
            )));
        }

        if self.printer.font_size == 0 {
            return Err(Error::Config("font_size must be greater than 0".to_string()));
        }

        if self.forward.truncate_length == Some(0) {
            return Err(Error::Config(
                "truncate_length must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the forwarding policy described by this configuration
    pub fn forward_policy(&self) -> ForwardPolicy {
        ForwardPolicy {
            truncate_length: self.forward.truncate_length,
            chat_mode: self.forward.chat_mode,
            react_on_success: self.forward.react_on_success,
        }
    }
}

fn parse_value<T>(key: &str, value: &str) -> crate::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {} ({})", key, value, e)))
}

// ============================================================================
// TOML 構造体定義（ファイル解析用）
// ============================================================================

/// TOML ファイル用のトップレベル構造
#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    discord: Option<TomlDiscordConfig>,
    printer: Option<TomlPrinterConfig>,
    forward: Option<TomlForwardConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDiscordConfig {
    token: Option<String>,
    channel_id: Option<u64>,
    guild_id: Option<u64>,
    admin_user_ids: Option<Vec<u64>>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlPrinterConfig {
    base_url: Option<String>,
    font_size: Option<u32>,
    timeout_secs: Option<u64>,
    font_name: Option<String>,
    energy: Option<u32>,
    feed_amount: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlForwardConfig {
    truncate_length: Option<usize>,
    chat_mode: Option<bool>,
    react_on_success: Option<bool>,
    timezone: Option<TimestampZone>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    const MINIMAL: &str = r#"
[discord]
token = "discord_token"
channel_id = 1400529692225703966
"#;

    #[test]
    fn test_printer_config_default() {
        let config = PrinterConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.font_size, 30);
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_forward_config_default() {
        let config = ForwardConfig::default();
        assert!(config.truncate_length.is_none());
        assert!(config.chat_mode);
        assert!(config.react_on_success);
        assert_eq!(config.timezone, TimestampZone::Utc);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = Config::from_toml_str_with(MINIMAL, no_env).unwrap();
        assert_eq!(config.discord.token, "discord_token");
        assert_eq!(config.discord.channel_id, 1400529692225703966);
        assert!(config.discord.guild_id.is_none());
        assert_eq!(config.printer.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.printer.font_size, 30);
        assert!(config.forward.chat_mode);
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[discord]
token = "discord_token"
channel_id = 42
guild_id = 663140687591768074
admin_user_ids = [123456, 789012]

[printer]
base_url = "http://printer.local:5000"
font_size = 24
timeout_secs = 10
feed_amount = 30

[forward]
truncate_length = 100
chat_mode = false
react_on_success = false
timezone = "local"
"#;

        let config = Config::from_toml_str_with(toml_content, no_env).unwrap();

        assert_eq!(config.discord.channel_id, 42);
        assert_eq!(config.discord.guild_id, Some(663140687591768074));
        assert_eq!(config.discord.admin_user_ids, vec![123456, 789012]);
        assert_eq!(config.printer.base_url, "http://printer.local:5000");
        assert_eq!(config.printer.font_size, 24);
        assert_eq!(config.printer.timeout_secs, Some(10));
        assert_eq!(config.printer.feed_amount, Some(30));
        assert_eq!(config.forward.truncate_length, Some(100));
        assert!(!config.forward.chat_mode);
        assert!(!config.forward.react_on_success);
        assert_eq!(config.forward.timezone, TimestampZone::Local);
    }

    #[test]
    fn test_env_overrides_take_priority() {
        let lookup = lookup_from(&[
            ("DISCORD_BOT_TOKEN", "env_token"),
            ("DISCORD_CHANNEL_ID", "7"),
            ("ADMIN_USER_IDS", "1, 2,3"),
            ("PRINTER_BASE_URL", "http://10.0.0.2:5000"),
            ("FORWARD_TRUNCATE_LENGTH", "100"),
            ("FORWARD_CHAT_MODE", "false"),
        ]);

        let config = Config::from_toml_str_with(MINIMAL, lookup).unwrap();
        assert_eq!(config.discord.token, "env_token");
        assert_eq!(config.discord.channel_id, 7);
        assert_eq!(config.discord.admin_user_ids, vec![1, 2, 3]);
        assert_eq!(config.printer.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.forward.truncate_length, Some(100));
        assert!(!config.forward.chat_mode);
    }

    #[test]
    fn test_from_lookup_without_file() {
        let lookup = lookup_from(&[("DISCORD_TOKEN", "t"), ("DISCORD_CHANNEL_ID", "99")]);
        let config = Config::from_lookup(lookup).unwrap();
        assert_eq!(config.discord.channel_id, 99);
        assert_eq!(config.printer.font_size, 30);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = Config::from_toml_str_with("[discord]\nchannel_id = 1\n", no_env).unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn test_missing_channel_is_rejected() {
        let err = Config::from_toml_str_with("[discord]\ntoken = \"t\"\n", no_env).unwrap_err();
        assert!(err.to_string().contains("channel"));
    }

    #[test]
    fn test_invalid_channel_env_is_rejected() {
        let lookup = lookup_from(&[("DISCORD_CHANNEL_ID", "general")]);
        let err = Config::from_toml_str_with(MINIMAL, lookup).unwrap_err();
        assert!(err.to_string().contains("DISCORD_CHANNEL_ID"));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let lookup = lookup_from(&[("PRINTER_BASE_URL", "ftp://127.0.0.1")]);
        assert!(Config::from_toml_str_with(MINIMAL, lookup).is_err());

        let lookup = lookup_from(&[("PRINTER_BASE_URL", "not a url")]);
        assert!(Config::from_toml_str_with(MINIMAL, lookup).is_err());
    }

    #[test]
    fn test_zero_truncate_length_is_rejected() {
        let lookup = lookup_from(&[("FORWARD_TRUNCATE_LENGTH", "0")]);
        assert!(Config::from_toml_str_with(MINIMAL, lookup).is_err());
    }

    #[test]
    fn test_forward_policy_from_config() {
        let content = format!("{}\n[forward]\ntruncate_length = 100\nchat_mode = false\n", MINIMAL);
        let config = Config::from_toml_str_with(&content, no_env).unwrap();
        let policy = config.forward_policy();
        assert_eq!(policy.truncate_length, Some(100));
        assert!(!policy.chat_mode);
        assert!(policy.react_on_success);
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("CHATPRINT_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${CHATPRINT_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${CHATPRINT_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("CHATPRINT_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("$HOME"), "$HOME");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let missing = Config::from_toml_file("/nonexistent/chatprint.toml");
        assert!(matches!(missing, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_toml_file_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[discord\ntoken = ").unwrap();

        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }
}
