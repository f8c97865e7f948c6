//! Layered bot configuration.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tally_actions::RulesConfig;
use tally_core::Visibility;
use tally_error::ConfigError;
use tracing::debug;

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../tally.toml");

/// Prefix of environment variable overrides, e.g. `TALLY__MASTODON__ACCESS_TOKEN`.
pub const ENV_PREFIX: &str = "TALLY";

/// Complete bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Social platform account and stream
    #[serde(default)]
    pub mastodon: MastodonConfig,
    /// Reconnection policy
    #[serde(default)]
    pub stream: StreamConfig,
    /// Action queue settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Daily digest job
    #[serde(default)]
    pub digest: DigestConfig,
    /// Counter storage
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Outbound HTTP
    #[serde(default)]
    pub http: HttpConfig,
    /// Status endpoint
    #[serde(default)]
    pub api: ApiConfig,
    /// Trigger rules
    #[serde(default)]
    pub rules: RulesConfig,
}

/// Mastodon account and streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MastodonConfig {
    /// Server base URL, e.g. `https://example.social`
    #[serde(default)]
    pub server_url: String,
    /// OAuth access token of the bot account
    #[serde(default)]
    pub access_token: String,
    /// Streaming timeline to follow
    #[serde(default = "default_stream")]
    pub stream: String,
    /// Statuses posted through this application are ignored
    #[serde(default)]
    pub ignore_application: Option<String>,
    /// Accounts allowed to use owner-only rules; empty means the bot's own account
    #[serde(default)]
    pub owner_ids: Vec<String>,
}

fn default_stream() -> String {
    "user".to_string()
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            access_token: String::new(),
            stream: default_stream(),
            ignore_application: None,
            owner_ids: Vec::new(),
        }
    }
}

/// Reconnection backoff bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// First reconnection delay (seconds)
    pub initial_backoff_secs: u64,
    /// Largest reconnection delay (seconds)
    pub max_backoff_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            initial_backoff_secs: 5,
            max_backoff_secs: 320,
        }
    }
}

impl StreamConfig {
    /// First reconnection delay.
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_secs(self.initial_backoff_secs)
    }

    /// Largest reconnection delay.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

/// Action queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Longest an action may run before it is aborted (seconds)
    pub action_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            action_timeout_secs: 120,
        }
    }
}

impl SchedulerConfig {
    /// Per-action timeout.
    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs)
    }
}

/// Daily digest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Whether the digest runs
    pub enabled: bool,
    /// Seven-field cron expression evaluated in local time
    pub cron: String,
    /// Visibility of the digest status
    #[serde(default)]
    pub visibility: Visibility,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron: "0 0 0 * * * *".to_string(),
            visibility: Visibility::Public,
        }
    }
}

/// Counter storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; counts stay in memory when unset
    #[serde(default)]
    pub url: Option<String>,
    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    4
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// User agent; defaults to `tally/<version>`
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

/// Status endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Whether to serve `/health` and `/status`
    pub enabled: bool,
    /// Listen address
    pub bind: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl BotConfig {
    /// Load configuration.
    ///
    /// Sources, lowest precedence first: bundled defaults,
    /// `~/.config/tally/tally.toml`, then `path` if given or `./tally.toml`
    /// if present, then `TALLY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a source cannot be read or the result does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        debug!(?path, "Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/tally/tally.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("tally").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("mastodon.owner_ids")
                .with_list_parse_key("rules.pick_items"),
        );

        builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))
    }

    /// Parse configuration from a TOML string, without other sources.
    ///
    /// # Errors
    ///
    /// Returns error if the string does not parse.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))
    }

    /// Check everything needed to run the bot.
    ///
    /// # Errors
    ///
    /// Returns error describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let server_url = self.mastodon.server_url.trim();
        if server_url.is_empty() {
            return Err(ConfigError::new("mastodon.server_url is not set"));
        }
        if !server_url.starts_with("https://") && !server_url.starts_with("http://") {
            return Err(ConfigError::new(format!(
                "mastodon.server_url must start with http:// or https://, got {}",
                server_url
            )));
        }
        if self.mastodon.access_token.trim().is_empty() {
            return Err(ConfigError::new("mastodon.access_token is not set"));
        }
        if self.stream.initial_backoff_secs == 0 {
            return Err(ConfigError::new("stream.initial_backoff_secs must be positive"));
        }
        if self.stream.max_backoff_secs < self.stream.initial_backoff_secs {
            return Err(ConfigError::new(
                "stream.max_backoff_secs must not be below stream.initial_backoff_secs",
            ));
        }
        if self.scheduler.action_timeout_secs == 0 {
            return Err(ConfigError::new("scheduler.action_timeout_secs must be positive"));
        }
        if self.digest.enabled {
            cron::Schedule::from_str(&self.digest.cron).map_err(|e| {
                ConfigError::new(format!("Invalid digest.cron {:?}: {}", self.digest.cron, e))
            })?;
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::new("database.pool_size must be positive"));
        }
        if self.rules.reply_limit == 0 {
            return Err(ConfigError::new("rules.reply_limit must be positive"));
        }
        Ok(())
    }
}
