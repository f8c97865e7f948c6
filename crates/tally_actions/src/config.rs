//! Rule configuration.

use serde::{Deserialize, Serialize};

use crate::Audience;
use crate::context::DEFAULT_REPLY_LIMIT;

fn default_counter_pattern() -> String {
    r"^tally(!+)?$".to_string()
}

fn default_sql_pattern() -> String {
    r"^SQL:\s?(.+)".to_string()
}

fn default_pick_pattern() -> String {
    r"(?:(\d+)\s*x\s*)?pick me".to_string()
}

fn default_reply_limit() -> usize {
    DEFAULT_REPLY_LIMIT
}

/// Patterns and content for the built-in rules.
///
/// Deserialized from the `[rules]` table; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Owner post that increments today's count.
    #[serde(default = "default_counter_pattern")]
    pub counter_pattern: String,
    /// Owner post carrying an administrative statement in group 1.
    #[serde(default = "default_sql_pattern")]
    pub sql_pattern: String,
    /// Request for random picks, with an optional count in group 1.
    #[serde(default = "default_pick_pattern")]
    pub pick_pattern: String,
    /// Items the pick rule chooses from. The rule is not registered when empty.
    #[serde(default)]
    pub pick_items: Vec<String>,
    /// Maximum reply length.
    #[serde(default = "default_reply_limit")]
    pub reply_limit: usize,
    /// Fortune generator rules, in priority order.
    #[serde(default)]
    pub fortunes: Vec<FortuneRuleConfig>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            counter_pattern: default_counter_pattern(),
            sql_pattern: default_sql_pattern(),
            pick_pattern: default_pick_pattern(),
            pick_items: Vec::new(),
            reply_limit: default_reply_limit(),
            fortunes: Vec::new(),
        }
    }
}

/// One `[[rules.fortunes]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneRuleConfig {
    /// Rule name, shown in logs and failure notices.
    pub name: String,
    /// Text pattern that triggers the rule.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Emoji shortcodes that trigger the rule.
    #[serde(default)]
    pub emojis: Vec<String>,
    /// Hashtags that trigger the rule.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Generator page URL.
    pub url: String,
    /// Reply used when the generator fails.
    pub fallback: String,
    /// Who the rule answers.
    #[serde(default)]
    pub audience: Audience,
    /// Replacements applied to generated text, in order.
    #[serde(default)]
    pub rewrites: Vec<RewriteConfig>,
}

/// A `pattern` to `replacement` substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Regular expression to replace.
    pub pattern: String,
    /// Replacement text.
    pub replacement: String,
}
