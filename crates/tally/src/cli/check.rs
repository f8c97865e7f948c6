//! `validate` and `check-rules` command handlers.

use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;
use tally_bot::{BotConfig, BotServer};
use tally_core::{AccountBuilder, NormalizedEvent, NormalizedEventBuilder};
use tally_error::{ConfigError, TallyResult};
use tally_interface::Action;
use tally_pipeline::MatchCandidate;

/// Validate configuration and list the compiled rules.
pub fn validate(config_path: Option<&Path>) -> TallyResult<()> {
    let config = BotConfig::load(config_path)?;
    let rules = BotServer::new(config).check()?;

    println!("Configuration OK, {} rules in priority order:", rules.len());
    for (index, name) in rules.iter().enumerate() {
        println!("  {}. {}", index + 1, name);
    }
    Ok(())
}

/// Print the rules a synthetic post would trigger.
pub async fn check_rules(
    config_path: Option<&Path>,
    event: SyntheticPost<'_>,
    json: bool,
) -> TallyResult<()> {
    let config = BotConfig::load(config_path)?;
    let plan = BotServer::new(config).plan(event.build()?).await?;

    if json {
        let entries: Vec<_> = plan
            .iter()
            .map(|candidate| {
                json!({
                    "rule": candidate.rule.name(),
                    "offset": candidate.match_offset,
                    "emoji_match": candidate.is_emoji_match,
                    "index": candidate.index,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(entries));
        return Ok(());
    }

    if plan.is_empty() {
        println!("No rules match");
    }
    for (position, candidate) in plan.iter().enumerate() {
        println!("{}. {} ({})", position + 1, candidate.rule.name(), describe(candidate));
    }
    Ok(())
}

fn describe(candidate: &MatchCandidate) -> String {
    match candidate.match_offset {
        Some(offset) => format!("text match at {}", offset),
        None => "emoji or tag match".to_string(),
    }
}

/// Fields of the post used by `check-rules`.
#[derive(Debug)]
pub struct SyntheticPost<'a> {
    /// Post text
    pub text: &'a str,
    /// Author account id
    pub account: &'a str,
    /// Hashtags
    pub tags: &'a [String],
    /// Emoji shortcodes
    pub emojis: &'a [String],
}

impl SyntheticPost<'_> {
    fn build(&self) -> Result<NormalizedEvent, ConfigError> {
        let account = AccountBuilder::default()
            .id(self.account)
            .acct("check")
            .username("check")
            .build()
            .map_err(|e| ConfigError::new(e.to_string()))?;
        NormalizedEventBuilder::default()
            .id("check")
            .account(account)
            .text(self.text)
            .tags(self.tags.iter().cloned().collect::<BTreeSet<_>>())
            .emoji_shortcodes(self.emojis.iter().cloned().collect::<BTreeSet<_>>())
            .build()
            .map_err(|e| ConfigError::new(e.to_string()))
    }
}
