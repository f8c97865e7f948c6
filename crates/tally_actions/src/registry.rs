//! The built-in rule list.

use regex::Regex;
use std::sync::Arc;
use tally_error::ConfigError;
use tally_interface::Action;
use tracing::info;

use crate::handlers::{CounterHandler, FortuneHandler, PickHandler, Rewrite, SqlHandler};
use crate::{Audience, BotContext, FortuneRuleConfig, Rule, RulesConfig, Trigger};

fn compile(rule: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::new(format!("Invalid pattern for rule {}: {}", rule, e)))
}

fn fortune_rule(
    config: &FortuneRuleConfig,
    ctx: &Arc<BotContext>,
) -> Result<Arc<dyn Action>, ConfigError> {
    let trigger = Trigger {
        pattern: config
            .pattern
            .as_deref()
            .map(|p| compile(&config.name, p))
            .transpose()?,
        emojis: config.emojis.iter().cloned().collect(),
        tags: config.tags.iter().cloned().collect(),
    };
    if trigger.pattern.is_none() && trigger.emojis.is_empty() && trigger.tags.is_empty() {
        return Err(ConfigError::new(format!(
            "Fortune rule {} has no pattern, emojis or tags",
            config.name
        )));
    }

    let rewrites = config
        .rewrites
        .iter()
        .map(|r| {
            Ok(Rewrite {
                pattern: compile(&config.name, &r.pattern)?,
                replacement: r.replacement.clone(),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(Arc::new(Rule::new(
        config.name.clone(),
        trigger,
        config.audience,
        Arc::new(FortuneHandler::new(
            config.url.clone(),
            config.fallback.clone(),
            rewrites,
        )),
        ctx.clone(),
    )))
}

/// Build the rule list in priority order: sql, counter, the fortunes in file
/// order, then pick.
///
/// # Errors
///
/// Returns error if a pattern does not compile or a fortune rule has no trigger.
pub fn default_rules(
    config: &RulesConfig,
    ctx: Arc<BotContext>,
) -> Result<Vec<Arc<dyn Action>>, ConfigError> {
    let mut rules: Vec<Arc<dyn Action>> = vec![
        Arc::new(Rule::new(
            "sql",
            Trigger::pattern(compile("sql", &config.sql_pattern)?),
            Audience::Owner,
            Arc::new(SqlHandler),
            ctx.clone(),
        )),
        Arc::new(Rule::new(
            "counter",
            Trigger::pattern(compile("counter", &config.counter_pattern)?),
            Audience::Owner,
            Arc::new(CounterHandler),
            ctx.clone(),
        )),
    ];

    for fortune in &config.fortunes {
        rules.push(fortune_rule(fortune, &ctx)?);
    }

    if !config.pick_items.is_empty() {
        rules.push(Arc::new(Rule::new(
            "pick",
            Trigger::pattern(compile("pick", &config.pick_pattern)?),
            Audience::Others,
            Arc::new(PickHandler::new(config.pick_items.clone())),
            ctx,
        )));
    }

    info!(
        rules = ?rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
        "Registered rules"
    );
    Ok(rules)
}
