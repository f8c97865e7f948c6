use std::fs;
use tally_actions::Audience;
use tally_bot::BotConfig;
use tally_core::Visibility;

const MINIMAL: &str = r#"
[mastodon]
server_url = "https://example.social"
access_token = "secret"
"#;

fn valid() -> BotConfig {
    BotConfig::from_toml(MINIMAL).unwrap()
}

#[test]
fn test_load_layers_file_over_bundled_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.toml");
    fs::write(
        &path,
        r#"
[mastodon]
server_url = "https://example.social"
access_token = "secret"
owner_ids = ["7", "8"]

[stream]
max_backoff_secs = 60
"#,
    )
    .unwrap();

    let config = BotConfig::load(Some(&path)).unwrap();

    assert_eq!(config.mastodon.server_url, "https://example.social");
    assert_eq!(config.mastodon.owner_ids, vec!["7", "8"]);
    assert_eq!(config.stream.max_backoff_secs, 60);
    // Untouched keys come from the bundled defaults.
    assert_eq!(config.stream.initial_backoff_secs, 5);
    assert_eq!(config.mastodon.stream, "user");
    assert_eq!(config.mastodon.ignore_application.as_deref(), Some("tally"));
    assert_eq!(config.scheduler.action_timeout_secs, 120);
    assert_eq!(config.digest.cron, "0 0 0 * * * *");
    assert_eq!(config.rules.reply_limit, 500);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_requires_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(BotConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_defaults_without_sections() {
    let config = valid();

    assert_eq!(config.stream.initial_backoff_secs, 5);
    assert_eq!(config.stream.max_backoff_secs, 320);
    assert!(config.digest.enabled);
    assert_eq!(config.digest.visibility, Visibility::Public);
    assert_eq!(config.database.url, None);
    assert_eq!(config.database.pool_size, 4);
    assert!(!config.api.enabled);
    assert!(config.rules.fortunes.is_empty());
}

#[test]
fn test_fortune_tables() {
    let config = BotConfig::from_toml(&format!(
        r#"{}
[digest]
enabled = true
cron = "0 30 23 * * * *"
visibility = "private"

[[rules.fortunes]]
name = "omikuji"
pattern = "omikuji"
url = "https://fortune.example/a/1"
fallback = "closed today"
audience = "anyone"

[[rules.fortunes.rewrites]]
pattern = "great"
replacement = "GREAT"

[[rules.fortunes]]
name = "cat"
emojis = ["cat"]
url = "https://fortune.example/a/2"
fallback = "no cats"
"#,
        MINIMAL
    ))
    .unwrap();

    assert_eq!(config.digest.visibility, Visibility::Private);
    let fortunes = &config.rules.fortunes;
    assert_eq!(fortunes.len(), 2);
    assert_eq!(fortunes[0].name, "omikuji");
    assert_eq!(fortunes[0].audience, Audience::Anyone);
    assert_eq!(fortunes[0].rewrites.len(), 1);
    assert_eq!(fortunes[1].pattern, None);
    assert_eq!(fortunes[1].emojis, vec!["cat"]);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_requires_account() {
    let mut config = valid();
    config.mastodon.server_url = String::new();
    assert!(config.validate().is_err());

    let mut config = valid();
    config.mastodon.access_token = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_unknown_scheme() {
    let mut config = valid();
    config.mastodon.server_url = "ftp://example.social".to_string();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("server_url"));
}

#[test]
fn test_validate_backoff_bounds() {
    let mut config = valid();
    config.stream.initial_backoff_secs = 30;
    config.stream.max_backoff_secs = 10;
    assert!(config.validate().is_err());

    let mut config = valid();
    config.stream.initial_backoff_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_cron_only_when_enabled() {
    let mut config = valid();
    config.digest.cron = "at midnight".to_string();
    assert!(config.validate().is_err());

    config.digest.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_timeouts() {
    let mut config = valid();
    config.scheduler.action_timeout_secs = 0;
    assert!(config.validate().is_err());
}
