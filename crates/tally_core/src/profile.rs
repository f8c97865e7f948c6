//! Counter state encoded in the account display name.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PROFILE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*\(yesterday: (\d+) / today: (\d+)\)$").expect("valid profile regex")
});

/// The account's base name plus yesterday's and today's counts.
///
/// The bot keeps its counter in the display name, so the profile is both the
/// read and the write side of the counter.
///
/// # Examples
///
/// ```
/// use tally_core::Profile;
///
/// let mut profile = Profile::parse("Alice (yesterday: 3 / today: 1)");
/// assert_eq!(profile.name, "Alice");
/// profile.today += 1;
/// assert_eq!(profile.display_name(), "Alice (yesterday: 3 / today: 2)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name without the counter suffix.
    pub name: String,
    /// Count carried over from the previous day.
    pub yesterday: u32,
    /// Count for the current day.
    pub today: u32,
}

impl Profile {
    /// Parse a display name. A name without the counter suffix yields zero counts.
    pub fn parse(display_name: &str) -> Self {
        match PROFILE_SUFFIX.captures(display_name) {
            Some(caps) => Self {
                name: caps[1].to_string(),
                yesterday: caps[2].parse().unwrap_or(0),
                today: caps[3].parse().unwrap_or(0),
            },
            None => Self {
                name: display_name.trim().to_string(),
                yesterday: 0,
                today: 0,
            },
        }
    }

    /// Render the display name carrying the counters.
    pub fn display_name(&self) -> String {
        format!(
            "{} (yesterday: {} / today: {})",
            self.name, self.yesterday, self.today
        )
    }

    /// Roll the day over: today's count becomes yesterday's and today restarts at zero.
    pub fn roll_over(&mut self) {
        self.yesterday = self.today;
        self.today = 0;
    }
}
