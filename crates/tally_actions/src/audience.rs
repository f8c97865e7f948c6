//! Who a rule answers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tally_core::NormalizedEvent;

/// Which authors a rule responds to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Audience {
    /// Only the bot's owner accounts.
    Owner,
    /// Everyone, except replies posted by an owner account.
    #[default]
    Others,
    /// Everyone.
    Anyone,
}

impl Audience {
    /// Whether a rule with this audience may answer `event`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use tally_actions::Audience;
    /// use tally_core::{AccountBuilder, NormalizedEventBuilder};
    ///
    /// let owners = BTreeSet::from(["1".to_string()]);
    /// let event = NormalizedEventBuilder::default()
    ///     .id("10")
    ///     .account(AccountBuilder::default().id("2").acct("bob").build().unwrap())
    ///     .text("hi")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(!Audience::Owner.admits(&event, &owners));
    /// assert!(Audience::Others.admits(&event, &owners));
    /// ```
    pub fn admits(&self, event: &NormalizedEvent, owner_ids: &BTreeSet<String>) -> bool {
        let from_owner = owner_ids.contains(event.account().id());
        match self {
            Self::Owner => from_owner,
            Self::Others => !(from_owner && event.is_reply()),
            Self::Anyone => true,
        }
    }
}
