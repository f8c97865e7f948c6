//! Normalized social-media events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Who can see a post.
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
pub enum Visibility {
    /// Visible to everyone and listed on public timelines.
    #[default]
    Public,
    /// Visible to everyone but not listed.
    Unlisted,
    /// Followers only.
    Private,
    /// Mentioned accounts only.
    Direct,
}

/// The author of an event.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct Account {
    /// Platform account id.
    id: String,
    /// Handle used for mentions (`user` or `user@domain`).
    acct: String,
    /// Display name, possibly empty.
    #[builder(default)]
    display_name: String,
    /// Local username.
    #[builder(default)]
    username: String,
}

impl Account {
    /// Name to address the author by: the display name, or the username when it is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_core::AccountBuilder;
    ///
    /// let account = AccountBuilder::default()
    ///     .id("1")
    ///     .acct("alice")
    ///     .username("alice")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(account.preferred_name(), "alice");
    /// ```
    pub fn preferred_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

/// One decoded post from the stream.
///
/// Immutable once built; shared read-only between rule matching and actions.
///
/// # Examples
///
/// ```
/// use tally_core::{AccountBuilder, NormalizedEventBuilder, Visibility};
///
/// let event = NormalizedEventBuilder::default()
///     .id("100")
///     .account(
///         AccountBuilder::default()
///             .id("1")
///             .acct("alice")
///             .build()
///             .unwrap(),
///     )
///     .text("hello")
///     .build()
///     .unwrap();
///
/// assert_eq!(event.text(), "hello");
/// assert_eq!(*event.visibility(), Visibility::Public);
/// assert!(!event.is_reshare());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct NormalizedEvent {
    /// Status id.
    id: String,
    /// Author.
    account: Account,
    /// Plain text with markup stripped and entities decoded.
    text: String,
    /// Whether this is a reshare (boost/retweet) of another post.
    #[builder(default)]
    #[getter(skip)]
    is_reshare: bool,
    /// Hashtag names attached to the post.
    #[builder(default)]
    tags: BTreeSet<String>,
    /// Shortcodes of custom emoji used in the post.
    #[builder(default)]
    emoji_shortcodes: BTreeSet<String>,
    /// Post visibility.
    #[builder(default)]
    visibility: Visibility,
    /// Status this post replies to, if any.
    #[builder(default)]
    in_reply_to_id: Option<String>,
    /// When the post was created.
    #[builder(default = "Utc::now()")]
    created_at: DateTime<Utc>,
}

impl NormalizedEvent {
    /// Whether this event is a reshare.
    pub fn is_reshare(&self) -> bool {
        self.is_reshare
    }

    /// Whether this event is a reply to another status.
    pub fn is_reply(&self) -> bool {
        self.in_reply_to_id.is_some()
    }
}
