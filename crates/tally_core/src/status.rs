//! Outbound status drafts.

use crate::Visibility;
use serde::{Deserialize, Serialize};

/// A status to publish.
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
pub struct StatusDraft {
    /// Status text.
    text: String,
    /// Status being replied to.
    #[builder(default)]
    in_reply_to_id: Option<String>,
    /// Visibility of the new status.
    #[builder(default)]
    visibility: Visibility,
}

impl StatusDraft {
    /// A public top-level status.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            in_reply_to_id: None,
            visibility: Visibility::Public,
        }
    }
}
