//! Read-only social client for dry runs.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tally_core::{Account, AccountBuilder, StatusDraft};
use tally_error::HttpError;
use tally_interface::SocialClient;
use tracing::info;

/// Passes reads through to the wrapped client and logs writes instead of sending them.
pub struct DryRunSocialClient {
    inner: Arc<dyn SocialClient>,
    posted: AtomicU64,
}

impl DryRunSocialClient {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn SocialClient>) -> Self {
        Self {
            inner,
            posted: AtomicU64::new(0),
        }
    }

    /// Number of statuses that would have been posted.
    pub fn posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SocialClient for DryRunSocialClient {
    async fn verify_credentials(&self) -> Result<Account, HttpError> {
        self.inner.verify_credentials().await
    }

    async fn update_display_name(&self, display_name: &str) -> Result<Account, HttpError> {
        info!(display_name, "Dry run: would update display name");
        let current = self.inner.verify_credentials().await?;
        AccountBuilder::default()
            .id(current.id().clone())
            .acct(current.acct().clone())
            .username(current.username().clone())
            .display_name(display_name)
            .build()
            .map_err(|e| HttpError::new(e.to_string()))
    }

    async fn post_status(&self, draft: StatusDraft) -> Result<String, HttpError> {
        let n = self.posted.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            text = %draft.text(),
            in_reply_to = ?draft.in_reply_to_id(),
            visibility = %draft.visibility(),
            "Dry run: would post status"
        );
        Ok(format!("dry-run-{}", n))
    }
}
