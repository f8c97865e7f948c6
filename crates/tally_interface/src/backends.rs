//! Side-effecting back ends used by actions.

use async_trait::async_trait;
use chrono::NaiveDate;
use tally_core::{Account, DailyTally, StatusDraft};
use tally_error::{DatabaseError, HttpError};

/// Outbound social platform API.
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// Fetch the bot's own account.
    async fn verify_credentials(&self) -> Result<Account, HttpError>;

    /// Replace the bot's display name and return the updated account.
    async fn update_display_name(&self, display_name: &str) -> Result<Account, HttpError>;

    /// Publish a status and return its id.
    async fn post_status(&self, draft: StatusDraft) -> Result<String, HttpError>;
}

/// Per-day counter storage.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Insert or overwrite the count for a day.
    async fn record(&self, tally: DailyTally) -> Result<(), DatabaseError>;

    /// Read the count for a day.
    async fn get(&self, date: NaiveDate) -> Result<Option<DailyTally>, DatabaseError>;

    /// Run an administrative statement and describe the outcome as text.
    async fn execute(&self, statement: &str) -> Result<String, DatabaseError>;
}

/// Third-party fortune generator.
#[async_trait]
pub trait FortuneClient: Send + Sync {
    /// Generate a fortune for `name` from the generator page at `url`.
    async fn fetch(&self, url: &str, name: &str) -> Result<String, HttpError>;
}
