//! Mastodon REST API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tally_core::{Account, AccountBuilder, StatusDraft, Visibility};
use tally_error::HttpError;
use tally_interface::SocialClient;
use tracing::{debug, error, instrument};

use crate::client::check_status;

#[derive(Debug, Deserialize)]
struct AccountEntity {
    id: String,
    acct: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    username: String,
}

impl AccountEntity {
    fn into_account(self) -> Result<Account, HttpError> {
        AccountBuilder::default()
            .id(self.id)
            .acct(self.acct)
            .display_name(self.display_name)
            .username(self.username)
            .build()
            .map_err(|e| HttpError::new(format!("Invalid account entity: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct StatusEntity {
    id: String,
}

#[derive(Debug, Serialize)]
struct NewStatus<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_reply_to_id: Option<&'a str>,
    visibility: Visibility,
}

/// Mastodon REST client authenticated with a bearer token.
#[derive(Clone)]
pub struct MastodonClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for MastodonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MastodonClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl MastodonClient {
    /// Create a client for the server at `base_url`.
    pub fn new(http: Client, base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn account_from(response: reqwest::Response) -> Result<Account, HttpError> {
        let response = check_status(response).await?;
        let entity: AccountEntity = response
            .json()
            .await
            .map_err(|e| HttpError::new(format!("Failed to parse account: {}", e)))?;
        entity.into_account()
    }
}

#[async_trait]
impl SocialClient for MastodonClient {
    #[instrument(skip(self))]
    async fn verify_credentials(&self) -> Result<Account, HttpError> {
        let response = self
            .http
            .get(self.url("/api/v1/accounts/verify_credentials"))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to verify credentials");
                HttpError::new(format!("Request failed: {}", e))
            })?;

        let account = Self::account_from(response).await?;
        debug!(account_id = %account.id(), "Verified credentials");
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn update_display_name(&self, display_name: &str) -> Result<Account, HttpError> {
        let response = self
            .http
            .patch(self.url("/api/v1/accounts/update_credentials"))
            .bearer_auth(&self.access_token)
            .form(&[("display_name", display_name)])
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to update display name");
                HttpError::new(format!("Request failed: {}", e))
            })?;

        Self::account_from(response).await
    }

    #[instrument(skip(self, draft), fields(reply_to = ?draft.in_reply_to_id()))]
    async fn post_status(&self, draft: StatusDraft) -> Result<String, HttpError> {
        let body = NewStatus {
            status: draft.text(),
            in_reply_to_id: draft.in_reply_to_id().as_deref(),
            visibility: *draft.visibility(),
        };

        let response = self
            .http
            .post(self.url("/api/v1/statuses"))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to post status");
                HttpError::new(format!("Request failed: {}", e))
            })?;

        let response = check_status(response).await?;
        let status: StatusEntity = response
            .json()
            .await
            .map_err(|e| HttpError::new(format!("Failed to parse status: {}", e)))?;
        debug!(status_id = %status.id, "Posted status");
        Ok(status.id)
    }
}
