//! Fortune generator client.
//!
//! The generator is a web form: the page carries a CSRF token, the form is
//! posted back with the subject's name, and the result is read from a
//! textarea on the response page.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::ACCEPT;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tally_error::HttpError;
use tally_interface::FortuneClient;
use tracing::{debug, instrument};

use crate::client::check_status;

static TEMPLATE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$\\]\{?\d+").expect("valid template reference regex"));

static NAME_DECORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[@＠].+|[\(（].+[\)）]").expect("valid decoration regex"));

static CSRF_TOKEN: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="csrf-token"]"#).expect("valid csrf selector")
});

static RESULT_TEXT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("textarea#copy-textarea-140").expect("valid result selector"));

/// Prepare a display name for the generator form.
///
/// Template references such as `$1` or `\{2` are escaped so the generator
/// prints them literally, and trailing decorations like `@work` or `(away)`
/// are removed unless they make up the whole name.
///
/// # Examples
///
/// ```
/// use tally_social::sanitize_name;
///
/// assert_eq!(sanitize_name("Alice@vacation"), "Alice");
/// assert_eq!(sanitize_name("Bob (busy)"), "Bob ");
/// assert_eq!(sanitize_name("(only)"), "(only)");
/// assert_eq!(sanitize_name("$1"), r"\$1");
/// ```
pub fn sanitize_name(name: &str) -> String {
    let escaped = TEMPLATE_REFERENCE.replace_all(name, r"\$0");
    match NAME_DECORATION.find(&escaped) {
        Some(found) if found.as_str() == escaped => escaped.into_owned(),
        _ => NAME_DECORATION.replace_all(&escaped, "").into_owned(),
    }
}

fn csrf_token(page: &str) -> Option<String> {
    Html::parse_document(page)
        .select(&CSRF_TOKEN)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

fn result_text(page: &str) -> Option<String> {
    Html::parse_document(page)
        .select(&RESULT_TEXT)
        .next()
        .map(|textarea| textarea.text().collect::<String>().replace('\u{2002}', " "))
}

/// Fetches fortunes from a shindanmaker-style generator.
#[derive(Debug, Clone)]
pub struct HttpFortuneClient {
    http: Client,
}

impl HttpFortuneClient {
    /// Create a client sharing the given HTTP connection pool.
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    async fn get_page(&self, url: &str) -> Result<String, HttpError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Failed to fetch fortune page: {}", e)))?;
        check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| HttpError::new(format!("Failed to read fortune page: {}", e)))
    }
}

#[async_trait]
impl FortuneClient for HttpFortuneClient {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str, name: &str) -> Result<String, HttpError> {
        let page = self.get_page(url).await?;
        let token =
            csrf_token(&page).ok_or_else(|| HttpError::new("Fortune page has no csrf-token"))?;

        let name = sanitize_name(name);
        let response = self
            .http
            .post(url.replace("/a/", "/"))
            .header(ACCEPT, "*/*")
            .form(&[
                ("type", "name"),
                ("shindanName", name.as_str()),
                ("_token", token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Failed to submit fortune form: {}", e)))?;
        let result_page = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| HttpError::new(format!("Failed to read fortune result: {}", e)))?;

        let fortune =
            result_text(&result_page).ok_or_else(|| HttpError::new("Fortune result not found"))?;
        debug!(chars = fortune.chars().count(), "Fetched fortune");
        Ok(fortune)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_csrf_token() {
        let page = r#"<html><head><meta name="csrf-token" content="abc123"></head></html>"#;
        assert_eq!(csrf_token(page), Some("abc123".to_string()));
        assert_eq!(csrf_token("<html></html>"), None);
    }

    #[test]
    fn reads_result_textarea() {
        let page = r#"<textarea id="copy-textarea-140">Alice&#39;s luck:&#x2002;great &amp; shiny</textarea>"#;
        assert_eq!(
            result_text(page),
            Some("Alice's luck: great & shiny".to_string())
        );
    }

    #[test]
    fn ignores_other_textareas() {
        let page = r#"<textarea id="copy-textarea-999">wrong</textarea>"#;
        assert_eq!(result_text(page), None);
    }

    #[test]
    fn escapes_braced_references() {
        assert_eq!(sanitize_name(r"a\{12}"), r"a\\{12}");
    }
}
