//! HTTP client for the Serenity backend
//!
//! [`ApiClient`] reads the bearer token from its [`TokenStore`] before every
//! authenticated request. A 401 on an authenticated request clears the stored
//! token and surfaces as [`ApiError::Unauthorized`], which the UI treats as a
//! global logout.

mod auth;
mod conversations;
mod error;
mod users;
mod verses;

pub use error::ApiError;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenStore;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result alias for API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Backend API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:3000/api/v1`)
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_timeout(base_url, tokens, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(base_url: &str, tokens: Arc<dyn TokenStore>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("serenity/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {e}");
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// API base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token store shared with the session
    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Build API URL
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Attach the stored bearer token, returning the token that was sent
    fn authorized(&self, builder: RequestBuilder) -> ApiResult<(RequestBuilder, Option<String>)> {
        let token = self.tokens.load().map_err(ApiError::Storage)?;
        Ok(match &token {
            Some(token) => (builder.bearer_auth(token), Some(token.clone())),
            None => (builder, None),
        })
    }

    /// Send an authenticated request and check the status
    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let (builder, sent) = self.authorized(builder)?;
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "API response");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.forget_rejected(sent.as_deref());
            return Err(ApiError::Unauthorized);
        }

        Self::check(response).await
    }

    /// Clear the stored token if it is still the one the server rejected.
    ///
    /// A token saved by a newer sign-in while the request was in flight is
    /// kept.
    fn forget_rejected(&self, sent: Option<&str>) {
        match self.tokens.load() {
            Ok(current) if current.as_deref() != sent => {
                tracing::debug!("Rejected token was already replaced, keeping the new one");
            }
            _ => {
                tracing::warn!("Server rejected the session token, signing out");
                if let Err(e) = self.tokens.clear() {
                    tracing::warn!("Failed to clear session token: {e:#}");
                }
            }
        }
    }

    /// Send a request without credentials and check the status
    async fn send_anonymous(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        tracing::debug!(url = %response.url(), status = %response.status(), "API response");
        Self::check(response).await
    }

    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_body(status, &body))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self.send(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    async fn get_value(&self, url: &str, query: &[(&str, String)]) -> ApiResult<serde_json::Value> {
        let response = self.send(self.client.get(url).query(query)).await?;
        Ok(response.json().await?)
    }
}

/// Decode a list that arrives either bare or wrapped in an object under `key`
pub(crate) fn list_from<T: DeserializeOwned>(value: serde_json::Value, key: &str) -> ApiResult<Vec<T>> {
    let list = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map.remove(key).unwrap_or_default(),
        serde_json::Value::Null => return Ok(Vec::new()),
        other => {
            return Err(ApiError::Malformed(format!("expected a list of {key}, got {other}")));
        }
    };

    if list.is_null() {
        return Ok(Vec::new());
    }

    serde_json::from_value(list).map_err(|e| ApiError::Malformed(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verse;
    use serde_json::json;

    #[test]
    fn test_list_from_bare_array() {
        let value = json!([{"id": 1, "book": "John", "chapter": 3, "verse": 16, "text": "For God"}]);
        let verses: Vec<Verse> = list_from(value, "verses").unwrap();
        assert_eq!(verses.len(), 1);
    }

    #[test]
    fn test_list_from_wrapped_object() {
        let value = json!({"verses": [{"book": "John", "chapter": 11, "verse": 35, "text": "Jesus wept."}]});
        let verses: Vec<Verse> = list_from(value, "verses").unwrap();
        assert_eq!(verses[0].chapter, 11);
    }

    #[test]
    fn test_list_from_missing_key_is_empty() {
        let verses: Vec<Verse> = list_from(json!({"other": []}), "verses").unwrap();
        assert!(verses.is_empty());
    }

    #[test]
    fn test_list_from_rejects_scalars() {
        let result: ApiResult<Vec<Verse>> = list_from(json!("nope"), "verses");
        assert!(matches!(result, Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_rejection_keeps_replaced_token() {
        let store = Arc::new(crate::auth::MemoryStore::with_token("new"));
        let client = ApiClient::new("http://127.0.0.1:3000/api/v1", store.clone());

        client.forget_rejected(Some("old"));
        assert_eq!(store.load().unwrap().as_deref(), Some("new"));

        client.forget_rejected(Some("new"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let client = ApiClient::new(
            "http://127.0.0.1:3000/api/v1/",
            Arc::new(crate::auth::MemoryStore::new()),
        );
        assert_eq!(client.api_url("/liked"), "http://127.0.0.1:3000/api/v1/liked");
    }
}
