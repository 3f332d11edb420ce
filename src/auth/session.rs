//! Signed-in session
//!
//! One [`Session`] is built at the application root and cloned by handle into
//! every screen and worker. It owns the API client and the cached profile.

use std::sync::{Arc, PoisonError, RwLock};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::{AuthResponse, User};

use super::TokenStore;

struct Inner {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    user: RwLock<Option<User>>,
}

/// Shared authentication state
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api", &self.inner.api)
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

impl Session {
    /// Wrap an API client; the client's token store backs the session
    pub fn new(api: ApiClient) -> Self {
        let tokens = api.tokens();
        Self {
            inner: Arc::new(Inner {
                api,
                tokens,
                user: RwLock::new(None),
            }),
        }
    }

    /// The HTTP client bound to this session
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Whether a bearer token is stored
    pub fn is_signed_in(&self) -> bool {
        match self.inner.tokens.load() {
            Ok(token) => token.is_some_and(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session token: {e:#}");
                false
            }
        }
    }

    /// Cached profile of the signed-in user
    pub fn user(&self) -> Option<User> {
        self.inner
            .user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_user(&self, user: Option<User>) {
        *self
            .inner
            .user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = user;
    }

    fn establish(&self, response: AuthResponse) -> ApiResult<Option<User>> {
        if response.token.is_empty() {
            return Err(ApiError::Malformed("response carried no token".to_string()));
        }
        self.inner
            .tokens
            .save(&response.token)
            .map_err(ApiError::Storage)?;
        self.set_user(response.user.clone());
        tracing::info!("Signed in");
        Ok(response.user)
    }

    /// Sign in with email and password and persist the token
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let response = self.inner.api.login(&email, password).await?;
        self.establish(response)
    }

    /// Create an account and sign in
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> ApiResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let response = self
            .inner
            .api
            .signup(&email, password, password_confirmation)
            .await?;
        self.establish(response)
    }

    /// Sign out. The server call is best effort; the local token is always
    /// removed.
    pub async fn logout(&self) -> ApiResult<()> {
        let token = self.inner.tokens.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to read session token: {e:#}");
            None
        });
        if let Some(token) = token
            && let Err(e) = self.inner.api.logout(&token).await
        {
            tracing::warn!("Server logout failed: {e}");
        }
        self.expire();
        tracing::info!("Signed out");
        Ok(())
    }

    /// Refetch the profile of the signed-in user
    pub async fn refresh(&self) -> ApiResult<User> {
        let user = self.inner.api.current_user().await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Drop local credentials without contacting the server (used after a 401)
    pub fn expire(&self) {
        if let Err(e) = self.inner.tokens.clear() {
            tracing::warn!("Failed to clear session token: {e:#}");
        }
        self.set_user(None);
    }
}
