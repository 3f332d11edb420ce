//! Authentication and password reset endpoints

use serde_json::json;

use super::{ApiClient, ApiResult};
use crate::models::AuthResponse;

impl ApiClient {
    /// `POST /auth/login`
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let request = self
            .client
            .post(self.api_url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        Ok(self.send_anonymous(request).await?.json().await?)
    }

    /// `POST /auth/signup`
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> ApiResult<AuthResponse> {
        let request = self.client.post(self.api_url("/auth/signup")).json(&json!({
            "email": email,
            "password": password,
            "password_confirmation": password_confirmation,
        }));
        Ok(self.send_anonymous(request).await?.json().await?)
    }

    /// `DELETE /auth/logout` with an explicit token
    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        let request = self
            .client
            .delete(self.api_url("/auth/logout"))
            .bearer_auth(token);
        self.send_anonymous(request).await?;
        Ok(())
    }

    /// Ask the server to email a reset code
    pub async fn request_password_reset(&self, email: &str) -> ApiResult<()> {
        let request = self
            .client
            .post(self.api_url("/auth/password"))
            .json(&json!({ "email": email.trim() }));
        self.send_anonymous(request).await?;
        Ok(())
    }

    /// Check a reset code
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> ApiResult<()> {
        let request = self
            .client
            .post(self.api_url("/auth/password/verify"))
            .json(&json!({ "email": email, "code": code.trim() }));
        self.send_anonymous(request).await?;
        Ok(())
    }

    /// Set a new password using a verified code
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        password: &str,
        password_confirmation: &str,
    ) -> ApiResult<()> {
        let request = self.client.put(self.api_url("/auth/password")).json(&json!({
            "email": email,
            "code": code.trim(),
            "password": password.trim(),
            "password_confirmation": password_confirmation.trim(),
        }));
        self.send_anonymous(request).await?;
        Ok(())
    }
}
