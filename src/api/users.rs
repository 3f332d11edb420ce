//! User and profile endpoints

use super::{ApiClient, ApiResult, list_from};
use crate::models::{ProfileUpdate, User, UserSummary};

impl ApiClient {
    /// The signed-in user's profile
    pub async fn current_user(&self) -> ApiResult<User> {
        self.get_json(&self.api_url("/user")).await
    }

    /// Update the signed-in user's profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<()> {
        self.send(self.client.post(self.api_url("/user")).json(update))
            .await?;
        Ok(())
    }

    /// Search other users by name, username or email
    pub async fn search_users(&self, query: &str) -> ApiResult<Vec<UserSummary>> {
        let value = self
            .get_value(&self.api_url("/users/search"), &[("q", query.to_string())])
            .await?;
        list_from(value, "users")
    }
}
