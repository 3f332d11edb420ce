//! Conversation endpoints

use serde_json::json;

use super::{ApiClient, ApiError, ApiResult, list_from};
use crate::models::{Conversation, ConversationThread, Message};

impl ApiClient {
    /// Conversations of the signed-in user
    pub async fn conversations(&self) -> ApiResult<Vec<Conversation>> {
        let value = self
            .get_value(&self.api_url("/user/conversations"), &[])
            .await?;
        list_from(value, "conversations")
    }

    /// Create a conversation with another user, or return the existing one
    pub async fn open_conversation(&self, other_user_id: u64) -> ApiResult<ConversationThread> {
        let request = self
            .client
            .post(self.api_url("/conversation/new"))
            .json(&json!({ "other_user_id": other_user_id }));
        Ok(self.send(request).await?.json().await?)
    }

    /// The conversation with the support team
    pub async fn support_conversation(&self) -> ApiResult<ConversationThread> {
        self.get_json(&self.api_url("/conversations/admin_conversation"))
            .await
    }

    /// Post a message. The server answers with the message either bare or
    /// under a `message` key.
    pub async fn send_message(&self, conversation_id: u64, body: &str) -> ApiResult<Message> {
        let request = self
            .client
            .post(self.api_url(&format!("/conversations/{conversation_id}/messages")))
            .json(&json!({ "body": body }));
        let mut value: serde_json::Value = self.send(request).await?.json().await?;

        let message = match value.get_mut("message") {
            Some(inner) if inner.is_object() => inner.take(),
            _ => value,
        };
        serde_json::from_value(message).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}
