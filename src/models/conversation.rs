//! Conversation and message models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserSummary;

/// Last message preview in the conversation list.
///
/// The backend sends either a bare string or a small object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LastMessage {
    /// Plain message body
    Text(String),
    /// Structured preview
    Detail {
        /// Message body
        #[serde(default)]
        body: Option<String>,
        /// Sender display name
        #[serde(default)]
        sender: Option<String>,
        /// Shared verse reference
        #[serde(default)]
        verse: Option<String>,
        /// Human-readable time
        #[serde(default)]
        time: Option<String>,
    },
}

/// Longest preview shown before cutting to an ellipsis
const PREVIEW_CHARS: usize = 40;

impl LastMessage {
    /// Single-line preview: the shared verse, else the body, cut at 40 chars
    pub fn preview(&self) -> String {
        let text = match self {
            Self::Text(text) => text.as_str(),
            Self::Detail { body, verse, .. } => verse
                .as_deref()
                .filter(|v| !v.is_empty())
                .or(body.as_deref())
                .unwrap_or_default(),
        };
        if text.chars().count() > PREVIEW_CHARS {
            let cut: String = text.chars().take(PREVIEW_CHARS).collect();
            format!("{cut}...")
        } else {
            text.to_string()
        }
    }

    /// Server-formatted time of the last message
    pub fn time(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Detail { time, .. } => time.as_deref().filter(|t| !t.is_empty()),
        }
    }
}

/// Entry in `GET /user/conversations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation id
    pub id: u64,
    /// Optional title
    #[serde(default)]
    pub conversation_name: Option<String>,
    /// Owner id
    #[serde(default)]
    pub user_id: Option<u64>,
    /// Other participant id
    #[serde(default)]
    pub other_user_id: Option<u64>,
    /// Other participant name
    #[serde(default)]
    pub other_user_name: Option<String>,
    /// Other participant email
    #[serde(default)]
    pub other_user_email: Option<String>,
    /// Last message preview
    #[serde(default)]
    pub last_message: Option<LastMessage>,
    /// Last activity, as sent by the server
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Conversation {
    /// Title shown in the list
    pub fn title(&self) -> String {
        self.other_user_name
            .clone()
            .or_else(|| self.conversation_name.clone())
            .or_else(|| self.other_user_email.clone())
            .unwrap_or_else(|| format!("Conversation #{}", self.id))
    }
}

/// A single message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id
    pub id: u64,
    /// Message text
    pub body: String,
    /// Sender id
    pub sender_id: u64,
    /// Receiver id
    #[serde(default)]
    pub receiver_id: Option<u64>,
    /// Read flag
    #[serde(default)]
    pub read: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Local "HH:MM" time for the bubble footer
    pub fn time_label(&self) -> String {
        self.created_at
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}

/// A conversation with its messages (`POST /conversation/new`,
/// `GET /conversations/admin_conversation`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationThread {
    /// Conversation id
    pub id: u64,
    /// Other participant
    #[serde(default)]
    pub other_user: Option<UserSummary>,
    /// Messages, oldest first
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Present on the support conversation
    #[serde(default)]
    pub current_user_id: Option<u64>,
}

impl ConversationThread {
    /// Name of the other participant
    pub fn other_user_name(&self) -> String {
        self.other_user
            .as_ref()
            .map_or_else(|| "Unknown User".to_string(), UserSummary::display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_message_accepts_both_shapes() {
        let text: LastMessage = serde_json::from_str(r#""See you Sunday""#).unwrap();
        assert_eq!(text.preview(), "See you Sunday");

        let detail: LastMessage =
            serde_json::from_str(r#"{"body":"Psalm 46:10","sender":"Ann","time":"2h"}"#).unwrap();
        assert_eq!(detail.preview(), "Psalm 46:10");
        assert_eq!(detail.time(), Some("2h"));
    }

    #[test]
    fn test_last_message_prefers_verse_and_truncates() {
        let detail: LastMessage = serde_json::from_str(
            r#"{"body":"hello","verse":"Be still, and know that I am God: I will be exalted","time":"09:30"}"#,
        )
        .unwrap();
        assert_eq!(detail.preview(), "Be still, and know that I am God: I will...");
        assert_eq!(detail.time(), Some("09:30"));

        let text = LastMessage::Text("x".repeat(41));
        assert_eq!(text.preview(), format!("{}...", "x".repeat(40)));
        assert_eq!(LastMessage::Text("x".repeat(40)).preview(), "x".repeat(40));
        assert_eq!(text.time(), None);
    }

    #[test]
    fn test_thread_parses_messages() {
        let json = r#"{
            "id": 3,
            "other_user": {"id": 9, "username": "support"},
            "messages": [
                {"id": 1, "body": "hi", "sender_id": 9, "receiver_id": 4,
                 "read": true, "created_at": "2025-01-01T10:00:00Z"}
            ],
            "current_user_id": 4
        }"#;
        let thread: ConversationThread = serde_json::from_str(json).unwrap();
        assert_eq!(thread.messages.len(), 1);
        assert_eq!(thread.current_user_id, Some(4));
        assert_eq!(thread.other_user_name(), "support");
    }
}
