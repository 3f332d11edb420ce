//! User models

use serde::{Deserialize, Serialize};

/// The signed-in user's profile (`GET /user`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier
    #[serde(default)]
    pub id: Option<u64>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// Name for display, falling back to the email address
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let full = full.trim();
        if full.is_empty() {
            self.email.clone().unwrap_or_else(|| "Unknown".to_string())
        } else {
            full.to_string()
        }
    }
}

/// Another user, as seen in search results and conversations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Backend identifier
    pub id: u64,
    /// Username
    #[serde(default)]
    pub username: Option<String>,
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
}

impl UserSummary {
    /// "First Last", else username, else email
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Unknown User".to_string())
    }
}

/// Response body of the login and signup endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// The authenticated user
    #[serde(default)]
    pub user: Option<User>,
}

/// Payload for `POST /user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email (always sent lowercased)
    pub email: String,
    /// New password, only when the user asked to change it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl ProfileUpdate {
    /// Build an update, lowercasing the email and dropping blank passwords
    pub fn new(first_name: &str, last_name: &str, email: &str, new_password: Option<&str>) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_lowercase(),
            new_password: new_password
                .filter(|p| !p.trim().is_empty())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_display_name_fallbacks() {
        let mut user = UserSummary {
            id: 7,
            username: Some("ruth".to_string()),
            first_name: None,
            last_name: None,
            email: Some("ruth@example.com".to_string()),
        };
        assert_eq!(user.display_name(), "ruth");

        user.first_name = Some("Ruth".to_string());
        assert_eq!(user.display_name(), "Ruth");

        user.username = None;
        user.first_name = None;
        assert_eq!(user.display_name(), "ruth@example.com");
    }

    #[test]
    fn test_profile_update_lowercases_email() {
        let update = ProfileUpdate::new("Ada", "Lovelace", "Ada@Example.COM", Some("  "));
        assert_eq!(update.email, "ada@example.com");
        assert_eq!(update.new_password, None);

        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("new_password").is_none());
    }
}
