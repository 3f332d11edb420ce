//! Authentication: bearer token storage and the signed-in session
//!
//! The token is the only durable client state. It lives behind the
//! [`TokenStore`] trait so the HTTP client can read it before every request
//! and clear it when the server answers 401.

mod session;
mod store;

pub use session::Session;
pub use store::{EncryptedFileStore, MemoryStore, TOKEN_KEY};

use anyhow::Result;

/// Persistent storage for the bearer token
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any
    fn load(&self) -> Result<Option<String>>;

    /// Store a token, replacing any previous one
    fn save(&self, token: &str) -> Result<()>;

    /// Remove the stored token
    fn clear(&self) -> Result<()>;
}
