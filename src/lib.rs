//! # Serenity ✝
//!
//! A terminal client for the Serenity verse service.
//!
//! ## Overview
//!
//! Serenity shows one Bible verse at a time from a paginated feed, either the
//! "His Will" home feed or a category of your choice. Verses can be liked,
//! shared into conversations with other users, and revisited from the liked
//! list. Accounts, password resets and profiles are handled in the app.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │  Sync event loop; an async worker runs every HTTP request   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │      Feed       │ │       API       │ │       UI        │
//! │                 │ │                 │ │                 │
//! │ • Pagination    │ │ • Verses        │ │ • Verse card    │
//! │ • Prefetch      │ │ • Auth / users  │ │ • Forms         │
//! │ • Likes         │ │ • Conversations │ │ • Threads       │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Config      │ │      Auth       │ │     Models      │
//! │                 │ │                 │ │                 │
//! │ • Environment   │ │ • Session       │ │ • Verse         │
//! │ • Theme         │ │ • Token store   │ │ • User          │
//! │ • Tuning        │ │ • Encryption    │ │ • Conversation  │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - HTTP client for the Serenity backend
//! - [`app`] - TUI application state and event loop
//! - [`auth`] - Session and encrypted token storage
//! - [`config`] - Configuration management
//! - [`debounce`] - Search-as-you-type debouncing
//! - [`feed`] - Paginated verse feed with optimistic likes
//! - [`models`] - Data models (Verse, User, Conversation)
//! - [`theme`] - Theme support via ratatui-themes
//! - [`validation`] - Form validation
//!
//! ## Example
//!
//! ```no_run
//! use serenity::app;
//!
//! fn main() -> anyhow::Result<()> {
//!     app::run()
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/serenity/0.1.0")]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod debounce;
pub mod feed;
pub mod models;
pub mod paths;
pub mod theme;
pub mod validation;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError, ApiResult};
pub use app::AppState;
pub use auth::{EncryptedFileStore, MemoryStore, Session, TokenStore};
pub use config::{Config, Environment};
pub use feed::{Feed, FeedPhase, VerseSource};
pub use models::{Category, Conversation, ConversationThread, Message, User, Verse, VersePage};
pub use theme::{Theme, ThemeColors};

// Re-export theme types from ratatui-themes crate
pub use ratatui_themes::{ThemeName, ThemePalette};

/// ASCII logo for the application
pub const LOGO: &str = r"
   ____                    _ __
  / __/__ _______ ___  (_) /___ __
 _\ \/ -_) __/ -_) _ \/ / __/ // /
/___/\__/_/  \__/_//_/_/\__/\_, /
                           /___/
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
