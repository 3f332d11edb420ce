//! Data models for Serenity

mod category;
mod conversation;
mod user;
mod verse;

pub use category::{CATEGORIES, Category, HIS_WILL};
pub use conversation::{Conversation, ConversationThread, LastMessage, Message};
pub use user::{AuthResponse, ProfileUpdate, User, UserSummary};
pub use verse::{PaginationMetadata, Verse, VersePage};
