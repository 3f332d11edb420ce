//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and async tasks.
//! Every command runs on its own task, so a slow page fetch never holds up a
//! like toggle or a search.

use tokio::sync::mpsc;

use crate::api::{ApiError, ApiResult};
use crate::auth::Session;
use crate::feed::{LikeRequest, PageRequest};
use crate::models::{
    Conversation, ConversationThread, Message, ProfileUpdate, User, UserSummary, Verse, VersePage,
};

use super::state::FeedSlot;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Fetch a page for a feed
    LoadPage { slot: FeedSlot, request: PageRequest },
    /// Send a like toggle that was already applied locally
    ToggleLike { slot: FeedSlot, request: LikeRequest },
    /// Fetch the liked list
    FetchLiked,
    /// Sign in
    Login { email: String, password: String },
    /// Create an account
    Signup {
        email: String,
        password: String,
        confirmation: String,
    },
    /// Sign out
    Logout,
    /// Email a reset code
    RequestReset { email: String },
    /// Check a reset code
    VerifyCode { email: String, code: String },
    /// Set a new password
    ResetPassword {
        email: String,
        code: String,
        password: String,
        confirmation: String,
    },
    /// Fetch the profile
    FetchProfile,
    /// Save the profile
    UpdateProfile { update: ProfileUpdate },
    /// Fetch the conversation list
    FetchConversations,
    /// Search users to talk to
    SearchUsers { query: String },
    /// Create or reuse a conversation
    OpenConversation { other_user_id: u64 },
    /// Search verses to send
    SearchVerses { query: String },
    /// Send a message to a conversation
    SendMessage { conversation_id: u64, body: String },
    /// Fetch the support thread
    FetchSupport,
    /// Send a message to support and refetch the thread
    SendSupport { conversation_id: u64, body: String },
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// A page fetch finished (successfully or not)
    PageLoaded {
        slot: FeedSlot,
        request: PageRequest,
        result: ApiResult<VersePage>,
    },
    /// A like toggle finished
    LikeToggled {
        slot: FeedSlot,
        request: LikeRequest,
        result: ApiResult<()>,
    },
    /// Liked list
    Liked { verses: Vec<Verse> },
    /// Signed in (or signed up)
    SignedIn { user: Option<User> },
    /// Signed out
    SignedOut,
    /// Reset code sent
    ResetRequested { email: String },
    /// Reset code accepted
    CodeVerified { code: String },
    /// Password changed
    PasswordReset,
    /// Profile fetched
    Profile { user: User },
    /// Profile saved
    ProfileSaved,
    /// Conversation list
    Conversations { conversations: Vec<Conversation> },
    /// User search results
    UsersFound { query: String, users: Vec<UserSummary> },
    /// Verse search results
    VersesFound { query: String, verses: Vec<Verse> },
    /// Conversation opened
    ConversationOpened { thread: ConversationThread },
    /// Message delivered
    MessageSent {
        conversation_id: u64,
        message: Message,
    },
    /// Support thread
    Support { thread: ConversationThread },
    /// A form submission was rejected; shown as an alert
    Rejected { message: String },
    /// The server rejected the token
    SessionExpired,
    /// An error occurred
    Error { message: String },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker(session: Session) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(64);

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            if matches!(cmd, AsyncCommand::Shutdown) {
                break;
            }
            let session = session.clone();
            let result_tx = result_tx.clone();
            tokio::spawn(async move {
                let result = handle(&session, cmd).await;
                let _ = result_tx.send(result).await;
            });
        }
    });

    AsyncHandle { cmd_tx, result_rx }
}

/// Map a failed call to a result: 401s expire the session
fn failure(e: &ApiError, context: &str) -> AsyncResult {
    if e.is_unauthorized() {
        return AsyncResult::SessionExpired;
    }
    tracing::warn!("{context}: {e}");
    AsyncResult::Error {
        message: format!("{context}: {}", e.user_message()),
    }
}

/// Map a failed form submission to an alert
fn rejected(e: &ApiError, context: &str) -> AsyncResult {
    if e.is_unauthorized() {
        return AsyncResult::SessionExpired;
    }
    tracing::warn!("{context}: {e}");
    AsyncResult::Rejected {
        message: format!("{context}: {}", e.user_message()),
    }
}

async fn handle(session: &Session, cmd: AsyncCommand) -> AsyncResult {
    let api = session.api();

    match cmd {
        AsyncCommand::LoadPage { slot, request } => {
            let result = api.verse_page(&request.page_url()).await;
            AsyncResult::PageLoaded {
                slot,
                request,
                result,
            }
        }
        AsyncCommand::ToggleLike { slot, request } => {
            let result = api.toggle_verse_like(request.verse_id).await;
            AsyncResult::LikeToggled {
                slot,
                request,
                result,
            }
        }
        AsyncCommand::FetchLiked => match api.liked().await {
            Ok(verses) => AsyncResult::Liked { verses },
            Err(e) => failure(&e, "Failed to load liked verses"),
        },
        AsyncCommand::Login { email, password } => match session.login(&email, &password).await {
            Ok(user) => AsyncResult::SignedIn { user },
            Err(e) => rejected(&e, "Login failed"),
        },
        AsyncCommand::Signup {
            email,
            password,
            confirmation,
        } => match session.signup(&email, &password, &confirmation).await {
            Ok(user) => AsyncResult::SignedIn { user },
            Err(e) => rejected(&e, "Sign up failed"),
        },
        AsyncCommand::Logout => match session.logout().await {
            Ok(()) => AsyncResult::SignedOut,
            Err(e) => {
                tracing::warn!("Logout failed: {e}");
                session.expire();
                AsyncResult::SignedOut
            }
        },
        AsyncCommand::RequestReset { email } => match api.request_password_reset(&email).await {
            Ok(()) => AsyncResult::ResetRequested { email },
            Err(e) => rejected(&e, "Could not send reset code"),
        },
        AsyncCommand::VerifyCode { email, code } => {
            match api.verify_reset_code(&email, &code).await {
                Ok(()) => AsyncResult::CodeVerified { code },
                Err(e) => rejected(&e, "Invalid code"),
            }
        }
        AsyncCommand::ResetPassword {
            email,
            code,
            password,
            confirmation,
        } => match api
            .reset_password(&email, &code, &password, &confirmation)
            .await
        {
            Ok(()) => AsyncResult::PasswordReset,
            Err(e) => rejected(&e, "Password reset failed"),
        },
        AsyncCommand::FetchProfile => match session.refresh().await {
            Ok(user) => AsyncResult::Profile { user },
            Err(e) => failure(&e, "Failed to load profile"),
        },
        AsyncCommand::UpdateProfile { update } => match api.update_profile(&update).await {
            Ok(()) => AsyncResult::ProfileSaved,
            Err(e) => rejected(&e, "Profile update failed"),
        },
        AsyncCommand::FetchConversations => match api.conversations().await {
            Ok(conversations) => AsyncResult::Conversations { conversations },
            Err(e) => failure(&e, "Failed to load conversations"),
        },
        AsyncCommand::SearchUsers { query } => match api.search_users(&query).await {
            Ok(users) => AsyncResult::UsersFound { query, users },
            Err(e) => failure(&e, "User search failed"),
        },
        AsyncCommand::OpenConversation { other_user_id } => {
            let (thread, user) = tokio::join!(
                api.open_conversation(other_user_id),
                session.refresh()
            );
            if let Err(e) = &user {
                tracing::warn!("Failed to load current user: {e}");
            }
            match thread {
                Ok(mut thread) => {
                    if thread.current_user_id.is_none() {
                        thread.current_user_id = user.ok().and_then(|u| u.id);
                    }
                    AsyncResult::ConversationOpened { thread }
                }
                Err(e) => failure(&e, "Could not open conversation"),
            }
        }
        AsyncCommand::SearchVerses { query } => match api.search_verses(&query).await {
            Ok(verses) => AsyncResult::VersesFound { query, verses },
            Err(e) => failure(&e, "Verse search failed"),
        },
        AsyncCommand::SendMessage {
            conversation_id,
            body,
        } => match api.send_message(conversation_id, &body).await {
            Ok(message) => AsyncResult::MessageSent {
                conversation_id,
                message,
            },
            Err(e) => failure(&e, "Failed to send message"),
        },
        AsyncCommand::FetchSupport => match api.support_conversation().await {
            Ok(thread) => AsyncResult::Support { thread },
            Err(e) => failure(&e, "Failed to load support"),
        },
        AsyncCommand::SendSupport {
            conversation_id,
            body,
        } => {
            if let Err(e) = api.send_message(conversation_id, &body).await {
                return failure(&e, "Failed to send message");
            }
            match api.support_conversation().await {
                Ok(thread) => AsyncResult::Support { thread },
                Err(e) => failure(&e, "Failed to load support"),
            }
        }
        AsyncCommand::Shutdown => AsyncResult::Error {
            message: "Worker is shutting down".to_string(),
        },
    }
}
