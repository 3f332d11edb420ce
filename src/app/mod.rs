//! TUI Application module

mod async_ops;
mod events;
mod form;
mod state;
mod ui;

pub use state::{AppState, AuthScreen, ConversationView, FeedSlot, Mode, Screen, Tab};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

use crate::api::ApiClient;
use crate::auth::{EncryptedFileStore, Session};
use crate::config::Config;
use crate::feed::{LikeOutcome, LoadOutcome};

use async_ops::{AsyncCommand, AsyncHandle, AsyncResult, spawn_worker};

/// Run the TUI application
pub fn run() -> Result<()> {
    let rt = Runtime::new()?;

    let config = Config::load()?;
    let store = EncryptedFileStore::open()?;
    let api = ApiClient::with_timeout(
        config.api_base_url(),
        Arc::new(store),
        config.request_timeout(),
    );
    let session = Session::new(api);
    tracing::info!(base_url = config.api_base_url(), "Starting TUI");

    let async_handle = rt.block_on(async { spawn_worker(session.clone()) });

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut state = AppState::new(config, session);

    // Signed in from a previous run
    if state.screen == Screen::Main
        && let Some(cmd) = state.load_home()
    {
        let _ = async_handle.cmd_tx.blocking_send(cmd);
    }

    let result = run_app(&mut terminal, &mut state, async_handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
) -> Result<()> {
    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            if let Some(cmd) = handle_async_result(state, result) {
                let _ = async_handle.cmd_tx.blocking_send(cmd);
            }
        }

        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && let Some(cmd) = events::handle_key(state, key)
        {
            let _ = async_handle.cmd_tx.blocking_send(cmd);
        }

        // Debounced searches
        if let Some(cmd) = state.poll_searches(Instant::now()) {
            state.pending += 1;
            let _ = async_handle.cmd_tx.blocking_send(cmd);
        }

        state.tick();

        if state.should_quit {
            let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Shutdown);
            break;
        }
    }

    // Save config on exit (keeps the theme)
    state.config.save().context("Failed to save config")?;

    Ok(())
}

fn handle_async_result(state: &mut AppState, result: AsyncResult) -> Option<AsyncCommand> {
    match result {
        AsyncResult::PageLoaded {
            slot,
            request,
            result,
        } => {
            let expired = matches!(&result, Err(e) if e.is_unauthorized());
            let notice_after = state.config.failure_notice_after;
            let outcome = state.feed_mut(slot)?.complete_load(&request, result);
            if expired && outcome != LoadOutcome::Stale {
                return session_expired(state);
            }
            match outcome {
                LoadOutcome::Applied { .. } => {
                    if state.status == "Refreshing..." {
                        state.clear_status();
                    }
                }
                LoadOutcome::Failed {
                    consecutive_failures,
                } if consecutive_failures >= notice_after => {
                    state.set_status(format!(
                        "⚠ Could not load verses ({consecutive_failures} attempts failed). Press r to retry"
                    ));
                }
                LoadOutcome::Failed { .. } | LoadOutcome::Stale => {}
            }
            None
        }
        AsyncResult::LikeToggled {
            slot,
            request,
            result,
        } => {
            let expired = matches!(&result, Err(e) if e.is_unauthorized());
            let outcome = state.feed_mut(slot)?.complete_like(&request, result);
            if expired && outcome != LikeOutcome::Stale {
                return session_expired(state);
            }
            match outcome {
                LikeOutcome::RolledBack { .. } => {
                    state.set_status("⚠ Could not update like, restored");
                    None
                }
                LikeOutcome::Confirmed if slot == FeedSlot::Liked => {
                    // The liked list changed on the server
                    state.begin(AsyncCommand::FetchLiked)
                }
                LikeOutcome::Confirmed | LikeOutcome::Stale => None,
            }
        }
        AsyncResult::Liked { verses } => {
            state.finish();
            state.liked = verses;
            state.liked_index = state.liked_index.min(state.liked.len().saturating_sub(1));
            None
        }
        AsyncResult::SignedIn { user } => {
            state.finish();
            state.clear_status();
            state.enter_main(user)
        }
        AsyncResult::SignedOut => {
            state.finish();
            state.set_status("Signed out");
            state.sign_out();
            None
        }
        AsyncResult::ResetRequested { email } => {
            state.finish();
            state.reset_email = email;
            state.show_auth(AuthScreen::ResetCode);
            state.set_status("Check your email for a reset code");
            None
        }
        AsyncResult::CodeVerified { code } => {
            state.finish();
            state.reset_code = code;
            state.show_auth(AuthScreen::ResetPassword);
            state.clear_status();
            None
        }
        AsyncResult::PasswordReset => {
            state.finish();
            state.reset_email.clear();
            state.reset_code.clear();
            state.show_auth(AuthScreen::Login);
            state.set_status("✓ Password updated, please sign in");
            None
        }
        AsyncResult::Profile { user } => {
            state.finish();
            state.set_user(user);
            None
        }
        AsyncResult::ProfileSaved => {
            state.finish();
            state.set_status("✓ Profile updated");
            state.begin(AsyncCommand::FetchProfile)
        }
        AsyncResult::Conversations { conversations } => {
            state.finish();
            state.conversations = conversations;
            state.conversation_index = state
                .conversation_index
                .min(state.conversations.len().saturating_sub(1));
            None
        }
        AsyncResult::UsersFound { query, users } => {
            state.finish();
            // Drop results for a query the user has since edited
            if state.user_search.query().trim() == query {
                state.user_results = users;
                state.user_index = 0;
            }
            None
        }
        AsyncResult::VersesFound { query, verses } => {
            state.finish();
            if state.verse_search.query().trim() == query {
                state.verse_results = verses;
                state.verse_index = 0;
            }
            None
        }
        AsyncResult::ConversationOpened { thread } => {
            state.finish();
            state.set_status(format!("Talking with {}", thread.other_user_name()));
            state.thread = Some(thread);
            state.conversation_view = ConversationView::Thread;
            state.verse_search.clear();
            state.verse_results.clear();
            state.mode = Mode::Normal;
            None
        }
        AsyncResult::MessageSent {
            conversation_id,
            message,
        } => {
            state.finish();
            if let Some(thread) = state.thread.as_mut()
                && thread.id == conversation_id
            {
                thread.messages.push(message);
            }
            state.set_status("✓ Sent");
            None
        }
        AsyncResult::Support { thread } => {
            state.finish();
            state.support = Some(thread);
            None
        }
        AsyncResult::Rejected { message } => {
            state.finish();
            state.clear_status();
            state.alert = Some(message);
            None
        }
        AsyncResult::SessionExpired => {
            state.finish();
            session_expired(state)
        }
        AsyncResult::Error { message } => {
            state.finish();
            state.set_status(format!("❌ {message}"));
            None
        }
    }
}

/// Global logout after a 401
fn session_expired(state: &mut AppState) -> Option<AsyncCommand> {
    tracing::info!("Session expired");
    state.session.expire();
    state.sign_out();
    state.set_status("Session expired, please sign in again");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::auth::{MemoryStore, TokenStore};
    use crate::models::{PaginationMetadata, Verse, VersePage};

    fn state() -> AppState {
        let api = ApiClient::new(
            "http://127.0.0.1:3000/api/v1",
            Arc::new(MemoryStore::with_token("t")),
        );
        AppState::new(Config::default(), Session::new(api))
    }

    fn page() -> VersePage {
        VersePage {
            verses: vec![Verse {
                id: Some(7),
                book: "Psalms".to_string(),
                chapter: 46,
                verse: 10,
                text: "Be still, and know that I am God".to_string(),
                liked: false,
            }],
            pagination: PaginationMetadata {
                page: 1,
                pages: 1,
                next: None,
                prev: None,
                count: 1,
                items: 1,
                last: 1,
            },
        }
    }

    fn failed_page(state: &mut AppState) {
        let request = state.his_will.reload().expect("source is set");
        handle_async_result(
            state,
            AsyncResult::PageLoaded {
                slot: FeedSlot::HisWill,
                request,
                result: Err(ApiError::Malformed("missing verses".to_string())),
            },
        );
    }

    #[test]
    fn test_page_result_applies() {
        let mut state = state();
        let Some(AsyncCommand::LoadPage { slot, request }) = state.load_home() else {
            panic!("expected a page request");
        };
        handle_async_result(
            &mut state,
            AsyncResult::PageLoaded {
                slot,
                request,
                result: Ok(page()),
            },
        );
        assert_eq!(state.his_will.verses().len(), 1);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_failure_notice_after_threshold() {
        let mut state = state();
        state.load_home();

        failed_page(&mut state);
        failed_page(&mut state);
        assert!(state.status.is_empty());
        failed_page(&mut state);
        assert!(state.status.contains("3 attempts failed"));
    }

    #[test]
    fn test_unauthorized_page_signs_out() {
        let mut state = state();
        let Some(AsyncCommand::LoadPage { slot, request }) = state.load_home() else {
            panic!("expected a page request");
        };
        handle_async_result(
            &mut state,
            AsyncResult::PageLoaded {
                slot,
                request,
                result: Err(ApiError::Unauthorized),
            },
        );
        assert_eq!(state.screen, Screen::Auth(AuthScreen::Login));
        assert!(!state.session.is_signed_in());
        assert!(state.status.contains("Session expired"));
    }

    #[test]
    fn test_page_from_previous_session_is_ignored() {
        let mut state = state();
        let Some(AsyncCommand::LoadPage { request: old, .. }) = state.load_home() else {
            panic!("expected a page request");
        };

        session_expired(&mut state);
        state.session.api().tokens().save("fresh").unwrap();
        let Some(AsyncCommand::LoadPage { request: current, .. }) =
            handle_async_result(&mut state, AsyncResult::SignedIn { user: None })
        else {
            panic!("expected a page request after signing in");
        };
        assert_ne!(old.generation(), current.generation());

        // The old session's 401 arrives late
        handle_async_result(
            &mut state,
            AsyncResult::PageLoaded {
                slot: FeedSlot::HisWill,
                request: old,
                result: Err(ApiError::Unauthorized),
            },
        );
        assert_eq!(state.screen, Screen::Main);
        assert!(state.session.is_signed_in());
        assert!(state.his_will.is_loading());

        handle_async_result(
            &mut state,
            AsyncResult::PageLoaded {
                slot: FeedSlot::HisWill,
                request: current,
                result: Ok(page()),
            },
        );
        assert_eq!(state.his_will.verses().len(), 1);
    }

    #[test]
    fn test_reopened_liked_card_ignores_old_like() {
        let mut state = state();
        state.liked = page().verses;
        state.open_liked();
        let request = state
            .liked_feed
            .as_mut()
            .and_then(|feed| feed.toggle_like(0))
            .unwrap();

        state.liked_feed = None;
        state.open_liked();
        handle_async_result(
            &mut state,
            AsyncResult::LikeToggled {
                slot: FeedSlot::Liked,
                request,
                result: Err(ApiError::Status {
                    status: 500,
                    message: "boom".to_string(),
                }),
            },
        );
        let feed = state.liked_feed.as_ref().unwrap();
        assert!(!feed.verses()[0].liked);
    }

    #[test]
    fn test_like_failure_rolls_back() {
        let mut state = state();
        let Some(AsyncCommand::LoadPage { slot, request }) = state.load_home() else {
            panic!("expected a page request");
        };
        handle_async_result(
            &mut state,
            AsyncResult::PageLoaded {
                slot,
                request,
                result: Ok(page()),
            },
        );

        let request = state.his_will.toggle_like(0).unwrap();
        assert!(state.his_will.verses()[0].liked);
        handle_async_result(
            &mut state,
            AsyncResult::LikeToggled {
                slot: FeedSlot::HisWill,
                request,
                result: Err(ApiError::Status {
                    status: 500,
                    message: "boom".to_string(),
                }),
            },
        );
        assert!(!state.his_will.verses()[0].liked);
        assert!(state.status.contains("restored"));
    }

    #[test]
    fn test_rejected_login_shows_alert() {
        let mut state = state();
        state.pending = 1;
        handle_async_result(
            &mut state,
            AsyncResult::Rejected {
                message: "Login failed: Invalid email or password".to_string(),
            },
        );
        assert_eq!(
            state.alert.as_deref(),
            Some("Login failed: Invalid email or password")
        );
        assert_eq!(state.pending, 0);
    }

    #[test]
    fn test_reset_flow_moves_through_screens() {
        let mut state = state();
        handle_async_result(
            &mut state,
            AsyncResult::ResetRequested {
                email: "a@b.co".to_string(),
            },
        );
        assert_eq!(state.screen, Screen::Auth(AuthScreen::ResetCode));

        handle_async_result(
            &mut state,
            AsyncResult::CodeVerified {
                code: "123".to_string(),
            },
        );
        assert_eq!(state.screen, Screen::Auth(AuthScreen::ResetPassword));
        assert_eq!(state.reset_email, "a@b.co");

        handle_async_result(&mut state, AsyncResult::PasswordReset);
        assert_eq!(state.screen, Screen::Auth(AuthScreen::Login));
        assert!(state.reset_code.is_empty());
    }

    #[test]
    fn test_stale_user_results_are_dropped() {
        let mut state = state();
        state.user_search.set_query("jon", Instant::now());
        handle_async_result(
            &mut state,
            AsyncResult::UsersFound {
                query: "jo".to_string(),
                users: vec![crate::models::UserSummary {
                    id: 1,
                    username: None,
                    first_name: None,
                    last_name: None,
                    email: None,
                }],
            },
        );
        assert!(state.user_results.is_empty());
    }
}
