//! Event handling

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::state::{AppState, AuthScreen, ConversationView, FeedSlot, Mode, Screen, Tab};
use crate::models::ProfileUpdate;
use crate::theme::Theme;
use crate::validation::{self, Field};

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return None;
    }

    // Alerts swallow the next key
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
            state.alert = None;
        }
        return None;
    }

    match state.mode {
        Mode::ThemePicker => {
            handle_theme_picker_key(state, key);
            return None;
        }
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::CategoryPicker => return handle_category_picker_key(state, key),
        Mode::Editing | Mode::Normal => {}
    }

    match state.screen {
        Screen::Auth(screen) => handle_auth_key(state, screen, key),
        Screen::Main if state.mode == Mode::Editing => handle_editing_key(state, key),
        Screen::Main => handle_main_key(state, key),
    }
}

// ==================== Auth ====================

fn handle_auth_key(state: &mut AppState, screen: AuthScreen, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
            let next = if screen == AuthScreen::SignUp {
                AuthScreen::Login
            } else {
                AuthScreen::SignUp
            };
            state.show_auth(next);
            None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
            state.show_auth(AuthScreen::ResetRequest);
            None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => {
            open_theme_picker(state);
            None
        }
        (_, KeyCode::Esc) => {
            if screen == AuthScreen::Login {
                state.should_quit = true;
            } else {
                state.show_auth(AuthScreen::Login);
            }
            None
        }
        (_, KeyCode::Tab | KeyCode::Down) => {
            state.auth_form.focus_next();
            None
        }
        (_, KeyCode::BackTab | KeyCode::Up) => {
            state.auth_form.focus_prev();
            None
        }
        (_, KeyCode::Backspace) => {
            state.auth_form.pop();
            None
        }
        (_, KeyCode::Enter) => submit_auth(state, screen),
        (_, KeyCode::Char(c)) => {
            state.auth_form.push(c);
            None
        }
        _ => None,
    }
}

fn submit_auth(state: &mut AppState, screen: AuthScreen) -> Option<AsyncCommand> {
    let form = &mut state.auth_form;
    let email = form.value(Field::Email).trim().to_string();
    let password = form.value(Field::Password).to_string();
    let confirmation = form.value(Field::PasswordConfirmation).to_string();
    let code = form.value(Field::Code).trim().to_string();

    let command = match screen {
        AuthScreen::Login => form
            .validate(|_| validation::login(&email, &password))
            .then(|| AsyncCommand::Login { email, password }),
        AuthScreen::SignUp => form
            .validate(|_| validation::signup(&email, &password, &confirmation))
            .then(|| AsyncCommand::Signup {
                email,
                password,
                confirmation,
            }),
        AuthScreen::ResetRequest => form
            .validate(|_| validation::reset_request(&email))
            .then(|| AsyncCommand::RequestReset { email }),
        AuthScreen::ResetCode => form
            .validate(|_| validation::reset_code(&code))
            .then(|| AsyncCommand::VerifyCode {
                email: state.reset_email.clone(),
                code,
            }),
        AuthScreen::ResetPassword => form
            .validate(|_| validation::new_password(&password, &confirmation))
            .then(|| AsyncCommand::ResetPassword {
                email: state.reset_email.clone(),
                code: state.reset_code.clone(),
                password,
                confirmation,
            }),
    }?;

    state.set_status("Please wait...");
    state.begin(command)
}

// ==================== Main screen ====================

fn handle_main_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            return None;
        }
        (_, KeyCode::Char('?') | KeyCode::F(1)) => {
            state.mode = Mode::Help;
            return None;
        }
        (_, KeyCode::Char('t')) => {
            open_theme_picker(state);
            return None;
        }
        (_, KeyCode::Tab) => return state.switch_tab(state.tab.next()),
        (_, KeyCode::BackTab) => return state.switch_tab(state.tab.prev()),
        (_, KeyCode::Char(c)) if c.is_ascii_digit() => {
            return Tab::from_digit(c).and_then(|tab| state.switch_tab(tab));
        }
        _ => {}
    }

    if let Some(slot) = state.active_slot() {
        return handle_feed_key(state, slot, key);
    }

    match state.tab {
        Tab::Liked => handle_liked_list_key(state, key),
        Tab::Conversations => handle_conversations_key(state, key),
        Tab::Support => handle_support_key(state, key),
        Tab::Profile => handle_profile_key(state, key),
        Tab::HisWill | Tab::YourChoice => None,
    }
}

fn handle_feed_key(state: &mut AppState, slot: FeedSlot, key: KeyEvent) -> Option<AsyncCommand> {
    if slot == FeedSlot::YourChoice && key.code == KeyCode::Char('c') {
        state.category_filter.clear();
        state.category_index = 0;
        state.mode = Mode::CategoryPicker;
        return None;
    }
    if slot == FeedSlot::Liked && key.code == KeyCode::Esc {
        state.liked_feed = None;
        return None;
    }

    let feed = state.feed_mut(slot)?;
    match key.code {
        KeyCode::Right | KeyCode::Char('l' | 'j') | KeyCode::Down => feed
            .next()
            .map(|request| AppState::page_command(slot, request)),
        KeyCode::Left | KeyCode::Char('h' | 'k') | KeyCode::Up => feed
            .prev()
            .map(|request| AppState::page_command(slot, request)),
        KeyCode::Char('g') => feed
            .on_visible_index_change(0)
            .map(|request| AppState::page_command(slot, request)),
        KeyCode::Char(' ' | 'L') | KeyCode::Enter => {
            let index = feed.index();
            let request = feed.toggle_like(index)?;
            let liked = request.liked();
            state.set_status(if liked { "♥ Liked" } else { "♡ Unliked" });
            Some(AsyncCommand::ToggleLike { slot, request })
        }
        KeyCode::Char('r') => {
            let request = feed.reload();
            if request.is_some() {
                state.set_status("Refreshing...");
            }
            request.map(|request| AppState::page_command(slot, request))
        }
        KeyCode::Char('s') => {
            let text = feed.current().map(crate::models::Verse::share_text)?;
            state.set_status(text);
            None
        }
        KeyCode::Esc => {
            state.clear_status();
            None
        }
        _ => None,
    }
}

fn handle_liked_list_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    let len = state.liked.len();
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            AppState::step(&mut state.liked_index, len, true);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            AppState::step(&mut state.liked_index, len, false);
            None
        }
        KeyCode::Enter => {
            state.open_liked();
            None
        }
        KeyCode::Char('r') => state.begin(AsyncCommand::FetchLiked),
        _ => None,
    }
}

fn handle_conversations_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match state.conversation_view {
        ConversationView::List => {
            let len = state.conversations.len();
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    AppState::step(&mut state.conversation_index, len, true);
                    None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    AppState::step(&mut state.conversation_index, len, false);
                    None
                }
                KeyCode::Char('n') => {
                    state.conversation_view = ConversationView::FindUser;
                    state.user_search.clear();
                    state.user_results.clear();
                    state.user_index = 0;
                    state.mode = Mode::Editing;
                    None
                }
                KeyCode::Char('r') => state.begin(AsyncCommand::FetchConversations),
                KeyCode::Enter => {
                    let other_user_id = state
                        .conversations
                        .get(state.conversation_index)?
                        .other_user_id?;
                    state.begin(AsyncCommand::OpenConversation { other_user_id })
                }
                _ => None,
            }
        }
        ConversationView::FindUser => match key.code {
            KeyCode::Esc => {
                state.conversation_view = ConversationView::List;
                None
            }
            KeyCode::Char('/' | 'i') => {
                state.mode = Mode::Editing;
                None
            }
            _ => None,
        },
        ConversationView::Thread => match key.code {
            KeyCode::Esc => {
                state.thread = None;
                state.conversation_view = ConversationView::List;
                state.begin(AsyncCommand::FetchConversations)
            }
            KeyCode::Char('/' | 'i') => {
                state.mode = Mode::Editing;
                None
            }
            _ => None,
        },
    }
}

fn handle_support_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('i' | '/') => {
            state.mode = Mode::Editing;
            None
        }
        KeyCode::Char('r') => state.begin(AsyncCommand::FetchSupport),
        _ => None,
    }
}

fn handle_profile_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('e') | KeyCode::Enter => {
            state.mode = Mode::Editing;
            None
        }
        KeyCode::Char('L') => {
            state.set_status("Signing out...");
            state.begin(AsyncCommand::Logout)
        }
        KeyCode::Char('r') => state.begin(AsyncCommand::FetchProfile),
        _ => None,
    }
}

// ==================== Editing ====================

fn handle_editing_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.code == KeyCode::Esc {
        state.mode = Mode::Normal;
        if state.tab == Tab::Conversations && state.conversation_view == ConversationView::FindUser {
            state.conversation_view = ConversationView::List;
        }
        return None;
    }

    let now = Instant::now();
    match state.tab {
        Tab::Conversations => match state.conversation_view {
            ConversationView::FindUser => edit_user_search(state, key, now),
            ConversationView::Thread => edit_verse_search(state, key, now),
            ConversationView::List => {
                state.mode = Mode::Normal;
                None
            }
        },
        Tab::Support => edit_support(state, key),
        Tab::Profile => edit_profile(state, key),
        _ => {
            state.mode = Mode::Normal;
            None
        }
    }
}

fn edit_user_search(state: &mut AppState, key: KeyEvent, now: Instant) -> Option<AsyncCommand> {
    let len = state.user_results.len();
    match key.code {
        KeyCode::Down => AppState::step(&mut state.user_index, len, true),
        KeyCode::Up => AppState::step(&mut state.user_index, len, false),
        KeyCode::Backspace => state.user_search.pop(now),
        KeyCode::Char(c) => state.user_search.push(c, now),
        KeyCode::Enter => {
            let other_user_id = state.user_results.get(state.user_index)?.id;
            state.mode = Mode::Normal;
            return state.begin(AsyncCommand::OpenConversation { other_user_id });
        }
        _ => {}
    }
    if state.user_search.is_too_short() {
        state.user_results.clear();
        state.user_index = 0;
    }
    None
}

fn edit_verse_search(state: &mut AppState, key: KeyEvent, now: Instant) -> Option<AsyncCommand> {
    let len = state.verse_results.len();
    match key.code {
        KeyCode::Down => AppState::step(&mut state.verse_index, len, true),
        KeyCode::Up => AppState::step(&mut state.verse_index, len, false),
        KeyCode::Backspace => state.verse_search.pop(now),
        KeyCode::Char(c) => state.verse_search.push(c, now),
        KeyCode::Enter => {
            let body = state.verse_results.get(state.verse_index)?.share_text();
            let conversation_id = state.thread.as_ref()?.id;
            state.verse_search.clear();
            state.verse_results.clear();
            state.verse_index = 0;
            state.mode = Mode::Normal;
            return state.begin(AsyncCommand::SendMessage {
                conversation_id,
                body,
            });
        }
        _ => {}
    }
    if state.verse_search.is_too_short() {
        state.verse_results.clear();
        state.verse_index = 0;
    }
    None
}

fn edit_support(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Backspace => {
            state.support_input.pop();
            None
        }
        KeyCode::Char(c) => {
            state.support_input.push(c);
            None
        }
        KeyCode::Enter => {
            let body = state.support_input.trim().to_string();
            if body.is_empty() {
                return None;
            }
            let conversation_id = state.support.as_ref()?.id;
            state.support_input.clear();
            state.mode = Mode::Normal;
            state.begin(AsyncCommand::SendSupport {
                conversation_id,
                body,
            })
        }
        _ => None,
    }
}

fn edit_profile(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    let form = &mut state.profile_form;
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.pop(),
        KeyCode::Char(c) => form.push(c),
        KeyCode::Enter => {
            let first_name = form.value(Field::FirstName).trim().to_string();
            let last_name = form.value(Field::LastName).trim().to_string();
            let email = form.value(Field::Email).trim().to_string();
            let password = form.value(Field::Password).to_string();
            let confirmation = form.value(Field::PasswordConfirmation).to_string();

            if !form.validate(|_| validation::profile(&first_name, &last_name, &password, &confirmation)) {
                return None;
            }

            let new_password = (!password.is_empty()).then_some(password.as_str());
            let update = ProfileUpdate::new(&first_name, &last_name, &email, new_password);
            state.mode = Mode::Normal;
            state.set_status("Saving profile...");
            return state.begin(AsyncCommand::UpdateProfile { update });
        }
        _ => {}
    }
    None
}

// ==================== Pickers ====================

fn open_theme_picker(state: &mut AppState) {
    state.theme_picker_index = Theme::all()
        .iter()
        .position(|t| *t == state.theme.inner())
        .unwrap_or(0);
    state.mode = Mode::ThemePicker;
}

fn handle_category_picker_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    let len = state.filtered_categories().len();
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            None
        }
        KeyCode::Enter => {
            let category = state.filtered_categories().into_iter().nth(state.category_index)?;
            state.mode = Mode::Normal;
            state.choose_category(category)
        }
        KeyCode::Down => {
            AppState::step(&mut state.category_index, len, true);
            None
        }
        KeyCode::Up => {
            AppState::step(&mut state.category_index, len, false);
            None
        }
        KeyCode::Backspace => {
            state.category_filter.pop();
            state.category_index = 0;
            None
        }
        KeyCode::Char(c) => {
            state.category_filter.push(c);
            state.category_index = 0;
            None
        }
        _ => None,
    }
}

fn handle_theme_picker_key(state: &mut AppState, key: KeyEvent) {
    let themes = Theme::all();
    let len = themes.len();

    match key.code {
        KeyCode::Esc => {
            // Cancel - restore the saved theme
            state.theme = state.config.theme;
            state.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            let selected_theme = Theme::from(themes[state.theme_picker_index]);
            state.theme = selected_theme;
            state.config.theme = selected_theme;

            state.mode = Mode::Normal;
            state.set_status(format!("✓ Theme set to {}", selected_theme.name()));
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.theme_picker_index = (state.theme_picker_index + 1) % len;
            // Preview theme
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.theme_picker_index = state.theme_picker_index.checked_sub(1).unwrap_or(len - 1);
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::Home | KeyCode::Char('g') => {
            state.theme_picker_index = 0;
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::End | KeyCode::Char('G') => {
            state.theme_picker_index = len - 1;
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::{MemoryStore, Session};
    use crate::config::Config;
    use crate::models::{PaginationMetadata, Verse, VersePage};
    use std::sync::Arc;

    fn state(token: Option<&str>) -> AppState {
        let store = token.map_or_else(MemoryStore::new, MemoryStore::with_token);
        let api = ApiClient::new("http://127.0.0.1:3000/api/v1", Arc::new(store));
        AppState::new(Config::default(), Session::new(api))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(state, key(KeyCode::Char(c)));
        }
    }

    fn loaded_home(state: &mut AppState) {
        let Some(AsyncCommand::LoadPage { request, .. }) = state.load_home() else {
            panic!("expected a page request");
        };
        let verses = (1..=3)
            .map(|id| Verse {
                id: Some(id),
                book: "John".to_string(),
                chapter: 3,
                verse: id as u32,
                text: "For God so loved the world".to_string(),
                liked: false,
            })
            .collect();
        let page = VersePage {
            verses,
            pagination: PaginationMetadata {
                page: 1,
                pages: 1,
                next: None,
                prev: None,
                count: 3,
                items: 3,
                last: 1,
            },
        };
        state
            .his_will
            .complete_load(&request, Ok::<_, crate::api::ApiError>(page));
    }

    #[test]
    fn test_login_validation_blocks_submit() {
        let mut state = state(None);
        type_text(&mut state, "a@b.co");
        assert!(handle_key(&mut state, key(KeyCode::Enter)).is_none());
        assert!(state.auth_form.errors().get(Field::Password).is_some());
    }

    #[test]
    fn test_login_submits_credentials() {
        let mut state = state(None);
        type_text(&mut state, "a@b.co");
        handle_key(&mut state, key(KeyCode::Tab));
        type_text(&mut state, "secret");

        let command = handle_key(&mut state, key(KeyCode::Enter));
        assert!(matches!(
            command,
            Some(AsyncCommand::Login { ref email, ref password }) if email == "a@b.co" && password == "secret"
        ));
    }

    #[test]
    fn test_ctrl_n_switches_to_signup() {
        let mut state = state(None);
        handle_key(&mut state, KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert_eq!(state.screen, Screen::Auth(AuthScreen::SignUp));
    }

    #[test]
    fn test_reset_code_carries_email() {
        let mut state = state(None);
        state.reset_email = "a@b.co".to_string();
        state.show_auth(AuthScreen::ResetCode);
        type_text(&mut state, "123456");

        let command = handle_key(&mut state, key(KeyCode::Enter));
        assert!(matches!(
            command,
            Some(AsyncCommand::VerifyCode { ref email, ref code }) if email == "a@b.co" && code == "123456"
        ));
    }

    #[test]
    fn test_like_key_flips_optimistically() {
        let mut state = state(Some("t"));
        loaded_home(&mut state);

        let command = handle_key(&mut state, key(KeyCode::Char(' ')));
        let Some(AsyncCommand::ToggleLike { slot, request }) = command else {
            panic!("expected a like request");
        };
        assert_eq!(slot, FeedSlot::HisWill);
        assert_eq!(request.verse_id, 1);
        assert!(state.his_will.verses()[0].liked);
    }

    #[test]
    fn test_arrow_keys_move_card() {
        let mut state = state(Some("t"));
        loaded_home(&mut state);

        handle_key(&mut state, key(KeyCode::Right));
        handle_key(&mut state, key(KeyCode::Right));
        handle_key(&mut state, key(KeyCode::Right));
        assert_eq!(state.his_will.index(), 2);
        handle_key(&mut state, key(KeyCode::Left));
        assert_eq!(state.his_will.index(), 1);
    }

    #[test]
    fn test_category_picker_loads_feed() {
        let mut state = state(Some("t"));
        state.switch_tab(Tab::YourChoice);
        handle_key(&mut state, key(KeyCode::Char('c')));
        assert_eq!(state.mode, Mode::CategoryPicker);

        type_text(&mut state, "anxi");
        let command = handle_key(&mut state, key(KeyCode::Enter));
        let Some(AsyncCommand::LoadPage { slot, request }) = command else {
            panic!("expected a page request");
        };
        assert_eq!(slot, FeedSlot::YourChoice);
        assert!(request.url.ends_with("category=anxiety"));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_profile_requires_matching_passwords() {
        let mut state = state(Some("t"));
        state.tab = Tab::Profile;
        state.profile_form.set(Field::FirstName, "Ann");
        state.profile_form.set(Field::LastName, "Lee");
        state.profile_form.set(Field::Password, "newpass");
        state.mode = Mode::Editing;

        assert!(handle_key(&mut state, key(KeyCode::Enter)).is_none());
        assert!(state.profile_form.errors().get(Field::PasswordConfirmation).is_some());

        state.profile_form.set(Field::PasswordConfirmation, "newpass");
        let command = handle_key(&mut state, key(KeyCode::Enter));
        assert!(matches!(
            command,
            Some(AsyncCommand::UpdateProfile { ref update }) if update.new_password.as_deref() == Some("newpass")
        ));
    }

    #[test]
    fn test_alert_swallows_keys() {
        let mut state = state(Some("t"));
        state.alert = Some("Login failed".to_string());
        assert!(handle_key(&mut state, key(KeyCode::Char('q'))).is_none());
        assert!(!state.should_quit);
        handle_key(&mut state, key(KeyCode::Enter));
        assert!(state.alert.is_none());
    }
}
