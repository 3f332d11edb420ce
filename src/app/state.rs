//! Application state

use std::time::Instant;

use crate::auth::Session;
use crate::config::Config;
use crate::debounce::SearchDebouncer;
use crate::feed::{Feed, PageRequest};
use crate::models::{Category, Conversation, ConversationThread, User, UserSummary, Verse};
use crate::theme::Theme;
use crate::validation::Field;

use super::async_ops::AsyncCommand;
use super::form::Form;

/// Top-level tabs once signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    HisWill,
    YourChoice,
    Liked,
    Conversations,
    Support,
    Profile,
}

impl Tab {
    /// All tabs in display order
    pub const fn all() -> &'static [Self] {
        &[
            Self::HisWill,
            Self::YourChoice,
            Self::Liked,
            Self::Conversations,
            Self::Support,
            Self::Profile,
        ]
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::HisWill => "His Will",
            Self::YourChoice => "Your Choice",
            Self::Liked => "Liked",
            Self::Conversations => "Conversations",
            Self::Support => "Support",
            Self::Profile => "Profile",
        }
    }

    fn position(self) -> usize {
        Self::all().iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        all[(self.position() + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all = Self::all();
        all[(self.position() + all.len() - 1) % all.len()]
    }

    /// Tab for a `1`-`6` shortcut
    pub fn from_digit(c: char) -> Option<Self> {
        let index = c.to_digit(10)?.checked_sub(1)? as usize;
        Self::all().get(index).copied()
    }
}

/// Signed-out screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    SignUp,
    /// Ask for a reset code
    ResetRequest,
    /// Enter the emailed code
    ResetCode,
    /// Choose the new password
    ResetPassword,
}

impl AuthScreen {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::SignUp => "Create account",
            Self::ResetRequest => "Reset password",
            Self::ResetCode => "Enter reset code",
            Self::ResetPassword => "Choose a new password",
        }
    }

    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::Login => &[Field::Email, Field::Password],
            Self::SignUp => &[Field::Email, Field::Password, Field::PasswordConfirmation],
            Self::ResetRequest => &[Field::Email],
            Self::ResetCode => &[Field::Code],
            Self::ResetPassword => &[Field::Password, Field::PasswordConfirmation],
        }
    }
}

/// What fills the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth(AuthScreen),
    Main,
}

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Help,
    ThemePicker,
    CategoryPicker,
    /// Keystrokes go to the active tab's text input
    Editing,
}

/// Which feed a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSlot {
    HisWill,
    YourChoice,
    /// Static feed opened from the liked list
    Liked,
}

/// Sub-screen of the conversations tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationView {
    #[default]
    List,
    FindUser,
    Thread,
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Shared session (token store + API client)
    pub session: Session,
    /// Whether to quit
    pub should_quit: bool,
    /// Current theme
    pub theme: Theme,
    /// Auth gate or main tabs
    pub screen: Screen,
    /// Active tab
    pub tab: Tab,
    /// Input mode
    pub mode: Mode,
    /// Selected theme in the picker
    pub theme_picker_index: usize,
    /// Blocking message (auth, signup and profile failures)
    pub alert: Option<String>,

    /// Form of the current auth screen
    pub auth_form: Form,
    /// Email carried through the reset flow
    pub reset_email: String,
    /// Verified code carried to the last reset step
    pub reset_code: String,

    /// Home feed over the `his_will` category
    pub his_will: Feed,
    /// Feed for the picked category
    pub your_choice: Feed,
    /// Picked category
    pub category: Option<Category>,
    /// Filter typed in the category picker
    pub category_filter: String,
    /// Selection in the filtered category list
    pub category_index: usize,

    /// Liked verses
    pub liked: Vec<Verse>,
    /// Selection in the liked list
    pub liked_index: usize,
    /// Liked verses opened as a card
    pub liked_feed: Option<Feed>,

    /// Conversations of the user
    pub conversations: Vec<Conversation>,
    /// Selection in the conversations list
    pub conversation_index: usize,
    /// Sub-screen
    pub conversation_view: ConversationView,
    /// Debounced user search
    pub user_search: SearchDebouncer,
    /// User search results
    pub user_results: Vec<UserSummary>,
    /// Selected user result
    pub user_index: usize,
    /// Open conversation
    pub thread: Option<ConversationThread>,
    /// Debounced verse search for composing
    pub verse_search: SearchDebouncer,
    /// Verse search results
    pub verse_results: Vec<Verse>,
    /// Selected verse result
    pub verse_index: usize,

    /// Support thread
    pub support: Option<ConversationThread>,
    /// Support message being typed
    pub support_input: String,

    /// Signed-in user
    pub user: Option<User>,
    /// Profile edit form
    pub profile_form: Form,

    /// Status message (bottom bar)
    pub status: String,
    /// Requests in flight besides page fetches
    pub pending: usize,

    /// Tick counter for animations
    tick: u64,
}

const PROFILE_FIELDS: &[Field] = &[
    Field::FirstName,
    Field::LastName,
    Field::Email,
    Field::Password,
    Field::PasswordConfirmation,
];

impl AppState {
    /// Create a new app state
    pub fn new(config: Config, session: Session) -> Self {
        let theme = config.theme;
        let screen = if session.is_signed_in() {
            Screen::Main
        } else {
            Screen::Auth(AuthScreen::Login)
        };
        let threshold = config.prefetch_threshold;
        let debounce = config.search_debounce();
        let min_chars = config.search_min_chars;
        let category = config.default_category();

        Self {
            config,
            session,
            should_quit: false,
            theme,
            screen,
            tab: Tab::HisWill,
            mode: Mode::Normal,
            theme_picker_index: 0,
            alert: None,
            auth_form: Form::new(AuthScreen::Login.fields()),
            reset_email: String::new(),
            reset_code: String::new(),
            his_will: Feed::new(0).with_prefetch_threshold(threshold),
            your_choice: Feed::new(0).with_prefetch_threshold(threshold),
            category,
            category_filter: String::new(),
            category_index: 0,
            liked: Vec::new(),
            liked_index: 0,
            liked_feed: None,
            conversations: Vec::new(),
            conversation_index: 0,
            conversation_view: ConversationView::List,
            user_search: SearchDebouncer::new(debounce, min_chars),
            user_results: Vec::new(),
            user_index: 0,
            thread: None,
            verse_search: SearchDebouncer::new(debounce, min_chars),
            verse_results: Vec::new(),
            verse_index: 0,
            support: None,
            support_input: String::new(),
            user: None,
            profile_form: Form::new(PROFILE_FIELDS),
            status: String::new(),
            pending: 0,
            tick: 0,
        }
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Get current tick
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status.clear();
    }

    /// Whether the spinner should run
    pub fn is_loading(&self) -> bool {
        self.pending > 0
            || self.his_will.is_loading()
            || self.your_choice.is_loading()
    }

    /// Count a request as in flight and pass it through
    pub fn begin(&mut self, command: AsyncCommand) -> Option<AsyncCommand> {
        self.pending += 1;
        Some(command)
    }

    /// Mark one request as finished
    pub fn finish(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    // ==================== Feeds ====================

    /// Feed behind a slot (the liked slot exists only while a card is open)
    pub fn feed_mut(&mut self, slot: FeedSlot) -> Option<&mut Feed> {
        match slot {
            FeedSlot::HisWill => Some(&mut self.his_will),
            FeedSlot::YourChoice => Some(&mut self.your_choice),
            FeedSlot::Liked => self.liked_feed.as_mut(),
        }
    }

    /// Feed shown on the active tab
    pub fn active_slot(&self) -> Option<FeedSlot> {
        match self.tab {
            Tab::HisWill => Some(FeedSlot::HisWill),
            Tab::YourChoice => Some(FeedSlot::YourChoice),
            Tab::Liked if self.liked_feed.is_some() => Some(FeedSlot::Liked),
            _ => None,
        }
    }

    /// Wrap a page request for the worker
    pub const fn page_command(slot: FeedSlot, request: PageRequest) -> AsyncCommand {
        AsyncCommand::LoadPage { slot, request }
    }

    /// Point the home feed at `his_will`
    pub fn load_home(&mut self) -> Option<AsyncCommand> {
        let url = Category::his_will().search_url(self.session.api().base_url());
        self.his_will
            .set_url(url)
            .map(|request| Self::page_command(FeedSlot::HisWill, request))
    }

    /// Show a category on the "Your Choice" tab
    pub fn choose_category(&mut self, category: Category) -> Option<AsyncCommand> {
        let url = category.search_url(self.session.api().base_url());
        self.set_status(format!("Showing {}", category.display_name()));
        self.category = Some(category);
        self.your_choice
            .set_url(url)
            .map(|request| Self::page_command(FeedSlot::YourChoice, request))
    }

    /// Categories matching the picker filter
    pub fn filtered_categories(&self) -> Vec<Category> {
        let filter = self.category_filter.trim().to_lowercase().replace(' ', "_");
        Category::all()
            .into_iter()
            .filter(|c| filter.is_empty() || c.slug().contains(&filter))
            .collect()
    }

    /// Open the liked list as a card starting at the selected verse
    pub fn open_liked(&mut self) {
        if self.liked.is_empty() {
            return;
        }
        let mut feed = Feed::new(self.liked_index);
        feed.set_verses(self.liked.clone());
        self.liked_feed = Some(feed);
    }

    // ==================== Session ====================

    /// Enter the main screen after signing in
    pub fn enter_main(&mut self, user: Option<User>) -> Option<AsyncCommand> {
        self.screen = Screen::Main;
        self.mode = Mode::Normal;
        self.tab = Tab::HisWill;
        self.auth_form = Form::new(AuthScreen::Login.fields());
        if let Some(user) = user {
            self.set_user(user);
        }
        self.load_home()
    }

    /// Show an auth screen with an empty form
    pub fn show_auth(&mut self, screen: AuthScreen) {
        self.screen = Screen::Auth(screen);
        self.mode = Mode::Normal;
        self.auth_form = Form::new(screen.fields());
    }

    /// Drop everything tied to the signed-in user and return to login
    pub fn sign_out(&mut self) {
        let fresh = Self::new(self.config.clone(), self.session.clone());
        let theme = self.theme;
        let status = std::mem::take(&mut self.status);
        *self = fresh;
        self.theme = theme;
        self.status = status;
        self.show_auth(AuthScreen::Login);
    }

    /// Store the profile and prefill the edit form
    pub fn set_user(&mut self, user: User) {
        let form = &mut self.profile_form;
        form.reset();
        form.set(Field::FirstName, user.first_name.clone().unwrap_or_default());
        form.set(Field::LastName, user.last_name.clone().unwrap_or_default());
        form.set(Field::Email, user.email.clone().unwrap_or_default());
        self.user = Some(user);
    }

    // ==================== Tabs ====================

    /// Switch tab, returning the fetch the new tab needs
    pub fn switch_tab(&mut self, tab: Tab) -> Option<AsyncCommand> {
        self.tab = tab;
        self.mode = Mode::Normal;
        match tab {
            Tab::HisWill if self.his_will.shows_placeholder() => self.load_home(),
            Tab::YourChoice if self.your_choice.shows_placeholder() => {
                self.category.clone().and_then(|c| self.choose_category(c))
            }
            Tab::Liked => {
                self.liked_feed = None;
                self.begin(AsyncCommand::FetchLiked)
            }
            Tab::Conversations => {
                self.conversation_view = ConversationView::List;
                self.begin(AsyncCommand::FetchConversations)
            }
            Tab::Support => self.begin(AsyncCommand::FetchSupport),
            Tab::Profile => self.begin(AsyncCommand::FetchProfile),
            _ => None,
        }
    }

    // ==================== Lists ====================

    /// Move a list selection, clamped to `len`
    pub fn step(index: &mut usize, len: usize, forward: bool) {
        if len == 0 {
            *index = 0;
        } else if forward {
            *index = (*index + 1).min(len - 1);
        } else {
            *index = index.saturating_sub(1);
        }
    }

    /// Release debounced searches whose quiet period has passed
    pub fn poll_searches(&mut self, now: Instant) -> Option<AsyncCommand> {
        if self.tab != Tab::Conversations {
            return None;
        }
        match self.conversation_view {
            ConversationView::FindUser => self
                .user_search
                .poll(now)
                .map(|query| AsyncCommand::SearchUsers { query }),
            ConversationView::Thread => self
                .verse_search
                .poll(now)
                .map(|query| AsyncCommand::SearchVerses { query }),
            ConversationView::List => None,
        }
    }
}
