//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use super::form::Form;
use super::state::{AppState, AuthScreen, ConversationView, Mode, Screen, Tab};
use crate::feed::{Feed, FeedPhase};
use crate::models::ConversationThread;
use crate::theme::{Theme, ThemeColors};

/// Serenity icon
const ICON: &str = "✝";

/// Prompt shown on "Your Choice" before a category is picked
pub const PLACEHOLDER: &str = "Search for the LORD and for his strength...";

/// Spinner animation frames
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function
pub fn render(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();

    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs / title
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    match state.screen {
        Screen::Auth(screen) => {
            render_title(frame, state, chunks[0]);
            render_auth(frame, state, screen, chunks[1]);
        }
        Screen::Main => {
            render_tabs(frame, state, chunks[0]);
            render_main(frame, state, chunks[1]);
        }
    }
    render_status_bar(frame, state, chunks[2]);

    match state.mode {
        Mode::Help => render_help_popup(frame, state),
        Mode::ThemePicker => render_theme_picker(frame, state),
        Mode::CategoryPicker => render_category_picker(frame, state),
        Mode::Normal | Mode::Editing => {}
    }

    if let Some(message) = &state.alert {
        render_alert(frame, state, message);
    }
}

fn spinner(state: &AppState) -> &'static str {
    SPINNER[(state.current_tick() / 2) as usize % SPINNER.len()]
}

fn rounded_block<'a>(title: impl Into<Line<'a>>, focused: bool, colors: &ThemeColors) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            colors.block_focus()
        } else {
            colors.block()
        })
        .title(title)
        .title_style(colors.text_primary())
}

fn render_title(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let title = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {ICON} Serenity "), colors.logo_style_primary()),
        Span::styled(" verses for every day", colors.text_muted()),
    ]))
    .block(rounded_block("", false, &colors));
    frame.render_widget(title, area);
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let marker = if *tab == state.tab { "●" } else { "○" };
            Line::from(format!("{marker} {} {}", i + 1, tab.title()))
        })
        .collect();

    let selected = Tab::all().iter().position(|t| *t == state.tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(format!(" {ICON} Serenity "))
                .title_style(colors.logo_style_primary()),
        )
        .select(selected)
        .style(colors.tab())
        .highlight_style(colors.tab_active())
        .divider(Span::styled(" │ ", colors.text_muted()));

    frame.render_widget(tabs, area);
}

fn render_main(frame: &mut Frame, state: &AppState, area: Rect) {
    match state.tab {
        Tab::HisWill => render_feed(frame, state, &state.his_will, area, " 🕊 His Will ", None),
        Tab::YourChoice => {
            let title = state.category.as_ref().map_or_else(
                || " 🔎 Your Choice ".to_string(),
                |c| format!(" 🔎 Your Choice: {} ", c.display_name()),
            );
            render_feed(frame, state, &state.your_choice, area, &title, Some(PLACEHOLDER));
        }
        Tab::Liked => match &state.liked_feed {
            Some(feed) => render_feed(frame, state, feed, area, " ♥ Liked ", None),
            None => render_liked_list(frame, state, area),
        },
        Tab::Conversations => render_conversations(frame, state, area),
        Tab::Support => render_support(frame, state, area),
        Tab::Profile => render_profile(frame, state, area),
    }
}

// ==================== Feed card ====================

fn render_feed(
    frame: &mut Frame,
    state: &AppState,
    feed: &Feed,
    area: Rect,
    title: &str,
    placeholder: Option<&str>,
) {
    let colors = state.theme.colors();
    let block = rounded_block(title.to_string(), true, &colors);
    let inner_width = area.width.saturating_sub(8).max(10) as usize;

    let mut lines = Vec::new();
    let vertical_pad = area.height.saturating_sub(10) / 2;
    for _ in 0..vertical_pad {
        lines.push(Line::from(""));
    }

    match (feed.phase(), feed.current()) {
        (FeedPhase::Empty, _) => {
            lines.push(Line::styled(
                placeholder.unwrap_or("Nothing to show yet"),
                colors.text_dim().add_modifier(Modifier::ITALIC),
            ));
            if placeholder.is_some() {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("Press ", colors.text_muted()),
                    Span::styled("c", colors.key_hint()),
                    Span::styled(" to pick a category", colors.text_muted()),
                ]));
            }
        }
        (FeedPhase::Loading, _) => {
            lines.push(Line::styled(
                format!("{} Loading verses...", spinner(state)),
                colors.text_secondary(),
            ));
        }
        (_, None) => {
            let message = if feed.consecutive_failures() > 0 {
                "Could not load verses. Press r to retry"
            } else {
                "No verses found"
            };
            lines.push(Line::styled(message, colors.text_muted()));
        }
        (phase, Some(verse)) => {
            for row in textwrap::wrap(&verse.text, inner_width) {
                lines.push(Line::styled(row.into_owned(), colors.text()));
            }
            lines.push(Line::from(""));

            let heart = if verse.liked {
                Span::styled("♥", colors.liked())
            } else {
                Span::styled("♡", colors.text_muted())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{}  ", verse.reference()), colors.reference()),
                heart,
            ]));
            lines.push(Line::from(""));

            let mut position = format!("{} / {}", feed.index() + 1, feed.verses().len());
            if let Some(pagination) = feed.pagination()
                && pagination.count > 0
            {
                position.push_str(&format!(" of {}", pagination.count));
            }
            let mut footer = vec![Span::styled(position, colors.text_muted())];
            if phase == FeedPhase::LoadingMore {
                footer.push(Span::styled(format!("  {}", spinner(state)), colors.text_secondary()));
            }
            lines.push(Line::from(footer));
        }
    }

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(card, area);
}

// ==================== Liked ====================

fn render_liked_list(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    if state.liked.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::styled("  No liked verses yet", colors.text_muted()),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Press ", colors.text_dim()),
                Span::styled("Space", colors.key_hint()),
                Span::styled(" on any verse to like it", colors.text_dim()),
            ]),
        ])
        .block(rounded_block(" ♥ Liked ", true, &colors));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .liked
        .iter()
        .map(|verse| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<10}", verse.short_reference()), colors.reference()),
                Span::styled(verse.preview(), colors.text()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(rounded_block(
            format!(" ♥ Liked ({}) ", state.liked.len()),
            true,
            &colors,
        ))
        .highlight_style(colors.selected())
        .highlight_symbol("▸");

    let mut list_state = ListState::default().with_selected(Some(state.liked_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

// ==================== Conversations ====================

fn render_conversations(frame: &mut Frame, state: &AppState, area: Rect) {
    match state.conversation_view {
        ConversationView::List => render_conversation_list(frame, state, area),
        ConversationView::FindUser => render_find_user(frame, state, area),
        ConversationView::Thread => render_thread_view(frame, state, area),
    }
}

fn render_conversation_list(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    if state.conversations.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::styled("  No conversations yet", colors.text_muted()),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Press ", colors.text_dim()),
                Span::styled("n", colors.key_hint()),
                Span::styled(" to start one", colors.text_dim()),
            ]),
        ])
        .block(rounded_block(" 💬 Conversations ", true, &colors));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .conversations
        .iter()
        .map(|conversation| {
            let mut lines = vec![Line::styled(
                format!(" {}", conversation.title()),
                colors.text_primary(),
            )];
            if let Some(last) = &conversation.last_message {
                lines.push(Line::styled(format!("   {}", last.preview()), colors.text_dim()));
                if let Some(time) = last.time() {
                    lines.push(Line::styled(format!("   {time}"), colors.text_muted()));
                }
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(rounded_block(
            format!(" 💬 Conversations ({}) ", state.conversations.len()),
            true,
            &colors,
        ))
        .highlight_style(colors.selected())
        .highlight_symbol("▸");

    let mut list_state = ListState::default().with_selected(Some(state.conversation_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_search_input(frame: &mut Frame, state: &AppState, area: Rect, label: &str, query: &str) {
    let colors = state.theme.colors();
    let editing = state.mode == Mode::Editing;
    let cursor = if editing { "█" } else { "" };
    let input = Paragraph::new(Line::from(vec![
        Span::styled(" 🔍 ", colors.text_muted()),
        Span::styled(query.to_string(), colors.text()),
        Span::styled(cursor, colors.text_primary()),
    ]))
    .block(rounded_block(label.to_string(), editing, &colors));
    frame.render_widget(input, area);
}

fn render_find_user(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_search_input(
        frame,
        state,
        chunks[0],
        " New conversation: search users ",
        state.user_search.query(),
    );

    let items: Vec<ListItem> = if state.user_search.is_too_short() {
        vec![ListItem::new(Line::styled(
            "  Type at least 2 characters",
            colors.text_muted(),
        ))]
    } else {
        state
            .user_results
            .iter()
            .map(|user| {
                let handle = user
                    .username
                    .as_deref()
                    .or(user.email.as_deref())
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {}", user.display_name()), colors.text()),
                    Span::styled(format!("  {handle}"), colors.text_muted()),
                ]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(rounded_block(" Results ", false, &colors))
        .highlight_style(colors.selected())
        .highlight_symbol("▸");
    let selected = (!state.user_results.is_empty()).then_some(state.user_index);
    let mut list_state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn thread_lines(thread: &ConversationThread, colors: &ThemeColors, width: usize) -> Vec<Line<'static>> {
    if thread.messages.is_empty() {
        return vec![Line::styled("  No messages yet", colors.text_muted())];
    }

    let mut lines = Vec::new();
    for message in &thread.messages {
        let mine = thread.current_user_id == Some(message.sender_id);
        let (who, style) = if mine {
            ("You".to_string(), colors.text_primary())
        } else {
            (thread.other_user_name(), colors.text_secondary())
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {who}"), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", message.time_label()), colors.text_muted()),
        ]));
        for row in textwrap::wrap(&message.body, width) {
            lines.push(Line::styled(format!("   {row}"), colors.text()));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn render_messages(frame: &mut Frame, state: &AppState, thread: &ConversationThread, area: Rect, title: &str) {
    let colors = state.theme.colors();
    let width = area.width.saturating_sub(6).max(10) as usize;
    let lines = thread_lines(thread, &colors, width);

    // Keep the newest messages in view
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let messages = Paragraph::new(lines)
        .block(rounded_block(title.to_string(), false, &colors))
        .scroll((scroll, 0));
    frame.render_widget(messages, area);
}

fn render_thread_view(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let Some(thread) = &state.thread else {
        return;
    };

    let results_height = if state.verse_results.is_empty() { 0 } else { 7 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(results_height),
            Constraint::Length(3),
        ])
        .split(area);

    render_messages(
        frame,
        state,
        thread,
        chunks[0],
        &format!(" 💬 {} ", thread.other_user_name()),
    );

    if !state.verse_results.is_empty() {
        let items: Vec<ListItem> = state
            .verse_results
            .iter()
            .map(|verse| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {:<10}", verse.short_reference()), colors.reference()),
                    Span::styled(verse.preview(), colors.text()),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(rounded_block(" Send a verse ", true, &colors))
            .highlight_style(colors.selected())
            .highlight_symbol("▸");
        let mut list_state = ListState::default().with_selected(Some(state.verse_index));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    render_search_input(
        frame,
        state,
        chunks[2],
        " Search a verse to send (i) ",
        state.verse_search.query(),
    );
}

// ==================== Support ====================

fn render_support(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    match &state.support {
        Some(thread) => render_messages(frame, state, thread, chunks[0], " 🛟 Support "),
        None => {
            let loading = Paragraph::new(Line::styled(
                format!("  {} Loading support conversation...", spinner(state)),
                colors.text_secondary(),
            ))
            .block(rounded_block(" 🛟 Support ", false, &colors));
            frame.render_widget(loading, chunks[0]);
        }
    }

    let editing = state.mode == Mode::Editing;
    let input = Paragraph::new(Line::from(vec![
        Span::styled(" ✎ ", colors.text_muted()),
        Span::styled(state.support_input.clone(), colors.text()),
        Span::styled(if editing { "█" } else { "" }, colors.text_primary()),
    ]))
    .block(rounded_block(" Message (i to type, Enter to send) ", editing, &colors));
    frame.render_widget(input, chunks[1]);
}

// ==================== Forms ====================

fn form_lines(form: &Form, colors: &ThemeColors, active: bool) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    for (i, (field, value)) in form.fields().enumerate() {
        let focused = active && i == form.focus_index();
        let shown = if field.is_secret() {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let marker = if focused { "▸" } else { " " };
        let label_style = if focused {
            colors.text_primary().add_modifier(Modifier::BOLD)
        } else {
            colors.text_dim()
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} {:<18}", field.label()), label_style),
            Span::styled(shown, colors.text()),
            Span::styled(if focused { "█" } else { "" }, colors.text_primary()),
        ]));
        if let Some(message) = form.errors().get(field) {
            lines.push(Line::styled(format!("     {message}"), colors.field_error()));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn render_auth(frame: &mut Frame, state: &AppState, screen: AuthScreen, area: Rect) {
    let colors = state.theme.colors();
    let popup = centered_rect(60, 80, area);

    let mut lines = form_lines(&state.auth_form, &colors, true);

    if matches!(screen, AuthScreen::ResetCode | AuthScreen::ResetPassword) && !state.reset_email.is_empty() {
        lines.insert(
            0,
            Line::styled(format!("   Resetting {}", state.reset_email), colors.text_muted()),
        );
    }

    lines.push(Line::from(vec![
        Span::styled("   Enter", colors.key_hint()),
        Span::styled(" submit  ", colors.text_muted()),
        Span::styled("Tab", colors.key_hint()),
        Span::styled(" next field  ", colors.text_muted()),
    ]));
    let switch_hint = match screen {
        AuthScreen::Login => " create an account  ",
        _ => " sign in  ",
    };
    lines.push(Line::from(vec![
        Span::styled("   Ctrl+N", colors.key_hint()),
        Span::styled(switch_hint, colors.text_muted()),
        Span::styled("Ctrl+R", colors.key_hint()),
        Span::styled(" forgot password  ", colors.text_muted()),
        Span::styled("Esc", colors.key_hint()),
        Span::styled(
            if screen == AuthScreen::Login { " quit" } else { " back" },
            colors.text_muted(),
        ),
    ]));

    let form = Paragraph::new(lines).block(rounded_block(
        format!(" {} ", screen.title()),
        true,
        &colors,
    ));
    frame.render_widget(Clear, popup);
    frame.render_widget(form, popup);
}

fn render_profile(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let editing = state.mode == Mode::Editing;

    let mut lines = Vec::new();
    if let Some(user) = &state.user {
        lines.push(Line::from(vec![
            Span::styled("   Signed in as ", colors.text_muted()),
            Span::styled(user.display_name(), colors.text_primary()),
        ]));
    }
    lines.extend(form_lines(&state.profile_form, &colors, editing));
    lines.push(Line::styled(
        "   Leave the password fields empty to keep your password",
        colors.text_muted(),
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(if editing {
        vec![
            Span::styled("   Enter", colors.key_hint()),
            Span::styled(" save  ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" stop editing", colors.text_muted()),
        ]
    } else {
        vec![
            Span::styled("   e", colors.key_hint()),
            Span::styled(" edit  ", colors.text_muted()),
            Span::styled("L", colors.key_hint()),
            Span::styled(" sign out", colors.text_muted()),
        ]
    }));

    let profile = Paragraph::new(lines).block(rounded_block(" 👤 Profile ", editing, &colors));
    frame.render_widget(profile, area);
}

// ==================== Status bar ====================

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let loading_indicator = if state.is_loading() {
        format!("{} ", spinner(state))
    } else {
        String::new()
    };

    let content = if !state.status.is_empty() {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_secondary()),
            Span::styled(state.status.as_str(), colors.text_secondary()),
        ]
    } else if matches!(state.screen, Screen::Auth(_)) {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_secondary()),
            Span::styled("Ctrl+T", colors.key_hint()),
            Span::styled(": theme  ", colors.text_muted()),
            Span::styled("Ctrl+C", colors.key_hint()),
            Span::styled(": quit", colors.text_muted()),
        ]
    } else {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_secondary()),
            Span::styled("Tab", colors.key_hint()),
            Span::styled(": views  ", colors.text_muted()),
            Span::styled("←/→", colors.key_hint()),
            Span::styled(": verses  ", colors.text_muted()),
            Span::styled("Space", colors.key_hint()),
            Span::styled(": like  ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(": help  ", colors.text_muted()),
            Span::styled("t", colors.key_hint()),
            Span::styled(": theme  ", colors.text_muted()),
            Span::styled("q", colors.key_hint()),
            Span::styled(": quit", colors.text_muted()),
        ]
    };

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(status, area);
}

// ==================== Popups ====================

fn help_section(title: &'static str, colors: &ThemeColors) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("  {title}"),
        colors.text_primary().add_modifier(Modifier::BOLD),
    )])
}

fn help_row(keys: &'static str, action: &'static str, colors: &ThemeColors) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {keys:<17}"), colors.key_hint()),
        Span::styled(action, colors.text()),
    ])
}

fn render_help_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(50, 70, frame.area());

    let bg_block = Block::default().style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let c = &colors;
    let help_content = vec![
        Line::from(""),
        help_section("Navigation", c),
        help_row("Tab / Shift+Tab", "Next / previous view", c),
        help_row("1-6", "Jump to a view", c),
        Line::from(""),
        help_section("Verses", c),
        help_row("←/→ or h/l", "Previous / next verse", c),
        help_row("Space or L", "Like / unlike", c),
        help_row("s", "Show shareable text", c),
        help_row("r", "Reload from the first page", c),
        help_row("c", "Pick a category (Your Choice)", c),
        help_row("Enter / Esc", "Open / close a liked verse", c),
        Line::from(""),
        help_section("Conversations", c),
        help_row("n", "New conversation", c),
        help_row("Enter", "Open conversation / send verse", c),
        help_row("i or /", "Search verses to send", c),
        Line::from(""),
        help_section("Profile", c),
        help_row("e", "Edit profile", c),
        help_row("L", "Sign out", c),
        Line::from(""),
        help_section("General", c),
        help_row("t", "Open theme selector", c),
        help_row("?", "Toggle this help", c),
        help_row("q", "Quit application", c),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" or ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(" to close", colors.text_muted()),
        ]),
    ];

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block_focus())
                .style(Style::default().bg(colors.bg_secondary))
                .title(" ⌨ Keyboard Shortcuts ")
                .title_style(colors.text_primary()),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}

fn render_theme_picker(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(50, 70, frame.area());

    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let themes = Theme::all();
    let items: Vec<ListItem> = themes
        .iter()
        .enumerate()
        .map(|(i, theme_name)| {
            let palette = theme_name.palette();
            let selected = i == state.theme_picker_index;

            let preview = format!(
                "  {} {} ",
                if selected { "▸" } else { " " },
                theme_name.display_name()
            );

            let style = if selected {
                Style::default()
                    .fg(palette.accent)
                    .bg(palette.selection)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg).bg(colors.bg)
            };

            ListItem::new(Line::from(vec![
                Span::styled(preview, style),
                Span::styled("█", Style::default().fg(palette.accent).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.secondary).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.success).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.error).bg(colors.bg)),
            ]))
        })
        .collect();

    let theme_list = List::new(items)
        .style(Style::default().bg(colors.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.primary))
                .border_type(BorderType::Rounded)
                .style(Style::default().bg(colors.bg))
                .title(format!(
                    " 🎨 Select Theme ({}/{}) ",
                    state.theme_picker_index + 1,
                    themes.len()
                ))
                .title_bottom(Line::from(" ↑↓ navigate │ ↵ apply │ Esc cancel ").centered()),
        );

    let mut list_state = ListState::default().with_selected(Some(state.theme_picker_index));
    frame.render_stateful_widget(theme_list, popup_area, &mut list_state);
}

fn render_category_picker(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(40, 70, frame.area());
    frame.render_widget(Clear, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(popup_area);

    let filter = Paragraph::new(Line::from(vec![
        Span::styled(" 🔍 ", colors.text_muted()),
        Span::styled(state.category_filter.clone(), colors.text()),
        Span::styled("█", colors.text_primary()),
    ]))
    .style(Style::default().bg(colors.bg))
    .block(rounded_block(" Category ", true, &colors));
    frame.render_widget(filter, chunks[0]);

    let categories = state.filtered_categories();
    let items: Vec<ListItem> = categories
        .iter()
        .map(|category| {
            let current = state.category.as_ref() == Some(category);
            let marker = if current { " ✓" } else { "" };
            ListItem::new(Line::styled(
                format!(" {}{marker}", category.display_name()),
                colors.text(),
            ))
        })
        .collect();

    let list = List::new(items)
        .style(Style::default().bg(colors.bg))
        .block(
            rounded_block(format!(" {} categories ", categories.len()), false, &colors)
                .title_bottom(Line::from(" ↑↓ navigate │ ↵ show │ Esc cancel ").centered()),
        )
        .highlight_style(colors.selected())
        .highlight_symbol("▸");
    let selected = (!categories.is_empty()).then_some(state.category_index);
    let mut list_state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn render_alert(frame: &mut Frame, state: &AppState, message: &str) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, popup_area);

    let alert = Paragraph::new(vec![
        Line::from(""),
        Line::styled(message.to_string(), colors.text_error()),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", colors.text_muted()),
            Span::styled("Enter", colors.key_hint()),
            Span::styled(" to dismiss", colors.text_muted()),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.text_error())
            .style(Style::default().bg(colors.bg_secondary))
            .title(" ⚠ Something went wrong ")
            .title_style(colors.text_error()),
    );
    frame.render_widget(alert, popup_area);
}

/// Helper function to create a centered rect
const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}
