//! Theme configuration and colors.
//!
//! Palettes come from the `ratatui-themes` crate; [`ThemeColors`] maps them
//! onto the roles the verse screens use.

use ratatui::style::{Color, Modifier, Style};
use ratatui_themes::{ThemeName, ThemePalette};
use serde::{Deserialize, Serialize};

/// Selected theme, persisted in the config file by slug
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub ThemeName);

impl Theme {
    /// Every theme the picker offers
    pub const fn all() -> &'static [ThemeName] {
        ThemeName::all()
    }

    /// Theme after this one in the picker
    pub fn next(&self) -> Self {
        Self(self.0.next())
    }

    /// Theme before this one in the picker
    pub fn prev(&self) -> Self {
        Self(self.0.prev())
    }

    /// Name shown in the picker and status bar
    pub const fn name(&self) -> &'static str {
        self.0.display_name()
    }

    /// Roles for the UI
    pub fn colors(&self) -> ThemeColors {
        ThemeColors::from_palette(self.0.palette())
    }

    /// Raw palette
    pub const fn palette(&self) -> ThemePalette {
        self.0.palette()
    }

    /// Underlying ratatui-themes name
    pub const fn inner(&self) -> ThemeName {
        self.0
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Colors by role
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Screen background
    pub bg: Color,
    /// Popups and the status bar
    pub bg_secondary: Color,
    /// Verse text and input
    pub fg: Color,
    /// Hints and secondary text
    pub muted: Color,
    /// Focus, titles and the active tab
    pub primary: Color,
    /// Loading and status messages
    pub secondary: Color,
    /// Alerts
    pub error: Color,
    /// Unfocused borders
    pub border: Color,
    /// Selected list rows
    pub selection: Color,
    /// Heart on a liked verse
    pub liked: Color,
    /// "Book chapter:verse" line
    pub reference: Color,
}

impl ThemeColors {
    /// Map a palette onto roles
    pub fn from_palette(p: ThemePalette) -> Self {
        Self {
            bg: p.bg,
            bg_secondary: lighten(p.bg, 10),
            fg: p.fg,
            muted: p.muted,
            primary: p.accent,
            secondary: p.secondary,
            error: p.error,
            border: p.muted,
            selection: p.selection,
            liked: p.error,
            reference: p.secondary,
        }
    }

    /// Verse text
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Form labels and empty-state hints
    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::DIM)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Unfocused border
    pub fn block(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Focused border
    pub fn block_focus(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Highlighted list row
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn tab_active(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Keyboard shortcut in hints
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.secondary)
            .add_modifier(Modifier::BOLD)
    }

    /// Filled heart
    pub fn liked(&self) -> Style {
        Style::default()
            .fg(self.liked)
            .add_modifier(Modifier::BOLD)
    }

    pub fn reference(&self) -> Style {
        Style::default()
            .fg(self.reference)
            .add_modifier(Modifier::ITALIC)
    }

    /// Validation message under a form field
    pub fn field_error(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::ITALIC)
    }

    /// App name in the title bar
    pub fn logo_style_primary(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }
}

/// Raise each RGB channel by `amount`; named colors pass through
fn lighten(color: Color, amount: u8) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(amount),
            g.saturating_add(amount),
            b.saturating_add(amount),
        ),
        other => other,
    }
}
