//! Built-in colour themes and lookup by id.

use ratatui::style::Color;
use thiserror::Error;

/// Screen colours for one theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Stable id, also the value stored in the settings file.
    pub id: &'static str,
    pub name: &'static str,
    /// Area around the game.
    pub background: Color,
    /// Playfield.
    pub game_background: Color,
    /// Sidebar panels.
    pub panel_background: Color,
    pub text: Color,
    pub text_muted: Color,
    /// Titles and borders.
    pub accent: Color,
    /// Block glyphs.
    pub block: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("unknown theme: {0} (expected one of: dark, ocean, electronika)")]
    UnknownTheme(String),
}

/// All built-in themes; the first one is the default.
pub static THEMES: [Theme; 3] = [
    Theme {
        id: "dark",
        name: "Dark",
        background: Color::Rgb(0x24, 0x24, 0x24),
        game_background: Color::Rgb(0x1E, 0x1E, 0x1E),
        panel_background: Color::Rgb(0x2E, 0x2E, 0x2E),
        text: Color::Rgb(0xE3, 0xE3, 0xE3),
        text_muted: Color::Rgb(0x92, 0x92, 0x92),
        accent: Color::Rgb(0x64, 0x6C, 0xFF),
        block: Color::Rgb(0xFF, 0xFF, 0xFF),
    },
    Theme {
        id: "ocean",
        name: "Ocean",
        background: Color::Rgb(0x0F, 0x17, 0x29),
        game_background: Color::Rgb(0x0A, 0x11, 0x20),
        panel_background: Color::Rgb(0x16, 0x20, 0x32),
        text: Color::Rgb(0xE0, 0xF2, 0xFE),
        text_muted: Color::Rgb(0x8C, 0x9A, 0xA9),
        accent: Color::Rgb(0x38, 0xBD, 0xF8),
        block: Color::Rgb(0x22, 0xD3, 0xEE),
    },
    Theme {
        id: "electronika",
        name: "Electronika",
        background: Color::Rgb(0x02, 0x04, 0x02),
        game_background: Color::Rgb(0x05, 0x08, 0x05),
        panel_background: Color::Rgb(0x0A, 0x14, 0x0A),
        text: Color::Rgb(0x39, 0xFF, 0x14),
        text_muted: Color::Rgb(0x1B, 0x5E, 0x20),
        accent: Color::Rgb(0x39, 0xFF, 0x14),
        block: Color::Rgb(0x39, 0xFF, 0x14),
    },
];

impl Theme {
    pub fn default_theme() -> &'static Self {
        &THEMES[0]
    }

    /// Look up a built-in theme by id (case-insensitive).
    pub fn by_id(id: &str) -> Result<&'static Self, ThemeError> {
        THEMES
            .iter()
            .find(|t| t.id.eq_ignore_ascii_case(id.trim()))
            .ok_or_else(|| ThemeError::UnknownTheme(id.to_string()))
    }

    /// Theme after this one, wrapping around.
    pub fn next(&self) -> &'static Self {
        let index = THEMES.iter().position(|t| t.id == self.id).unwrap_or(0);
        &THEMES[(index + 1) % THEMES.len()]
    }
}
