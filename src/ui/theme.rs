//! Theme and styling for the full-screen interface.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub primary: Color,
    pub accent: Color,

    // Semantic Colors
    pub right: Color,
    pub wrong: Color,
    pub warning: Color,
    pub info: Color,

    // Background Colors
    pub bg: Color,
    pub bg_input: Color,

    // Text Colors
    pub text: Color,
    pub text_muted: Color,
    pub text_dim: Color,
}

/// Available theme names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Slate,
    Solarized,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Slate => "default",
            ThemeName::Solarized => "solarized",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Slate => "Slate",
            ThemeName::Solarized => "Solarized",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "solarized" | "solarized-dark" => ThemeName::Solarized,
            _ => ThemeName::Slate,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeName::Slate => ThemeName::Solarized,
            ThemeName::Solarized => ThemeName::Slate,
        }
    }
}

/// Theme struct that holds colors and provides style methods.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let colors = match name {
            ThemeName::Slate => Self::slate_colors(),
            ThemeName::Solarized => Self::solarized_colors(),
        };
        Self { name, colors }
    }

    pub fn from_name(name: &str) -> Self {
        Self::new(ThemeName::parse(name))
    }

    fn slate_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(99, 102, 241),   // Indigo
            accent: Color::Rgb(236, 72, 153),    // Pink

            right: Color::Rgb(34, 197, 94),      // Green
            wrong: Color::Rgb(239, 68, 68),      // Red
            warning: Color::Rgb(250, 204, 21),   // Yellow
            info: Color::Rgb(59, 130, 246),      // Blue

            bg: Color::Rgb(15, 23, 42),          // Slate 900
            bg_input: Color::Rgb(30, 41, 59),    // Slate 800

            text: Color::Rgb(248, 250, 252),
            text_muted: Color::Rgb(148, 163, 184),
            text_dim: Color::Rgb(100, 116, 139),
        }
    }

    fn solarized_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(0x26, 0x8B, 0xD2), // blue
            accent: Color::Rgb(0xD3, 0x36, 0x82),  // magenta

            right: Color::Rgb(0x85, 0x99, 0x00),   // green
            wrong: Color::Rgb(0xDC, 0x32, 0x2F),   // red
            warning: Color::Rgb(0xB5, 0x89, 0x00), // yellow
            info: Color::Rgb(0x2A, 0xA1, 0x98),    // cyan

            bg: Color::Rgb(0x00, 0x2B, 0x36),      // base03
            bg_input: Color::Rgb(0x07, 0x36, 0x42), // base02

            text: Color::Rgb(0xEE, 0xE8, 0xD5),    // base2
            text_muted: Color::Rgb(0x93, 0xA1, 0xA1), // base1
            text_dim: Color::Rgb(0x58, 0x6E, 0x75), // base01
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Styles
    // ══════════════════════════════════════════════════════════════════════

    pub fn title(&self) -> Style {
        bold(self.colors.text)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.colors.text_muted)
    }

    pub fn card_front(&self) -> Style {
        bold(self.colors.accent)
    }

    pub fn card_back(&self) -> Style {
        bold(self.colors.right)
    }

    pub fn judged(&self, correct: bool) -> Style {
        bold(if correct { self.colors.right } else { self.colors.wrong })
    }

    pub fn stats_due(&self) -> Style {
        bold(self.colors.info)
    }

    pub fn stats_learning(&self) -> Style {
        bold(self.colors.warning)
    }

    pub fn stats_graduated(&self) -> Style {
        bold(self.colors.right)
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.colors.text_dim)
    }

    pub fn key_highlight(&self) -> Style {
        bold(self.colors.accent)
    }
}

fn bold(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Slate)
    }
}

pub mod icons {
    pub const CHECK: &str = "✓";
    pub const CROSS: &str = "✗";
    pub const BRAIN: &str = "🧠";
}
