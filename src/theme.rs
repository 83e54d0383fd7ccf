//! Colors and styles for the wizard screens
//!
//! A [`Theme`] is built once and handed to the renderer, so nothing in the UI
//! reaches for a global color table. [`Theme::default`] is the Nexus palette;
//! [`Theme::monochrome`] drops all colors for terminals that lack them.
//!
//! # Usage
//! ```rust
//! use nexus::theme::Theme;
//!
//! let theme = Theme::default();
//! let title = theme.title();
//! let error = theme.error();
//! ```

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Nexus accent (salmon orange)
pub const ACCENT: Color = Color::Rgb(255, 135, 95);

/// Secondary text
pub const MUTED: Color = Color::Rgb(98, 98, 98);

/// Inline validation errors
pub const ERROR: Color = Color::Rgb(255, 95, 95);

/// Startup warnings
pub const WARNING: Color = Color::Yellow;

// =============================================================================
// THEME
// =============================================================================

/// Injected palette for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub error: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: ACCENT,
            text: Color::White,
            muted: MUTED,
            error: ERROR,
            warning: WARNING,
        }
    }
}

impl Theme {
    /// Every color reset to the terminal default
    pub fn monochrome() -> Self {
        Self {
            accent: Color::Reset,
            text: Color::Reset,
            muted: Color::Reset,
            error: Color::Reset,
            warning: Color::Reset,
        }
    }

    // -------------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------------

    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Screen title (accent, bold)
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Label in front of a value on the review screen
    pub fn label(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }

    // -------------------------------------------------------------------------
    // Menus and inputs
    // -------------------------------------------------------------------------

    /// Highlighted menu row
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn unselected(&self) -> Style {
        Style::default().fg(self.text)
    }

    /// Prompt in front of a text input
    pub fn prompt(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    // -------------------------------------------------------------------------
    // Feedback
    // -------------------------------------------------------------------------

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Keybinding hints in the footer
    pub fn nav_hint(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
