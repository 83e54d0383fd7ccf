//! User interface rendering module
//!
//! Submodules:
//! - `header` - banner, step title and keybinding footer
//! - `screens` - the body of each wizard step
//!
//! Rendering is a pure function of the [`Wizard`]; nothing here mutates state.

mod header;
pub mod screens;

pub use header::key_hints;

use crate::theme::Theme;
use crate::wizard::Wizard;
use header::HeaderRenderer;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

/// Draws the wizard into a frame
pub struct UiRenderer {
    theme: Theme,
    header: HeaderRenderer,
}

impl Default for UiRenderer {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl UiRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            header: HeaderRenderer::new(theme),
            theme,
        }
    }

    /// Render one full frame
    pub fn render(&self, f: &mut Frame, wizard: &Wizard) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Banner
                Constraint::Length(3), // Title
                Constraint::Min(6),    // Step body
                Constraint::Length(2), // Errors and notices
                Constraint::Length(1), // Key hints
            ])
            .split(f.area());

        self.header.render_header(f, chunks[0]);
        self.header.render_title(f, chunks[1], wizard.step().title());
        screens::render_step(f, chunks[2], &self.theme, wizard);

        let mut messages = Vec::new();
        if let Some(error) = wizard.validation_error() {
            messages.push(Line::from(Span::styled(
                format!("Error: {error}"),
                self.theme.error(),
            )));
        }
        if let Some(notice) = wizard.notice() {
            messages.push(Line::from(Span::styled(
                notice.to_string(),
                self.theme.warning(),
            )));
        }
        f.render_widget(
            Paragraph::new(messages).wrap(Wrap { trim: true }),
            chunks[3],
        );

        self.header.render_footer(f, chunks[4], wizard.step());
    }
}
