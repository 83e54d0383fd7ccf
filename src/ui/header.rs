//! Banner, title and footer rendering
//!
//! The pieces every screen shares: the Nexus banner, the boxed step title and
//! the keybinding hints at the bottom.

use crate::theme::Theme;
use crate::types::InstallSource;
use crate::wizard::{DirectoryStep, Step};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const BANNER: [&str; 3] = [
    "█▄ █ █▀▀ ▀▄▀ █ █ █▀▀",
    "█ ▀█ ██▄ █ █ █▄█ ▄▄█",
    "Intune Win32 application packager",
];

/// Header renderer bound to a theme
pub struct HeaderRenderer {
    theme: Theme,
}

impl HeaderRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Render the banner
    pub fn render_header(&self, f: &mut Frame, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let lines: Vec<Line> = BANNER
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let style = if i + 1 == BANNER.len() {
                    self.theme.muted()
                } else {
                    self.theme.title()
                };
                Line::from(Span::styled(*text, style))
            })
            .collect();

        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    /// Render a boxed step title
    pub fn render_title(&self, f: &mut Frame, area: Rect, title: &str) {
        let widget = Paragraph::new(Span::styled(title, self.theme.title()))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border()),
            )
            .alignment(Alignment::Center);
        f.render_widget(widget, area);
    }

    /// Render the keybinding hints for a step
    pub fn render_footer(&self, f: &mut Frame, area: Rect, step: &Step) {
        let hints = key_hints(step)
            .iter()
            .map(|(key, action)| format!("{key} {action}"))
            .collect::<Vec<_>>()
            .join(" • ");
        let widget = Paragraph::new(Span::styled(hints, self.theme.nav_hint()))
            .alignment(Alignment::Center);
        f.render_widget(widget, area);
    }
}

/// Keys that do something on the given step
pub fn key_hints(step: &Step) -> &'static [(&'static str, &'static str)] {
    match step {
        Step::EnterInstaller {
            source: InstallSource::DownloadUrl,
            ..
        } => &[("enter", "confirm"), ("ctrl+c", "quit")],
        Step::EnterName { .. }
        | Step::EnterInstaller { .. }
        | Step::SetDirectory(DirectoryStep::Typing { .. }) => &[
            ("enter", "confirm"),
            ("tab", "complete"),
            ("ctrl+c", "quit"),
        ],
        _ => &[
            ("↑/k", "up"),
            ("↓/j", "down"),
            ("enter", "select"),
            ("ctrl+c", "quit"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_steps_advertise_tab() {
        let step = Step::SetDirectory(DirectoryStep::Typing {
            input: Default::default(),
        });
        assert!(key_hints(&step).iter().any(|(key, _)| *key == "tab"));
        assert!(!key_hints(&Step::default()).iter().any(|(key, _)| *key == "tab"));
    }
}
