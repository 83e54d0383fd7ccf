//! Application module
//!
//! The terminal side of the wizard: raw mode and the alternate screen, the
//! crossterm event loop, and drawing through [`UiRenderer`]. The loop ends when
//! the operator cancels or confirms a plan; the plan runs after the terminal
//! has been restored.

use crossterm::event::{self, Event};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{NexusError, Result};
use crate::ui::UiRenderer;
use crate::wizard::{Outcome, PackagePlan, Wizard};

/// How long to wait for input before redrawing
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Restores the terminal when dropped, including on early return
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().map_err(|e| NexusError::terminal(format!("raw mode: {e}")))?;
        if let Err(e) = crossterm::execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(NexusError::terminal(format!("alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to disable raw mode: {}", e);
        }
        if let Err(e) = crossterm::execute!(
            io::stdout(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        ) {
            warn!("Failed to leave alternate screen: {}", e);
        }
    }
}

/// Main application struct
pub struct App {
    wizard: Wizard,
    renderer: UiRenderer,
}

impl App {
    pub fn new(wizard: Wizard, renderer: UiRenderer) -> Self {
        Self { wizard, renderer }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Feed one terminal event; `Some` ends the loop
    pub fn handle_event(&mut self, event: Event) -> Result<Option<Outcome>> {
        match event {
            Event::Key(key) => match self.wizard.handle_key(key)? {
                Outcome::Continue => Ok(None),
                outcome => Ok(Some(outcome)),
            },
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Run the main application loop on any ratatui backend
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<Option<PackagePlan>> {
        info!("Starting wizard loop");

        loop {
            terminal.draw(|f| self.renderer.render(f, &self.wizard))?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }

            match self.handle_event(event::read()?)? {
                Some(Outcome::Execute(plan)) => return Ok(Some(plan)),
                Some(Outcome::Quit) => return Ok(None),
                Some(Outcome::Continue) | None => {}
            }
        }
    }
}

/// Take over the terminal, run the wizard, and give the terminal back.
///
/// Returns the confirmed plan, or `None` when the operator cancelled.
pub fn run_wizard(wizard: Wizard, renderer: UiRenderer) -> Result<Option<PackagePlan>> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal: Terminal<CrosstermBackend<Stdout>> =
        Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let mut app = App::new(wizard, renderer);
    app.run(&mut terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, Settings};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn app(tmp: &TempDir) -> App {
        let layout = Layout::new(tmp.path());
        let wizard = Wizard::new(layout.clone(), Settings::defaults(&layout));
        App::new(wizard, UiRenderer::default())
    }

    #[test]
    fn test_resize_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let mut app = app(&tmp);
        assert_eq!(app.handle_event(Event::Resize(80, 24)).unwrap(), None);
    }

    #[test]
    fn test_ctrl_c_ends_loop() {
        let tmp = TempDir::new().unwrap();
        let mut app = app(&tmp);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.handle_event(ctrl_c).unwrap(), Some(Outcome::Quit));
    }

    #[test]
    fn test_navigation_continues() {
        let tmp = TempDir::new().unwrap();
        let mut app = app(&tmp);
        let down = Event::Key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert_eq!(app.handle_event(down).unwrap(), None);
        assert_eq!(app.wizard().step().cursor(), Some(1));
    }
}
