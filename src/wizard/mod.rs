//! Packaging wizard
//!
//! The interactive session as a state machine over [`Step`]. The wizard owns
//! no terminal: it consumes crossterm key events and exposes its state for
//! the renderer. Confirming the review screen hands a [`PackagePlan`] back to
//! the caller, which runs it after leaving the alternate screen.
//!
//! # Module Structure
//! - `state` - per-step records, the plan and key outcomes
//! - Main module - [`Wizard`] and its transitions

mod state;

pub use state::{DirectoryStep, Outcome, PackagePlan, Step, TextInput};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::complete::{complete_name, complete_path};
use crate::config::{Layout, Settings};
use crate::error::{NexusError, Result, ValidationError};
use crate::store::{ListOrder, PackageStore, remove_directory};
use crate::types::{
    ConfirmChoice, DirectoryChoice, InstallSource, InstallerKind, Operation, menu_item,
    menu_labels,
};
use crate::validate::{InstallerInput, validate_input, validate_package_name};

/// Packages listed on the first screen
pub const RECENT_COUNT: usize = 3;

/// Interactive session state
#[derive(Debug, Clone)]
pub struct Wizard {
    step: Step,
    layout: Layout,
    store: PackageStore,
    validation_error: Option<String>,
    notice: Option<String>,
    recent: Vec<String>,
}

impl Wizard {
    /// Start a session on the operation menu
    pub fn new(layout: Layout, settings: Settings) -> Self {
        let mut wizard = Self {
            step: Step::default(),
            layout,
            store: PackageStore::new(settings.packages_dir),
            validation_error: None,
            notice: None,
            recent: Vec::new(),
        };
        wizard.refresh_recent();
        wizard
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn packages_dir(&self) -> &Path {
        self.store.root()
    }

    /// Inline error for the current step
    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Startup warning, e.g. an unusable settings file
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// The most recently modified packages, newest first
    pub fn recent_packages(&self) -> &[String] {
        &self.recent
    }

    /// Labels of the current menu (empty for text steps)
    pub fn menu_options(&self) -> Vec<String> {
        match &self.step {
            Step::SelectOperation { .. } => menu_labels::<Operation>(),
            Step::SetDirectory(DirectoryStep::Choose { .. }) => menu_labels::<DirectoryChoice>(),
            Step::SelectSource { .. } => menu_labels::<InstallSource>(),
            Step::SelectInstallerType { .. } => menu_labels::<InstallerKind>(),
            Step::SelectExistingPackage { packages, .. } => packages
                .iter()
                .map(|entry| entry.display_name.clone())
                .collect(),
            Step::Review { plan, .. } => ConfirmChoice::iter()
                .map(|choice| choice.label(plan.is_repackage()).to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Feed one key event.
    ///
    /// Errors are fatal to the session (e.g. the package directory could not
    /// be created); everything recoverable is reported through
    /// [`Self::validation_error`].
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Outcome> {
        if key.kind == KeyEventKind::Release {
            return Ok(Outcome::Continue);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            info!("Session cancelled from {}", self.step.title());
            return Ok(Outcome::Quit);
        }

        if self.step.text_input().is_some() {
            self.handle_text_key(key)
        } else {
            self.handle_menu_key(key)
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Result<Outcome> {
        let last = self.menu_options().len().saturating_sub(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(cursor) = self.step.cursor_mut() {
                    *cursor = cursor.saturating_sub(1);
                }
                Ok(Outcome::Continue)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(cursor) = self.step.cursor_mut() {
                    *cursor = (*cursor + 1).min(last);
                }
                Ok(Outcome::Continue)
            }
            KeyCode::Enter => self.select(),
            _ => Ok(Outcome::Continue),
        }
    }

    fn handle_text_key(&mut self, key: KeyEvent) -> Result<Outcome> {
        match key.code {
            KeyCode::Enter => return self.commit_text(),
            KeyCode::Tab => self.complete(),
            KeyCode::Backspace => {
                if let Some(input) = self.step.text_input_mut() {
                    input.backspace();
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if let Some(input) = self.step.text_input_mut() {
                    input.push(c);
                }
            }
            _ => {}
        }
        Ok(Outcome::Continue)
    }

    /// Enter on a menu step
    fn select(&mut self) -> Result<Outcome> {
        let next = match &self.step {
            Step::SelectOperation { cursor } => match menu_item::<Operation>(*cursor) {
                Some(Operation::NewPackage) => Step::SelectSource { cursor: 0 },
                Some(Operation::RepackageExisting) => {
                    let packages = match self.store.entries(ListOrder::MostRecent) {
                        Ok(packages) => packages,
                        Err(e) => return self.report(e),
                    };
                    if packages.is_empty() {
                        self.validation_error = Some(ValidationError::NoPackages.to_string());
                        return Ok(Outcome::Continue);
                    }
                    Step::SelectExistingPackage {
                        packages,
                        cursor: 0,
                    }
                }
                Some(Operation::SetPackagesDirectory) => {
                    Step::SetDirectory(DirectoryStep::Choose { cursor: 0 })
                }
                None => return Ok(Outcome::Continue),
            },
            Step::SetDirectory(DirectoryStep::Choose { cursor }) => {
                match menu_item::<DirectoryChoice>(*cursor) {
                    Some(DirectoryChoice::UseDefault) => {
                        let dir = self.layout.default_packages_dir.clone();
                        self.commit_packages_dir(dir);
                        return Ok(Outcome::Continue);
                    }
                    Some(DirectoryChoice::Custom) => Step::SetDirectory(DirectoryStep::Typing {
                        input: TextInput::with_value(
                            self.layout.default_packages_dir.display().to_string(),
                        ),
                    }),
                    None => return Ok(Outcome::Continue),
                }
            }
            Step::SelectSource { cursor } => match menu_item::<InstallSource>(*cursor) {
                Some(source) => Step::SelectInstallerType { source, cursor: 0 },
                None => return Ok(Outcome::Continue),
            },
            Step::SelectInstallerType { source, cursor } => {
                match menu_item::<InstallerKind>(*cursor) {
                    Some(kind) => Step::EnterName {
                        source: *source,
                        kind,
                        input: TextInput::default(),
                    },
                    None => return Ok(Outcome::Continue),
                }
            }
            Step::SelectExistingPackage { packages, cursor } => {
                let Some(entry) = packages.get(*cursor) else {
                    return Ok(Outcome::Continue);
                };
                Step::Review {
                    plan: PackagePlan::Repackage {
                        name: entry.display_name.clone(),
                        output_dir: self.store.root().join(&entry.dir_name),
                    },
                    cursor: 0,
                }
            }
            Step::Review { plan, cursor } => match menu_item::<ConfirmChoice>(*cursor) {
                Some(ConfirmChoice::Proceed) => {
                    info!("Confirmed package {}", plan.name());
                    return Ok(Outcome::Execute(plan.clone()));
                }
                Some(ConfirmChoice::StartOver) => {
                    if let PackagePlan::New { output_dir, .. } = plan {
                        debug!("Discarding {}", output_dir.display());
                        remove_directory(output_dir);
                    }
                    Step::SelectOperation { cursor: 0 }
                }
                None => return Ok(Outcome::Continue),
            },
            _ => return Ok(Outcome::Continue),
        };

        self.enter(next);
        Ok(Outcome::Continue)
    }

    /// Enter on a text step
    fn commit_text(&mut self) -> Result<Outcome> {
        let next = match &self.step {
            Step::EnterName {
                source,
                kind,
                input,
            } => {
                if let Err(e) = validate_package_name(&input.value) {
                    self.validation_error = Some(e.to_string());
                    return Ok(Outcome::Continue);
                }
                Step::EnterInstaller {
                    source: *source,
                    kind: *kind,
                    name: input.value.trim().to_string(),
                    input: TextInput::default(),
                }
            }
            Step::EnterInstaller {
                source,
                kind,
                name,
                input,
            } => {
                let validated = match validate_input(*source, *kind, &input.value) {
                    Ok(validated) => validated,
                    Err(e) => {
                        debug!("Rejected installer input: {}", e);
                        self.validation_error = Some(e.to_string());
                        return Ok(Outcome::Continue);
                    }
                };
                let output_dir = match self.prepare_output_dir(name, &validated) {
                    Ok(dir) => dir,
                    Err(e) => return self.report(e),
                };
                Step::Review {
                    plan: PackagePlan::New {
                        name: name.clone(),
                        kind: *kind,
                        input: validated,
                        output_dir,
                    },
                    cursor: 0,
                }
            }
            Step::SetDirectory(DirectoryStep::Typing { input }) => {
                let text = input.value.trim();
                let dir = if text.is_empty() {
                    self.layout.default_packages_dir.clone()
                } else {
                    PathBuf::from(text)
                };
                self.commit_packages_dir(dir);
                return Ok(Outcome::Continue);
            }
            _ => return Ok(Outcome::Continue),
        };

        self.enter(next);
        Ok(Outcome::Continue)
    }

    fn complete(&mut self) {
        let known = match &self.step {
            Step::EnterName { .. } => self.store.recent_packages(usize::MAX).unwrap_or_default(),
            _ => Vec::new(),
        };

        match &mut self.step {
            Step::EnterName { input, .. } => {
                let completion = complete_name(&input.value, &known);
                input.apply(completion);
            }
            Step::EnterInstaller {
                source: InstallSource::LocalFile,
                input,
                ..
            }
            | Step::SetDirectory(DirectoryStep::Typing { input }) => {
                let completion = complete_path(&input.value);
                input.apply(completion);
            }
            _ => {}
        }
    }

    /// Fresh package directory for a validated installer.
    ///
    /// A local installer that the directory replacement would delete is
    /// rejected before anything is removed.
    fn prepare_output_dir(&self, name: &str, input: &InstallerInput) -> Result<PathBuf> {
        if let InstallerInput::Local(path) = input {
            if self.store.would_remove(name, path)? {
                return Err(ValidationError::InstallerInPackageDirectory(path.clone()).into());
            }
        }
        self.store.create_package_directory(name)
    }

    /// Show recoverable errors inline; anything else ends the session
    fn report(&mut self, error: NexusError) -> Result<Outcome> {
        if !error.is_recoverable() {
            return Err(error);
        }
        warn!("{}", error);
        self.validation_error = Some(match error {
            NexusError::Validation(e) => e.to_string(),
            other => other.to_string(),
        });
        Ok(Outcome::Continue)
    }

    /// Create and persist a new packages root, then return to the first screen
    fn commit_packages_dir(&mut self, dir: PathBuf) {
        let dir = match std::path::absolute(&dir) {
            Ok(dir) => dir,
            Err(e) => {
                self.validation_error = Some(format!("Invalid directory: {}", e));
                return;
            }
        };
        if let Err(e) = fs::create_dir_all(&dir) {
            self.validation_error = Some(format!("Failed to create directory: {}", e));
            return;
        }

        let settings = Settings {
            packages_dir: dir.clone(),
        };
        if let Err(e) = settings.save(&self.layout.settings_file) {
            self.validation_error = Some(format!("Failed to save configuration: {}", e));
            return;
        }

        info!("Packages directory set to {}", dir.display());
        self.store = PackageStore::new(dir);
        self.enter(Step::SelectOperation { cursor: 0 });
    }

    fn enter(&mut self, step: Step) {
        debug!("Wizard step: {}", step.title());
        self.validation_error = None;
        if matches!(step, Step::SelectOperation { .. }) {
            self.refresh_recent();
        }
        self.step = step;
    }

    fn refresh_recent(&mut self) {
        self.recent = match self.store.recent_packages(RECENT_COUNT) {
            Ok(recent) => recent,
            Err(e) => {
                warn!("Could not list recent packages: {}", e);
                Vec::new()
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn wizard(tmp: &TempDir) -> Wizard {
        let layout = Layout::new(tmp.path());
        let settings = Settings::defaults(&layout);
        Wizard::new(layout, settings)
    }

    #[test]
    fn test_starts_on_operation_menu() {
        let tmp = TempDir::new().unwrap();
        let wizard = wizard(&tmp);
        assert_eq!(wizard.step(), &Step::SelectOperation { cursor: 0 });
        assert_eq!(wizard.menu_options().len(), 3);
        assert!(wizard.recent_packages().is_empty());
    }

    #[test]
    fn test_cursor_is_clamped() {
        let tmp = TempDir::new().unwrap();
        let mut wizard = wizard(&tmp);
        wizard.handle_key(key(KeyCode::Up)).unwrap();
        assert_eq!(wizard.step().cursor(), Some(0));
        for _ in 0..5 {
            wizard.handle_key(key(KeyCode::Char('j'))).unwrap();
        }
        assert_eq!(wizard.step().cursor(), Some(2));
        wizard.handle_key(key(KeyCode::Char('k'))).unwrap();
        assert_eq!(wizard.step().cursor(), Some(1));
    }

    #[test]
    fn test_ctrl_c_quits_from_text_step() {
        let tmp = TempDir::new().unwrap();
        let mut wizard = wizard(&tmp);
        wizard.handle_key(key(KeyCode::Enter)).unwrap();
        wizard.handle_key(key(KeyCode::Enter)).unwrap();
        wizard.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(wizard.step().text_input().is_some());

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(wizard.handle_key(ctrl_c).unwrap(), Outcome::Quit);
    }

    #[test]
    fn test_repackage_without_packages_stays_put() {
        let tmp = TempDir::new().unwrap();
        let mut wizard = wizard(&tmp);
        wizard.handle_key(key(KeyCode::Down)).unwrap();
        wizard.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(wizard.step(), Step::SelectOperation { .. }));
        assert_eq!(wizard.validation_error(), Some("No existing packages found"));
    }

    #[test]
    fn test_empty_name_is_rejected_inline() {
        let tmp = TempDir::new().unwrap();
        let mut wizard = wizard(&tmp);
        for _ in 0..3 {
            wizard.handle_key(key(KeyCode::Enter)).unwrap();
        }
        wizard.handle_key(key(KeyCode::Char('*'))).unwrap();
        wizard.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(wizard.step(), Step::EnterName { .. }));
        assert!(wizard.validation_error().is_some());
    }

    #[test]
    fn test_menu_letters_are_typed_in_text_steps() {
        let tmp = TempDir::new().unwrap();
        let mut wizard = wizard(&tmp);
        for _ in 0..3 {
            wizard.handle_key(key(KeyCode::Enter)).unwrap();
        }
        for c in "jk".chars() {
            wizard.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(wizard.step().text_input().map(|i| i.value.as_str()), Some("jk"));
    }

    #[test]
    fn test_use_default_directory_saves_settings() {
        let tmp = TempDir::new().unwrap();
        let mut wizard = wizard(&tmp);
        wizard.handle_key(key(KeyCode::Down)).unwrap();
        wizard.handle_key(key(KeyCode::Down)).unwrap();
        wizard.handle_key(key(KeyCode::Enter)).unwrap();
        wizard.handle_key(key(KeyCode::Enter)).unwrap();

        assert!(matches!(wizard.step(), Step::SelectOperation { .. }));
        let layout = Layout::new(tmp.path());
        let saved = Settings::load(&layout.settings_file).unwrap().unwrap();
        assert_eq!(saved.packages_dir, layout.default_packages_dir);
        assert!(layout.default_packages_dir.is_dir());
    }

    #[test]
    fn test_unreadable_packages_root_ends_session() {
        let tmp = TempDir::new().unwrap();
        let root_file = tmp.path().join("packages");
        std::fs::write(&root_file, "not a directory").unwrap();
        let layout = Layout::new(tmp.path());
        let mut wizard = Wizard::new(
            layout,
            Settings {
                packages_dir: root_file,
            },
        );

        wizard.handle_key(key(KeyCode::Down)).unwrap();
        let err = wizard.handle_key(key(KeyCode::Enter)).unwrap_err();
        assert!(!err.is_recoverable());
        assert!(wizard.validation_error().is_none());
    }
}
