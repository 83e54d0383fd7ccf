//! Filesystem layout and persisted settings.
//!
//! [`Layout`] holds every well-known path the tool touches. It is built once
//! from a root directory and passed down, so nothing in the crate hardcodes
//! `C:\ProgramData\Nexus`. [`Settings`] is the one-field JSON document that
//! remembers the operator's packages directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{NexusError, Result};

/// Official download location of the Win32 Content Prep Tool
pub const PACKAGER_URL: &str =
    "https://github.com/microsoft/Microsoft-Win32-Content-Prep-Tool/raw/master/IntuneWinAppUtil.exe";

/// File name of the packaging executable inside the tools directory
pub const PACKAGER_EXE: &str = "IntuneWinAppUtil.exe";

/// Well-known directories and files under the Nexus root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Root of all Nexus data
    pub root: PathBuf,
    /// Holds the packaging executable
    pub tools_dir: PathBuf,
    /// Default packages root (used when no setting overrides it)
    pub default_packages_dir: PathBuf,
    /// Staging area for downloaded installers
    pub downloads_dir: PathBuf,
    /// Log file directory
    pub logs_dir: PathBuf,
    /// Persisted [`Settings`]
    pub settings_file: PathBuf,
    /// Path of the packaging executable
    pub packager_exe: PathBuf,
    /// Where to fetch the packaging executable when it is missing
    pub packager_url: String,
}

impl Layout {
    /// Derive every path from a root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let tools_dir = root.join("Tools");
        Self {
            packager_exe: tools_dir.join(PACKAGER_EXE),
            tools_dir,
            default_packages_dir: root.join("Packages"),
            downloads_dir: root.join("Downloads"),
            logs_dir: root.join("Logs"),
            settings_file: root.join("config.json"),
            packager_url: PACKAGER_URL.to_string(),
            root,
        }
    }

    /// Platform default root.
    ///
    /// `C:\ProgramData\Nexus` on Windows; the user data directory elsewhere,
    /// falling back to `./nexus` when none is known.
    pub fn default_root() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(r"C:\ProgramData\Nexus")
        } else {
            dirs::data_dir()
                .map(|dir| dir.join("nexus"))
                .unwrap_or_else(|| PathBuf::from("nexus"))
        }
    }

    /// Create the root, tools, default packages, downloads and logs directories
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.root,
            &self.tools_dir,
            &self.default_packages_dir,
            &self.downloads_dir,
            &self.logs_dir,
        ] {
            fs::create_dir_all(dir).map_err(|e| {
                NexusError::io(format!("failed to create directory {}", dir.display()), e)
            })?;
        }
        debug!("Nexus directories ready under {}", self.root.display());
        Ok(())
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

/// Persisted operator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory holding one subdirectory per package
    pub packages_dir: PathBuf,
}

impl Settings {
    /// Settings pointing at the layout's default packages directory
    pub fn defaults(layout: &Layout) -> Self {
        Self {
            packages_dir: layout.default_packages_dir.clone(),
        }
    }

    /// Load settings from a JSON file.
    ///
    /// A missing file is `Ok(None)`. Unreadable or malformed files, and files
    /// with an empty `packages_dir`, are configuration errors.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(NexusError::config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let settings: Self = serde_json::from_str(&content).map_err(|e| {
            NexusError::config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if settings.packages_dir.as_os_str().is_empty() {
            return Err(NexusError::config(format!(
                "{} has an empty packages_dir",
                path.display()
            )));
        }

        Ok(Some(settings))
    }

    /// Load settings, falling back to defaults.
    ///
    /// Returns the warning to surface when the file existed but could not be used.
    pub fn load_or_default(layout: &Layout) -> (Self, Option<NexusError>) {
        match Self::load(&layout.settings_file) {
            Ok(Some(settings)) => {
                debug!(
                    "Loaded packages directory {} from {}",
                    settings.packages_dir.display(),
                    layout.settings_file.display()
                );
                (settings, None)
            }
            Ok(None) => (Self::defaults(layout), None),
            Err(e) => {
                warn!("Falling back to default settings: {}", e);
                (Self::defaults(layout), Some(e))
            }
        }
    }

    /// Write settings as JSON, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                NexusError::io(format!("failed to create {}", parent.display()), e)
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .map_err(|e| NexusError::io(format!("failed to write {}", path.display()), e))?;

        debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths_derive_from_root() {
        let layout = Layout::new("/srv/nexus");
        assert_eq!(layout.default_packages_dir, PathBuf::from("/srv/nexus/Packages"));
        assert_eq!(layout.downloads_dir, PathBuf::from("/srv/nexus/Downloads"));
        assert_eq!(
            layout.packager_exe,
            PathBuf::from("/srv/nexus/Tools/IntuneWinAppUtil.exe")
        );
        assert_eq!(layout.settings_file, PathBuf::from("/srv/nexus/config.json"));
        assert_eq!(layout.packager_url, PACKAGER_URL);
    }

    #[test]
    fn test_ensure_dirs_creates_tree() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path().join("root"));
        layout.ensure_dirs().unwrap();
        assert!(layout.tools_dir.is_dir());
        assert!(layout.default_packages_dir.is_dir());
        assert!(layout.downloads_dir.is_dir());
        assert!(layout.logs_dir.is_dir());
    }

    #[test]
    fn test_settings_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        let settings = Settings {
            packages_dir: tmp.path().join("custom"),
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), Some(settings));
    }

    #[test]
    fn test_settings_json_shape() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        Settings {
            packages_dir: PathBuf::from("/data/pkgs"),
        }
        .save(&path)
        .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["packages_dir"], "/data/pkgs");
    }

    #[test]
    fn test_missing_settings_file_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path());
        assert_eq!(Settings::load(&layout.settings_file).unwrap(), None);

        let (settings, warning) = Settings::load_or_default(&layout);
        assert_eq!(settings.packages_dir, layout.default_packages_dir);
        assert!(warning.is_none());
    }

    #[test]
    fn test_malformed_settings_fall_back_with_warning() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path());
        fs::write(&layout.settings_file, "{ not json").unwrap();

        let (settings, warning) = Settings::load_or_default(&layout);
        assert_eq!(settings, Settings::defaults(&layout));
        assert!(matches!(warning, Some(NexusError::Config(_))));
    }

    #[test]
    fn test_empty_packages_dir_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path());
        fs::write(&layout.settings_file, r#"{"packages_dir": ""}"#).unwrap();

        let (settings, warning) = Settings::load_or_default(&layout);
        assert_eq!(settings.packages_dir, layout.default_packages_dir);
        assert!(warning.is_some());
    }
}
