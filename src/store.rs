//! Package directory store.
//!
//! Every package lives in `<packages root>/<sanitized name>/`. The store lists
//! those directories for the menus and creates fresh ones for new packages.
//!
//! # Collision handling
//!
//! Creating a package whose directory already exists is destructive: the
//! existing directory and every sibling whose name starts with the same
//! sanitized prefix are removed before the new directory is created. There is
//! no merge and no versioning.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::error::{NexusError, Result, ValidationError};
use crate::sanitize::{display_name, sanitize_package_name};

/// One package directory on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Directory name under the packages root
    pub dir_name: String,
    /// Human label derived from the directory name
    pub display_name: String,
    /// Last modification time of the directory
    pub modified: SystemTime,
}

/// Ordering for package listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Most recently modified first
    #[default]
    MostRecent,
    /// Alphabetical by directory name
    Name,
}

/// Lists, creates and removes package directories under one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The packages root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the packages root if it does not exist
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            NexusError::io(
                format!("failed to create packages directory {}", self.root.display()),
                e,
            )
        })
    }

    /// All package directories, creating the root first if needed
    pub fn entries(&self, order: ListOrder) -> Result<Vec<PackageEntry>> {
        self.ensure_root()?;
        self.read_entries(order)
    }

    /// Display names of all packages, most recent first
    pub fn list_packages(&self) -> Result<Vec<String>> {
        Ok(self
            .entries(ListOrder::MostRecent)?
            .into_iter()
            .map(|entry| entry.display_name)
            .collect())
    }

    /// Display names of the `count` most recently modified packages.
    ///
    /// Unlike [`Self::list_packages`] this never creates the root; a missing
    /// root simply has no recent packages.
    pub fn recent_packages(&self, count: usize) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        Ok(self
            .read_entries(ListOrder::MostRecent)?
            .into_iter()
            .take(count)
            .map(|entry| entry.display_name)
            .collect())
    }

    /// Path a package with this name would occupy.
    ///
    /// Fails when the name sanitizes to nothing.
    pub fn package_dir(&self, name: &str) -> Result<PathBuf> {
        let sanitized = sanitize_package_name(name);
        if sanitized.is_empty() {
            return Err(ValidationError::EmptyPackageName.into());
        }
        Ok(self.root.join(sanitized))
    }

    /// Create a fresh, empty directory for a package.
    ///
    /// An existing directory with the same sanitized name is deleted first,
    /// together with any same-prefix siblings. Failing to remove the exact
    /// match or to create the directory is fatal; sibling removal is best-effort.
    pub fn create_package_directory(&self, name: &str) -> Result<PathBuf> {
        let package_dir = self.package_dir(name)?;

        if package_dir.exists() {
            info!(
                "Package directory {} already exists, replacing it",
                package_dir.display()
            );
            self.remove_prefix_siblings(name);
            if package_dir.exists() {
                remove_path(&package_dir).map_err(|e| {
                    NexusError::io(
                        format!(
                            "failed to remove existing package directory {}",
                            package_dir.display()
                        ),
                        e,
                    )
                })?;
            }
        }

        fs::create_dir_all(&package_dir).map_err(|e| {
            NexusError::io(
                format!("failed to create package directory {}", package_dir.display()),
                e,
            )
        })?;

        debug!("Created package directory {}", package_dir.display());
        Ok(package_dir)
    }

    /// Entries [`Self::create_package_directory`] would delete for `name`.
    ///
    /// Empty unless the exact package directory already exists; otherwise
    /// every root entry sharing its sanitized prefix, the directory included.
    pub fn replaced_by(&self, name: &str) -> Result<Vec<PathBuf>> {
        let package_dir = self.package_dir(name)?;
        if !package_dir.exists() {
            return Ok(Vec::new());
        }
        let Some(prefix) = package_dir.file_name().and_then(|n| n.to_str()) else {
            return Ok(vec![package_dir]);
        };

        let entries = fs::read_dir(&self.root).map_err(|e| {
            NexusError::io(
                format!("failed to read packages directory {}", self.root.display()),
                e,
            )
        })?;
        let mut replaced: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
            .map(|entry| entry.path())
            .collect();
        replaced.sort();
        Ok(replaced)
    }

    /// Whether creating `name` would delete `path` or a directory holding it
    pub fn would_remove(&self, name: &str, path: &Path) -> Result<bool> {
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(self.replaced_by(name)?.iter().any(|entry| {
            let entry = fs::canonicalize(entry).unwrap_or_else(|_| entry.clone());
            target.starts_with(entry)
        }))
    }

    fn remove_prefix_siblings(&self, name: &str) {
        let replaced = match self.replaced_by(name) {
            Ok(replaced) => replaced,
            Err(e) => {
                warn!("Could not scan {} for stale packages: {}", self.root.display(), e);
                return;
            }
        };
        for path in replaced {
            remove_directory(&path);
        }
    }

    fn read_entries(&self, order: ListOrder) -> Result<Vec<PackageEntry>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            NexusError::io(
                format!("failed to read packages directory {}", self.root.display()),
                e,
            )
        })?;

        let mut packages: Vec<PackageEntry> = entries
            .flatten()
            .filter_map(|entry| {
                let metadata = entry.metadata().ok()?;
                if !metadata.is_dir() {
                    return None;
                }
                let dir_name = entry.file_name().to_string_lossy().into_owned();
                Some(PackageEntry {
                    display_name: display_name(&dir_name),
                    modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                    dir_name,
                })
            })
            .collect();

        match order {
            ListOrder::MostRecent => packages.sort_by(|a, b| {
                b.modified
                    .cmp(&a.modified)
                    .then_with(|| a.dir_name.cmp(&b.dir_name))
            }),
            ListOrder::Name => packages.sort_by(|a, b| a.dir_name.cmp(&b.dir_name)),
        }

        Ok(packages)
    }
}

/// Best-effort recursive delete; failures are logged and reported as `false`
pub fn remove_directory(path: &Path) -> bool {
    match remove_path(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            false
        }
    }
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
