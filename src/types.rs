//! Type-safe menu choices for the packaging wizard
//!
//! Each menu the wizard shows is backed by one of these enums, so the
//! state machine matches on variants instead of comparing label strings.

use std::path::Path;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Top-level operation picked on the first screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Display, EnumString, EnumIter)]
pub enum Operation {
    #[default]
    #[strum(serialize = "New Application Package")]
    NewPackage,
    #[strum(serialize = "Repackage Application")]
    RepackageExisting,
    #[strum(serialize = "Set Packages Directory")]
    SetPackagesDirectory,
}

/// Where the installer comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Display, EnumString, EnumIter)]
pub enum InstallSource {
    #[default]
    #[strum(serialize = "Local File")]
    LocalFile,
    #[strum(serialize = "Download File")]
    DownloadUrl,
}

/// Installer technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum InstallerKind {
    #[default]
    #[strum(serialize = "MSI")]
    Msi,
    #[strum(serialize = "EXE")]
    Exe,
}

impl InstallerKind {
    /// Lowercase file extension without the dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Msi => "msi",
            Self::Exe => "exe",
        }
    }

    /// Silent-install arguments written into Install.ps1
    pub const fn default_install_args(self) -> &'static str {
        match self {
            Self::Msi => "/qn /norestart",
            Self::Exe => "/silent",
        }
    }

    /// Human description of [`Self::default_install_args`]
    pub const fn install_args_description(self) -> &'static str {
        match self {
            Self::Msi => "silent install, no restart",
            Self::Exe => "silent install",
        }
    }

    /// Infer the kind from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::iter().find(|kind| kind.extension() == ext)
    }
}

/// Options on the "Set Packages Directory" screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Display, EnumString, EnumIter)]
pub enum DirectoryChoice {
    #[default]
    #[strum(serialize = "Use Default Directory")]
    UseDefault,
    #[strum(serialize = "Set Custom Directory")]
    Custom,
}

/// Options on the review screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(EnumIter)]
pub enum ConfirmChoice {
    #[default]
    Proceed,
    StartOver,
}

impl ConfirmChoice {
    /// Menu label; the proceed wording depends on the operation
    pub const fn label(self, repackage: bool) -> &'static str {
        match (self, repackage) {
            (Self::Proceed, false) => "Yes, create package",
            (Self::Proceed, true) => "Yes, repackage application",
            (Self::StartOver, _) => "No, start over",
        }
    }
}

/// Labels of any strum-iterable menu enum, in declaration order
pub fn menu_labels<T: IntoEnumIterator + std::fmt::Display>() -> Vec<String> {
    T::iter().map(|item| item.to_string()).collect()
}

/// The `index`th variant of a menu enum
pub fn menu_item<T: IntoEnumIterator>(index: usize) -> Option<T> {
    T::iter().nth(index)
}
