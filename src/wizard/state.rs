//! Wizard state definitions
//!
//! One variant per screen. Each variant carries exactly the data collected so
//! far, so a step can never see a field that belongs to another sub-flow.

use std::path::{Path, PathBuf};

use crate::complete::Completion;
use crate::store::PackageEntry;
use crate::types::{InstallSource, InstallerKind};
use crate::validate::InstallerInput;

/// Single-line text buffer with the last completion candidates
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextInput {
    pub value: String,
    /// Shown under the input after a Tab press with several matches
    pub candidates: Vec<String>,
}

impl TextInput {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            candidates: Vec::new(),
        }
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
        self.candidates.clear();
    }

    pub fn backspace(&mut self) {
        self.value.pop();
        self.candidates.clear();
    }

    /// Replace the buffer with a completion result
    pub fn apply(&mut self, completion: Completion) {
        self.value = completion.buffer;
        self.candidates = if completion.candidates.len() > 1 {
            completion.candidates
        } else {
            Vec::new()
        };
    }
}

/// Sub-state of the "Set Packages Directory" screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryStep {
    /// Default or custom
    Choose { cursor: usize },
    /// Typing a custom directory
    Typing { input: TextInput },
}

/// Current wizard screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    SelectOperation {
        cursor: usize,
    },
    SetDirectory(DirectoryStep),
    SelectSource {
        cursor: usize,
    },
    SelectInstallerType {
        source: InstallSource,
        cursor: usize,
    },
    EnterName {
        source: InstallSource,
        kind: InstallerKind,
        input: TextInput,
    },
    EnterInstaller {
        source: InstallSource,
        kind: InstallerKind,
        /// Package name as typed
        name: String,
        input: TextInput,
    },
    SelectExistingPackage {
        packages: Vec<PackageEntry>,
        cursor: usize,
    },
    Review {
        plan: PackagePlan,
        cursor: usize,
    },
}

impl Default for Step {
    fn default() -> Self {
        Self::SelectOperation { cursor: 0 }
    }
}

impl Step {
    /// Screen heading
    pub fn title(&self) -> &'static str {
        match self {
            Self::SelectOperation { .. } => "Select Operation",
            Self::SetDirectory(_) => "Set Packages Directory",
            Self::SelectSource { .. } => "Select Installation Source",
            Self::SelectInstallerType { .. } => "Select Installer Type",
            Self::EnterName { .. } => "Package Name",
            Self::EnterInstaller { source, .. } => match source {
                InstallSource::LocalFile => "Installer Path",
                InstallSource::DownloadUrl => "Download URL",
            },
            Self::SelectExistingPackage { .. } => "Select Package to Repackage",
            Self::Review { .. } => "Review Configuration",
        }
    }

    /// The text buffer of input steps
    pub fn text_input(&self) -> Option<&TextInput> {
        match self {
            Self::EnterName { input, .. }
            | Self::EnterInstaller { input, .. }
            | Self::SetDirectory(DirectoryStep::Typing { input }) => Some(input),
            _ => None,
        }
    }

    pub fn text_input_mut(&mut self) -> Option<&mut TextInput> {
        match self {
            Self::EnterName { input, .. }
            | Self::EnterInstaller { input, .. }
            | Self::SetDirectory(DirectoryStep::Typing { input }) => Some(input),
            _ => None,
        }
    }

    /// Highlighted menu row of menu steps
    pub fn cursor(&self) -> Option<usize> {
        match self {
            Self::SelectOperation { cursor }
            | Self::SetDirectory(DirectoryStep::Choose { cursor })
            | Self::SelectSource { cursor }
            | Self::SelectInstallerType { cursor, .. }
            | Self::SelectExistingPackage { cursor, .. }
            | Self::Review { cursor, .. } => Some(*cursor),
            _ => None,
        }
    }

    pub fn cursor_mut(&mut self) -> Option<&mut usize> {
        match self {
            Self::SelectOperation { cursor }
            | Self::SetDirectory(DirectoryStep::Choose { cursor })
            | Self::SelectSource { cursor }
            | Self::SelectInstallerType { cursor, .. }
            | Self::SelectExistingPackage { cursor, .. }
            | Self::Review { cursor, .. } => Some(cursor),
            _ => None,
        }
    }
}

/// A fully collected, confirmed-or-pending unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagePlan {
    /// Build a new package from an installer
    New {
        /// Package name as typed
        name: String,
        kind: InstallerKind,
        input: InstallerInput,
        /// Freshly created package directory
        output_dir: PathBuf,
    },
    /// Rebuild the archive of an existing package directory
    Repackage {
        /// Display name of the package
        name: String,
        output_dir: PathBuf,
    },
}

impl PackagePlan {
    pub fn name(&self) -> &str {
        match self {
            Self::New { name, .. } | Self::Repackage { name, .. } => name,
        }
    }

    pub fn output_dir(&self) -> &Path {
        match self {
            Self::New { output_dir, .. } | Self::Repackage { output_dir, .. } => output_dir,
        }
    }

    pub fn is_repackage(&self) -> bool {
        matches!(self, Self::Repackage { .. })
    }
}

/// What the caller should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading keys
    Continue,
    /// Operator cancelled
    Quit,
    /// Operator confirmed; leave the terminal and run the plan
    Execute(PackagePlan),
}
