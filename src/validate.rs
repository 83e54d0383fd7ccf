//! Operator input validation.
//!
//! Validation never aborts the session: the wizard shows the error inline and
//! keeps the current step.

use std::path::{Path, PathBuf};

use crate::error::ValidationError;
use crate::sanitize::sanitize_package_name;
use crate::types::{InstallSource, InstallerKind};

/// A validated installer location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerInput {
    /// Absolute path to an existing installer file
    Local(PathBuf),
    /// `https://` download URL
    Remote(String),
}

impl InstallerInput {
    /// The path or URL as typed into the summary
    pub fn display(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Remote(url) => url.clone(),
        }
    }
}

/// Check an installer path or URL against the chosen source and kind.
///
/// - Downloads must start with `https://` (case-insensitive)
/// - Local files must resolve to an absolute path, carry the kind's
///   extension, and exist
pub fn validate_input(
    source: InstallSource,
    kind: InstallerKind,
    text: &str,
) -> Result<InstallerInput, ValidationError> {
    let text = strip_quotes(text.trim());

    match source {
        InstallSource::DownloadUrl => {
            if !text.to_ascii_lowercase().starts_with("https://") {
                return Err(ValidationError::InvalidUrl);
            }
            Ok(InstallerInput::Remote(text.to_string()))
        }
        InstallSource::LocalFile => {
            let path = std::path::absolute(Path::new(text))
                .map_err(|e| ValidationError::InvalidPath(e.to_string()))?;

            if InstallerKind::from_path(&path) != Some(kind) {
                return Err(ValidationError::ExtensionMismatch { expected: kind });
            }

            if !path.is_file() {
                return Err(ValidationError::FileNotFound(PathBuf::from(text)));
            }

            Ok(InstallerInput::Local(path))
        }
    }
}

/// Check a package name and return its sanitized form
pub fn validate_package_name(name: &str) -> Result<String, ValidationError> {
    let sanitized = sanitize_package_name(name);
    if sanitized.is_empty() {
        return Err(ValidationError::EmptyPackageName);
    }
    Ok(sanitized)
}

// Explorer's "Copy as path" wraps paths in double quotes
fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}
