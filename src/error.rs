//! Error handling module for Nexus
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Validation and metadata failures carry their own enums so the wizard can
//! report them inline; everything else collapses into [`NexusError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::types::InstallerKind;

/// Main error type for Nexus
#[derive(Error, Debug)]
pub enum NexusError {
    /// Bad URL, path, extension, or package name (re-prompt)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors with the operation that failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Bare IO errors (terminal, stdout)
    #[error("IO error: {0}")]
    RawIo(#[from] std::io::Error),

    /// MSI property query failure (proceed without detection metadata)
    #[error("Metadata extraction failed: {0}")]
    Metadata(#[from] MetadataError),

    /// Packaging tool failed to launch or exited non-zero
    #[error("{program} failed ({status})")]
    Subprocess {
        program: String,
        status: String,
        output: String,
    },

    /// Malformed or unreadable settings file
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP download failure
    #[error("Download failed: {0}")]
    Download(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for Nexus operations
pub type Result<T> = std::result::Result<T, NexusError>;

impl NexusError {
    /// Create an IO error annotated with what was being attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a download error
    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Whether the session can carry on after this error.
    ///
    /// Validation, metadata and configuration problems are shown inline;
    /// IO, subprocess, download and terminal failures abort the operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Metadata(_) | Self::Config(_)
        )
    }
}

/// Rejected operator input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL must start with 'https://'")]
    InvalidUrl,

    #[error("invalid file path: {0}")]
    InvalidPath(String),

    #[error("file must have .{} extension", .expected.extension())]
    ExtensionMismatch { expected: InstallerKind },

    #[error("file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("package name must contain letters or digits")]
    EmptyPackageName,

    #[error("No existing packages found")]
    NoPackages,

    #[error("installer {} would be deleted when the package directory is replaced; move it elsewhere first", .0.display())]
    InstallerInPackageDirectory(PathBuf),
}

/// Failure while reading properties from an MSI database
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("failed to open MSI database {} (code {code})", .path.display())]
    Open { path: PathBuf, code: u32 },

    #[error("failed to {stage} for property {property} (code {code})")]
    Query {
        property: String,
        stage: QueryStage,
        code: u32,
    },

    #[error("property {0} not present in the MSI database")]
    MissingProperty(String),

    #[error("MSI metadata extraction is only available on Windows")]
    Unsupported,
}

/// The step of a property query that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum QueryStage {
    #[strum(serialize = "open view")]
    OpenView,
    #[strum(serialize = "execute view")]
    Execute,
    #[strum(serialize = "fetch record")]
    Fetch,
    #[strum(serialize = "read value")]
    ReadValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NexusError::config("packages_dir is empty");
        assert_eq!(err.to_string(), "Configuration error: packages_dir is empty");

        let err: NexusError = ValidationError::InvalidUrl.into();
        assert_eq!(
            err.to_string(),
            "Validation error: URL must start with 'https://'"
        );
    }

    #[test]
    fn test_extension_mismatch_names_expected_kind() {
        let err = ValidationError::ExtensionMismatch {
            expected: InstallerKind::Msi,
        };
        assert_eq!(err.to_string(), "file must have .msi extension");
    }

    #[test]
    fn test_io_error_carries_context() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = NexusError::io("failed to create package directory", io_err);
        assert!(err.to_string().starts_with("failed to create package directory"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(NexusError::from(ValidationError::NoPackages).is_recoverable());
        assert!(NexusError::from(MetadataError::Unsupported).is_recoverable());
        assert!(NexusError::config("bad json").is_recoverable());
        assert!(!NexusError::download("404").is_recoverable());
        assert!(
            !NexusError::Subprocess {
                program: "IntuneWinAppUtil.exe".into(),
                status: "exit code 1".into(),
                output: String::new(),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_query_stage_display() {
        let err = MetadataError::Query {
            property: "ProductCode".into(),
            stage: QueryStage::Fetch,
            code: 259,
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch record for property ProductCode (code 259)"
        );
    }
}
