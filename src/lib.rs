//! Nexus library
//!
//! Core of the Intune Win32 packaging wizard: the step state machine, the
//! package store, MSI metadata, script generation and the packaging tool
//! invocation. The binary only wires these to the terminal.

pub mod app;
pub mod cli;
pub mod complete;
pub mod config;
pub mod download;
pub mod error;
pub mod executor;
pub mod msi;
pub mod packager;
pub mod sanitize;
pub mod scripts;
pub mod store;
pub mod theme;
pub mod types;
pub mod ui;
pub mod validate;
pub mod wizard;

// Re-export main types for convenience
pub use config::{Layout, Settings};
pub use error::{MetadataError, NexusError, Result, ValidationError};
pub use executor::{PackageReport, execute_plan, print_summary};
pub use msi::{MetadataSource, ProductMetadata, WindowsInstaller};
pub use packager::{PackagerArgs, ensure_packager, run_packager};
pub use sanitize::sanitize_package_name;
pub use store::{ListOrder, PackageEntry, PackageStore};
pub use types::{InstallSource, InstallerKind, Operation};
pub use validate::{InstallerInput, validate_input};
pub use wizard::{Outcome, PackagePlan, Step, Wizard};
