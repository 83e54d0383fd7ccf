//! Packaging tool invocation.
//!
//! The `.intunewin` archive is produced by Microsoft's Win32 Content Prep
//! Tool. This module is the only place that launches it.
//!
//! # Contract
//!
//! - Arguments come from [`PackagerArgs::to_cli_args`]: `-c <dir> -s <installer> -o <dir> -q`
//! - The tool runs once, blocking, with stdout and stderr captured
//! - A launch failure or non-zero exit is a [`NexusError::Subprocess`]
//!   carrying the captured output; there is no retry

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, error, info};

use crate::config::Layout;
use crate::download::download_file;
use crate::error::{NexusError, Result};

/// Extension of the archive the tool writes
pub const INTUNEWIN_EXTENSION: &str = "intunewin";

/// Typed arguments for one packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerArgs {
    /// Folder whose contents go into the archive
    pub content_dir: PathBuf,
    /// Setup file inside `content_dir`
    pub setup_file: PathBuf,
    /// Folder receiving the archive
    pub output_dir: PathBuf,
    /// Suppress the tool's interactive prompts
    pub quiet: bool,
}

impl PackagerArgs {
    /// Package a directory in place: content and output are both `package_dir`
    pub fn for_package(package_dir: &Path, setup_file: &Path) -> Self {
        Self {
            content_dir: package_dir.to_path_buf(),
            setup_file: setup_file.to_path_buf(),
            output_dir: package_dir.to_path_buf(),
            quiet: true,
        }
    }

    /// Arguments exactly as the tool expects them
    pub fn to_cli_args(&self) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("-c"),
            self.content_dir.clone().into_os_string(),
            OsString::from("-s"),
            self.setup_file.clone().into_os_string(),
            OsString::from("-o"),
            self.output_dir.clone().into_os_string(),
        ];
        if self.quiet {
            args.push(OsString::from("-q"));
        }
        args
    }

    /// Archive path the tool produces: the setup file's stem in `output_dir`
    pub fn expected_output(&self) -> PathBuf {
        let stem = self
            .setup_file
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        self.output_dir
            .join(stem)
            .with_extension(INTUNEWIN_EXTENSION)
    }
}

/// Captured result of a successful packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerOutput {
    /// Standard output followed by standard error
    pub output: String,
    /// Exit code (None if terminated by signal)
    pub exit_code: Option<i32>,
}

/// Run the packaging tool and wait for it
pub fn run_packager(exe: &Path, args: &PackagerArgs) -> Result<PackagerOutput> {
    let program = exe
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| exe.display().to_string());
    let cli_args = args.to_cli_args();

    info!("Running {} args={:?}", exe.display(), cli_args);

    let output = Command::new(exe)
        .args(&cli_args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            error!("Failed to launch {}: {}", exe.display(), e);
            NexusError::Subprocess {
                program: program.clone(),
                status: format!("failed to start: {}", e),
                output: String::new(),
            }
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let exit_code = output.status.code();

    if output.status.success() {
        debug!("{} finished successfully", program);
        Ok(PackagerOutput {
            output: combined,
            exit_code,
        })
    } else {
        let status = match exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        error!("{} failed with {}", program, status);
        Err(NexusError::Subprocess {
            program,
            status,
            output: combined,
        })
    }
}

/// Make sure the packaging tool exists, downloading it once if absent.
///
/// Returns `true` when a download happened.
pub fn ensure_packager(layout: &Layout) -> Result<bool> {
    if layout.packager_exe.is_file() {
        return Ok(false);
    }

    info!(
        "{} not found, fetching from {}",
        layout.packager_exe.display(),
        layout.packager_url
    );
    download_file(&layout.packager_url, &layout.packager_exe)?;
    Ok(true)
}
