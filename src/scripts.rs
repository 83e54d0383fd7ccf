//! Install and uninstall script generation.
//!
//! `Install.ps1` is rendered from an embedded template with four
//! placeholders. `Uninstall.ps1` is synthesized per installer kind; for MSI
//! packages it embeds the product code, or a literal `{PRODUCT_CODE}` token
//! for the operator to fill in when the code is unknown.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{NexusError, Result};
use crate::types::InstallerKind;

/// File name of the generated install script
pub const INSTALL_SCRIPT: &str = "Install.ps1";

/// File name of the generated uninstall script
pub const UNINSTALL_SCRIPT: &str = "Uninstall.ps1";

/// Version written when none is known
pub const DEFAULT_VERSION: &str = "1.0";

/// Stand-in for an unknown MSI product code
pub const PRODUCT_CODE_PLACEHOLDER: &str = "{PRODUCT_CODE}";

/// Stand-in for an EXE package's uninstaller
pub const EXE_UNINSTALLER_PLACEHOLDER: &str = r"C:\Program Files\AppName\uninstall.exe";

const INSTALL_TEMPLATE: &str = include_str!("../templates/Install-Script.ps1");

const UNINSTALL_PREAMBLE: &str = r#"
$company = "Nexus"
$app_title = "<APP_TITLE>"
$logging_path = "C:\ProgramData\$company\$app_title"
$script_name = (Get-Item $PSCommandPath).Basename
$log_file = "$logging_path\$script_name.log"

function write_log {
    param ([string]$log_string)
    $timestamp = Get-Date
    $formatted_log = "$timestamp $log_string"
    try {
        Add-Content $log_file -Value $formatted_log -ErrorAction SilentlyContinue
    }
    catch {
        Write-Host $formatted_log
    }
}

write_log "Starting uninstall of $app_title"
"#;

const MSI_UNINSTALL: &str = r#"$product_code = "<PRODUCT_CODE>"
try {
    $process = Start-Process "msiexec.exe" -ArgumentList "/x $product_code /qn /norestart" -Wait -PassThru
"#;

const EXE_UNINSTALL: &str = r#"$uninstall_path = "<UNINSTALL_PATH>"
try {
    $process = Start-Process $uninstall_path -ArgumentList "/silent" -Wait -PassThru
"#;

const UNINSTALL_RESULT: &str = r#"    if ($process.ExitCode -eq 0) {
        write_log "Successfully uninstalled $app_title"
    } else {
        write_log "Uninstall failed with exit code: $($process.ExitCode)"
        exit 1
    }
} catch {
    write_log "Error during uninstall: $($_.Exception.Message)"
    exit 1
}
"#;

/// Inputs for both scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptParams<'a> {
    /// Application title as typed by the operator
    pub app_title: &'a str,
    /// Product version; [`DEFAULT_VERSION`] when `None` or empty
    pub version: Option<&'a str>,
    pub kind: InstallerKind,
    /// MSI product code; the placeholder token when `None` or empty
    pub product_code: Option<&'a str>,
}

/// Paths of the scripts written into a package directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageScripts {
    pub install: PathBuf,
    pub uninstall: PathBuf,
}

/// Fill the install template
pub fn render_install_script(params: &ScriptParams<'_>) -> String {
    let version = params
        .version
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VERSION);

    INSTALL_TEMPLATE
        .replace("<APP_TITLE>", params.app_title)
        .replace("<VERSION>", version)
        .replace("<INSTALLER_TYPE>", &params.kind.to_string())
        .replace("<INSTALL_ARGS>", params.kind.default_install_args())
}

/// Build the uninstall script for the installer kind
pub fn render_uninstall_script(params: &ScriptParams<'_>) -> String {
    let invocation = match params.kind {
        InstallerKind::Msi => {
            let code = params
                .product_code
                .filter(|c| !c.is_empty())
                .unwrap_or(PRODUCT_CODE_PLACEHOLDER);
            MSI_UNINSTALL.replace("<PRODUCT_CODE>", code)
        }
        InstallerKind::Exe => EXE_UNINSTALL.replace("<UNINSTALL_PATH>", EXE_UNINSTALLER_PLACEHOLDER),
    };

    let mut script = UNINSTALL_PREAMBLE.replace("<APP_TITLE>", params.app_title);
    script.push_str(&invocation);
    script.push_str(UNINSTALL_RESULT);
    script
}

/// Write both scripts into `dir`, overwriting existing files
pub fn write_scripts(dir: &Path, params: &ScriptParams<'_>) -> Result<PackageScripts> {
    let install = dir.join(INSTALL_SCRIPT);
    fs::write(&install, render_install_script(params))
        .map_err(|e| NexusError::io("failed to create install script", e))?;

    let uninstall = dir.join(UNINSTALL_SCRIPT);
    fs::write(&uninstall, render_uninstall_script(params))
        .map_err(|e| NexusError::io("failed to create uninstall script", e))?;

    debug!("Wrote {} and {} to {}", INSTALL_SCRIPT, UNINSTALL_SCRIPT, dir.display());
    Ok(PackageScripts { install, uninstall })
}
