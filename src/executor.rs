//! Runs a confirmed [`PackagePlan`].
//!
//! Every step blocks and reports progress as indented status lines on the
//! given writer. Metadata failures only warn; any other failure stops the
//! plan and is returned to the caller.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Layout;
use crate::download::download_file;
use crate::error::{NexusError, Result};
use crate::msi::{MetadataSource, PRODUCT_CODE, PRODUCT_VERSION, ProductMetadata};
use crate::packager::{INTUNEWIN_EXTENSION, PackagerArgs, run_packager};
use crate::sanitize::sanitize_package_name;
use crate::scripts::{INSTALL_SCRIPT, ScriptParams, UNINSTALL_SCRIPT, write_scripts};
use crate::types::InstallerKind;
use crate::validate::InstallerInput;
use crate::wizard::PackagePlan;

const INDENT: &str = "    ";

/// Everything the final summary needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// Package name as typed (or the display name when repackaging)
    pub name: String,
    pub kind: InstallerKind,
    /// Path or URL the installer came from
    pub source: String,
    /// `None` for EXE installers and when extraction failed
    pub metadata: Option<ProductMetadata>,
    pub installer_file: PathBuf,
    pub intunewin_file: PathBuf,
    pub package_dir: PathBuf,
}

/// Run a plan to completion
pub fn execute_plan(
    plan: &PackagePlan,
    layout: &Layout,
    metadata: &dyn MetadataSource,
    out: &mut dyn Write,
) -> Result<PackageReport> {
    info!("Executing plan for {}", plan.name());
    writeln!(out, "\nCreating Package\n\nActions:")?;

    match plan {
        PackagePlan::New {
            name,
            kind,
            input,
            output_dir,
        } => build_new_package(name, *kind, input, output_dir, layout, metadata, out),
        PackagePlan::Repackage { name, output_dir } => {
            repackage(name, output_dir, layout, metadata, out)
        }
    }
}

fn build_new_package(
    name: &str,
    kind: InstallerKind,
    input: &InstallerInput,
    package_dir: &Path,
    layout: &Layout,
    metadata: &dyn MetadataSource,
    out: &mut dyn Write,
) -> Result<PackageReport> {
    let sanitized = sanitize_package_name(name);
    let installer_name = format!("{}.{}", sanitized, kind.extension());
    let installer_path = package_dir.join(&installer_name);

    let staged = match input {
        InstallerInput::Local(path) => path.clone(),
        InstallerInput::Remote(url) => {
            let download_path = layout.downloads_dir.join(&installer_name);
            writeln!(out, "{INDENT}• Downloading installer file...")?;
            writeln!(out, "{INDENT}  - URL: {}", url)?;
            writeln!(out, "{INDENT}  - Temporary location: {}", download_path.display())?;
            download_file(url, &download_path)?;
            if !download_path.is_file() {
                return Err(NexusError::download(format!(
                    "{} not found after download",
                    download_path.display()
                )));
            }
            writeln!(out, "{INDENT}  - Download complete")?;
            download_path
        }
    };

    writeln!(out, "{INDENT}• Preparing package directory...")?;
    writeln!(out, "{INDENT}  - Using: {}", package_dir.display())?;
    writeln!(out, "{INDENT}• Copying installer file...")?;
    writeln!(out, "{INDENT}  - Source: {}", staged.display())?;
    writeln!(out, "{INDENT}  - Destination: {}", installer_path.display())?;
    fs::copy(&staged, &installer_path).map_err(|e| {
        NexusError::io(
            format!(
                "failed to copy {} to {}",
                staged.display(),
                installer_path.display()
            ),
            e,
        )
    })?;

    let product = extract_metadata(kind, &installer_path, metadata, out)?;

    writeln!(out, "{INDENT}• Creating installation scripts...")?;
    write_scripts(
        package_dir,
        &ScriptParams {
            app_title: name,
            version: product.as_ref().map(|m| m.product_version.as_str()),
            kind,
            product_code: product.as_ref().map(|m| m.product_code.as_str()),
        },
    )?;
    writeln!(out, "{INDENT}  - {INSTALL_SCRIPT}: Silent installation script")?;
    writeln!(out, "{INDENT}  - {UNINSTALL_SCRIPT}: Clean removal script")?;

    let intunewin_file = package(layout, package_dir, &installer_path, out)?;

    Ok(PackageReport {
        name: name.to_string(),
        kind,
        source: input.display(),
        metadata: product,
        installer_file: installer_path,
        intunewin_file,
        package_dir: package_dir.to_path_buf(),
    })
}

fn repackage(
    name: &str,
    package_dir: &Path,
    layout: &Layout,
    metadata: &dyn MetadataSource,
    out: &mut dyn Write,
) -> Result<PackageReport> {
    writeln!(out, "{INDENT}• Analyzing existing package...")?;
    writeln!(out, "{INDENT}  - Package directory: {}", package_dir.display())?;

    let mut files: Vec<PathBuf> = fs::read_dir(package_dir)
        .map_err(|e| {
            NexusError::io(
                format!("failed to read package directory {}", package_dir.display()),
                e,
            )
        })?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    writeln!(out, "{INDENT}• Cleaning up existing package files...")?;
    for path in files.iter().filter(|p| has_extension(p, INTUNEWIN_EXTENSION)) {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        writeln!(out, "{INDENT}  - Removing: {}", file_name)?;
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove {}: {}", path.display(), e);
            writeln!(out, "{INDENT}  - Warning: Failed to remove {}: {}", file_name, e)?;
        }
    }

    let Some((installer_path, kind)) = files
        .iter()
        .find_map(|path| InstallerKind::from_path(path).map(|kind| (path.clone(), kind)))
    else {
        return Err(NexusError::io(
            format!("no installer file found in {}", package_dir.display()),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
    };
    writeln!(
        out,
        "{INDENT}  - Found installer: {}",
        installer_path.file_name().unwrap_or_default().to_string_lossy()
    )?;

    let product = extract_metadata(kind, &installer_path, metadata, out)?;
    let intunewin_file = package(layout, package_dir, &installer_path, out)?;

    Ok(PackageReport {
        name: name.to_string(),
        kind,
        source: installer_path.display().to_string(),
        metadata: product,
        installer_file: installer_path,
        intunewin_file,
        package_dir: package_dir.to_path_buf(),
    })
}

/// MSI metadata, or `None` with a warning. EXE installers are skipped.
fn extract_metadata(
    kind: InstallerKind,
    installer: &Path,
    source: &dyn MetadataSource,
    out: &mut dyn Write,
) -> Result<Option<ProductMetadata>> {
    if kind != InstallerKind::Msi {
        return Ok(None);
    }

    writeln!(out, "{INDENT}• Extracting MSI metadata...")?;
    match source.product_metadata(installer) {
        Ok(product) => {
            info!(
                "{} has product code {} version {}",
                installer.display(),
                product.product_code,
                product.product_version
            );
            writeln!(out, "{INDENT}  - Product Code: {}", product.product_code)?;
            writeln!(out, "{INDENT}  - Version: {}", product.product_version)?;
            Ok(Some(product))
        }
        Err(e) => {
            warn!("Metadata extraction failed for {}: {}", installer.display(), e);
            writeln!(out, "{INDENT}  - Warning: Could not extract MSI metadata: {}", e)?;
            writeln!(
                out,
                "{INDENT}  - You may need to manually set detection rules in Intune"
            )?;
            Ok(None)
        }
    }
}

fn package(
    layout: &Layout,
    package_dir: &Path,
    installer: &Path,
    out: &mut dyn Write,
) -> Result<PathBuf> {
    let args = PackagerArgs::for_package(package_dir, installer);
    writeln!(out, "{INDENT}• Generating IntuneWin package...")?;
    writeln!(out, "{INDENT}  - Source: {}", installer.display())?;
    writeln!(out, "{INDENT}  - Output: {}", package_dir.display())?;

    let result = run_packager(&layout.packager_exe, &args)?;

    let intunewin = args.expected_output();
    if !intunewin.is_file() {
        warn!(
            "{} exited cleanly but {} is missing",
            layout.packager_exe.display(),
            intunewin.display()
        );
        return Err(NexusError::Subprocess {
            program: layout
                .packager_exe
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
            status: format!("no output at {}", intunewin.display()),
            output: result.output,
        });
    }
    writeln!(out, "{INDENT}  - IntuneWin package created successfully")?;
    writeln!(out, "{INDENT}• Package creation complete")?;
    writeln!(
        out,
        "{INDENT}  - IntuneWin file: {}",
        intunewin.file_name().unwrap_or_default().to_string_lossy()
    )?;
    Ok(intunewin)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Print the closing summary of a finished package
pub fn print_summary(report: &PackageReport, out: &mut dyn Write) -> Result<()> {
    let file_name = |path: &Path| {
        path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    };

    writeln!(out, "\nPackage Complete\n")?;

    writeln!(out, "Summary:")?;
    writeln!(out, "{INDENT}• Name: {}", report.name)?;
    if let Some(product) = &report.metadata {
        writeln!(out, "{INDENT}• Version: {}", product.product_version)?;
    }
    writeln!(out, "{INDENT}• Source: {}", report.source)?;
    if report.kind == InstallerKind::Msi {
        let code = report
            .metadata
            .as_ref()
            .map_or("unknown", |m| m.product_code.as_str());
        writeln!(out, "{INDENT}• Product Code: {}", code)?;
    }

    writeln!(out, "\nLocation:")?;
    writeln!(out, "{INDENT}• Installer File: {}", file_name(&report.installer_file))?;
    writeln!(out, "{INDENT}• IntuneWin File: {}", file_name(&report.intunewin_file))?;
    writeln!(out, "{INDENT}• Package Directory: {}", report.package_dir.display())?;

    writeln!(out, "\nIntune Configuration:")?;
    writeln!(out, "{INDENT}• Install Script: {INSTALL_SCRIPT}")?;
    writeln!(out, "{INDENT}• Uninstall Script: {UNINSTALL_SCRIPT}")?;

    writeln!(out, "\nIntune Detection Method:")?;
    match (report.kind, &report.metadata) {
        (InstallerKind::Msi, Some(product)) => {
            writeln!(out, "{INDENT}• MSI Product Code:")?;
            writeln!(out, "{INDENT}  - Property: {PRODUCT_CODE}")?;
            writeln!(out, "{INDENT}  - Value: {}", product.product_code)?;
            if !product.product_version.is_empty() {
                writeln!(out, "{INDENT}• Version Detection:")?;
                writeln!(out, "{INDENT}  - Property: {PRODUCT_VERSION}")?;
                writeln!(out, "{INDENT}  - Value: {}", product.product_version)?;
                writeln!(out, "{INDENT}  - Operator: Greater than or equal to")?;
            }
        }
        (InstallerKind::Msi, None) => {
            writeln!(
                out,
                "{INDENT}• Product code unknown: set the MSI detection rule manually"
            )?;
        }
        (InstallerKind::Exe, _) => {
            writeln!(out, "{INDENT}• Use custom detection script or file existence")?;
        }
    }

    writeln!(out, "\nCustomizing Installation:")?;
    writeln!(out, "{INDENT}• Installation Arguments:")?;
    writeln!(
        out,
        "{INDENT}  Current: {} ({})",
        report.kind.default_install_args(),
        report.kind.install_args_description()
    )?;
    writeln!(out, "{INDENT}  To modify: Open {INSTALL_SCRIPT} and update $install_args")?;
    writeln!(out, "\n{INDENT}• Custom Installation Steps:")?;
    writeln!(out, "{INDENT}  1. Open {INSTALL_SCRIPT} in the package directory")?;
    writeln!(out, "{INDENT}  2. Add your custom PowerShell code:")?;
    writeln!(out, "{INDENT}     - Before install_application() for pre-install tasks")?;
    writeln!(out, "{INDENT}     - After install_application() for post-install tasks")?;
    writeln!(out, "{INDENT}  3. After making changes, repackage the application using:")?;
    writeln!(out, "{INDENT}     - Select 'Repackage Application' from main menu")?;
    writeln!(out, "{INDENT}     - Choose the modified package to create new IntuneWin file")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use tempfile::TempDir;

    struct NoMetadata;

    impl MetadataSource for NoMetadata {
        fn product_metadata(&self, _: &Path) -> std::result::Result<ProductMetadata, MetadataError> {
            Err(MetadataError::Unsupported)
        }
    }

    fn report(kind: InstallerKind, metadata: Option<ProductMetadata>) -> PackageReport {
        PackageReport {
            name: "Test App".into(),
            kind,
            source: "/tmp/app.msi".into(),
            metadata,
            installer_file: PathBuf::from("/pkgs/test-app/test-app.msi"),
            intunewin_file: PathBuf::from("/pkgs/test-app/test-app.intunewin"),
            package_dir: PathBuf::from("/pkgs/test-app"),
        }
    }

    fn summary(report: &PackageReport) -> String {
        let mut out = Vec::new();
        print_summary(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary_sections() {
        let text = summary(&report(InstallerKind::Exe, None));
        for section in [
            "Summary:",
            "Location:",
            "Intune Configuration:",
            "Intune Detection Method:",
            "Customizing Installation:",
        ] {
            assert!(text.contains(section), "missing {}", section);
        }
        assert!(text.contains("Current: /silent (silent install)"));
        assert!(text.contains("custom detection script"));
        assert!(!text.contains("Product Code"));
    }

    #[test]
    fn test_summary_msi_detection_rule() {
        let text = summary(&report(
            InstallerKind::Msi,
            Some(ProductMetadata {
                product_code: "{ABC}".into(),
                product_version: "2.1.0".into(),
            }),
        ));
        assert!(text.contains("• Product Code: {ABC}"));
        assert!(text.contains("- Value: 2.1.0"));
        assert!(text.contains("Greater than or equal to"));
        assert!(text.contains("IntuneWin File: test-app.intunewin"));
    }

    #[test]
    fn test_exe_skips_metadata() {
        let mut out = Vec::new();
        let result =
            extract_metadata(InstallerKind::Exe, Path::new("a.exe"), &NoMetadata, &mut out)
                .unwrap();
        assert!(result.is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn test_metadata_failure_only_warns() {
        let mut out = Vec::new();
        let result =
            extract_metadata(InstallerKind::Msi, Path::new("a.msi"), &NoMetadata, &mut out)
                .unwrap();
        assert!(result.is_none());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Warning: Could not extract MSI metadata"));
    }

    #[test]
    fn test_repackage_without_installer_fails() {
        let tmp = TempDir::new().unwrap();
        let package_dir = tmp.path().join("zoom");
        fs::create_dir(&package_dir).unwrap();
        fs::write(package_dir.join("Install.ps1"), "").unwrap();
        fs::write(package_dir.join("zoom.intunewin"), "old").unwrap();

        let layout = Layout::new(tmp.path());
        let plan = PackagePlan::Repackage {
            name: "Zoom".into(),
            output_dir: package_dir.clone(),
        };
        let mut out = Vec::new();
        let err = execute_plan(&plan, &layout, &NoMetadata, &mut out).unwrap_err();
        assert!(matches!(err, NexusError::Io { .. }));
        assert!(!package_dir.join("zoom.intunewin").exists());
    }
}
