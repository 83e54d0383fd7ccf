//! Nexus - Main entry point
//!
//! Parses the command line, sets up file logging, and either runs the
//! interactive wizard or one of the non-interactive subcommands.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use nexus::app::run_wizard;
use nexus::cli::{Cli, Commands, ConfigCommands};
use nexus::theme::Theme;
use nexus::ui::UiRenderer;
use nexus::{
    Layout, NexusError, PackageStore, Settings, WindowsInstaller, Wizard,
    ensure_packager, execute_plan, print_summary,
};

/// Log to `<root>/Logs/nexus.log`; the wizard owns stdout while it runs.
///
/// Logging is skipped entirely when the file cannot be opened.
fn init_tracing(layout: &Layout, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    if std::fs::create_dir_all(&layout.logs_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(layout.logs_dir.join("nexus.log"))
    else {
        return;
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse();
    let layout = Layout::new(cli.root.clone().unwrap_or_else(Layout::default_root));

    init_tracing(&layout, cli.verbose);
    info!("Nexus starting with root {}", layout.root.display());

    match cli.command {
        Some(Commands::Config { action }) => run_config_command(&layout, action),
        Some(Commands::List { recent }) => run_list(&layout, recent),
        None => run_interactive(&layout),
    }
}

/// Run the wizard, then execute whatever plan it returns
fn run_interactive(layout: &Layout) -> Result<()> {
    layout
        .ensure_dirs()
        .context("Error setting up Nexus directories")?;

    if ensure_packager(layout).context("Error setting up Intune tools")? {
        println!("Downloaded packaging tool to {}", layout.packager_exe.display());
    }

    let (settings, warning) = Settings::load_or_default(layout);
    let mut wizard = Wizard::new(layout.clone(), settings);
    if let Some(warning) = warning {
        wizard.set_notice(format!("{warning}; using the default packages directory"));
    }

    let theme = if std::env::var_os("NO_COLOR").is_some() {
        Theme::monochrome()
    } else {
        Theme::default()
    };

    let Some(plan) = run_wizard(wizard, UiRenderer::new(theme))? else {
        info!("Wizard cancelled");
        return Ok(());
    };

    let mut stdout = io::stdout().lock();
    let report = match execute_plan(&plan, layout, &WindowsInstaller, &mut stdout) {
        Ok(report) => report,
        Err(e) => {
            error!("Packaging {} failed: {}", plan.name(), e);
            if let NexusError::Subprocess { output, .. } = &e {
                if !output.trim().is_empty() {
                    eprintln!("{}", output.trim_end());
                }
            }
            return Err(e).with_context(|| format!("Failed to package {}", plan.name()));
        }
    };

    print_summary(&report, &mut stdout)?;
    stdout.flush()?;
    info!("Package {} complete", report.name);
    Ok(())
}

fn run_config_command(layout: &Layout, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let (settings, warning) = Settings::load_or_default(layout);
            println!("Settings file: {}", layout.settings_file.display());
            println!("Packages directory: {}", settings.packages_dir.display());
            if let Some(warning) = warning {
                eprintln!("Warning: {warning}");
            }
        }
        ConfigCommands::SetPackagesDir { path } => {
            let path = std::path::absolute(&path)
                .with_context(|| format!("Invalid directory {}", path.display()))?;
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory {}", path.display()))?;
            Settings {
                packages_dir: path.clone(),
            }
            .save(&layout.settings_file)
            .context("Failed to save configuration")?;
            debug!("Packages directory set to {}", path.display());
            println!("Packages directory set to {}", path.display());
        }
    }
    Ok(())
}

fn run_list(layout: &Layout, recent: Option<usize>) -> Result<()> {
    let (settings, _) = Settings::load_or_default(layout);
    let store = PackageStore::new(settings.packages_dir);

    let names = match recent {
        Some(count) => store.recent_packages(count)?,
        None => store.list_packages()?,
    };

    if names.is_empty() {
        println!("No existing packages found in {}", store.root().display());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
