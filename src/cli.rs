use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nexus - build Intune Win32 app packages from MSI and EXE installers
#[derive(Parser, Debug)]
#[command(name = "nexus")]
#[command(about = "Interactive packager for Microsoft Intune Win32 applications")]
#[command(version)]
pub struct Cli {
    /// Root directory for tools, packages, downloads and logs.
    ///
    /// Defaults to C:\ProgramData\Nexus on Windows and the user data
    /// directory elsewhere.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Inspect or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// List existing packages, most recent first
    List {
        /// Only show the N most recently modified packages
        #[arg(long, value_name = "N")]
        recent: Option<usize>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the settings file and the effective packages directory
    Show,
    /// Create a packages directory and remember it
    SetPackagesDir {
        /// Directory that will hold one folder per package
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_runs_wizard() {
        let cli = Cli::try_parse_from(["nexus"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.root.is_none());
    }

    #[test]
    fn test_set_packages_dir() {
        let cli =
            Cli::try_parse_from(["nexus", "--root", "/srv/nexus", "config", "set-packages-dir", "/data/pkgs"])
                .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/srv/nexus")));
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::SetPackagesDir {
                    path: PathBuf::from("/data/pkgs")
                }
            })
        );
    }

    #[test]
    fn test_list_recent_and_global_verbose() {
        let cli = Cli::try_parse_from(["nexus", "list", "--recent", "3", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command, Some(Commands::List { recent: Some(3) }));
    }
}
