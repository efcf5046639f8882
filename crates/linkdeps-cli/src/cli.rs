//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// link-deps - Install local dependencies as real copies instead of symlinks
#[derive(Parser, Debug)]
#[command(name = "link-deps")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Save registry installs as devDependencies
    #[arg(short = 'D', long = "dev", visible_alias = "save-dev", global = true)]
    pub dev: bool,

    /// Lifecycle script that runs link-deps
    #[arg(short = 'S', long, default_value = "prepare", global = true)]
    pub script: String,

    /// Package manager to use (npm or yarn)
    #[arg(long, env = "LINK_DEPS_CLIENT", global = true)]
    pub client: Option<String>,

    /// The command to run (defaults to a single sync pass)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install changed linked dependencies once
    Sync,

    /// Watch linked dependencies and reinstall on change
    Watch,

    /// Initialize link-deps in the current project
    ///
    /// Adds an empty `linkDependencies` section and hooks `link-deps` into
    /// the lifecycle script.
    Init,

    /// Add local packages as linked dependencies
    ///
    /// Examples:
    ///   link-deps add ../mylib          # Link a sibling package
    ///   link-deps add -D ../a ../b      # Register both as devDependencies
    Add {
        /// Paths of the packages to link, relative to the project
        paths: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::parse_from(["link-deps"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.script, "prepare");
        assert!(!cli.dev);
    }

    #[test]
    fn parse_add_with_flags() {
        let cli = Cli::parse_from(["link-deps", "add", "-D", "-S", "postinstall", "../a", "../b"]);
        assert_eq!(
            cli.command,
            Some(Commands::Add {
                paths: vec!["../a".to_string(), "../b".to_string()]
            })
        );
        assert!(cli.dev);
        assert_eq!(cli.script, "postinstall");
    }

    #[test]
    fn parse_save_dev_alias() {
        let cli = Cli::parse_from(["link-deps", "add", "--save-dev", "../a"]);
        assert!(cli.dev);
    }

    #[test]
    fn parse_watch() {
        let cli = Cli::parse_from(["link-deps", "watch"]);
        assert_eq!(cli.command, Some(Commands::Watch));
    }

    #[test]
    fn parse_client_flag() {
        let cli = Cli::parse_from(["link-deps", "--client", "yarn"]);
        assert_eq!(cli.client.as_deref(), Some("yarn"));
    }
}
