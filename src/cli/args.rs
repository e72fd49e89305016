use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "prayer-countdown",
    version,
    about = "Countdown to the next prayer with reminders and azan playback"
)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the location and write the configuration file
    Setup {
        /// Re-detect and overwrite an existing configuration
        #[arg(long)]
        reset: bool,
    },
    /// Show today's prayer times and the next prayer, then exit
    Times,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::parse_from(["prayer-countdown"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_setup_reset_with_config_path() {
        let cli = Cli::parse_from(["prayer-countdown", "setup", "--reset", "--config", "/tmp/p.json"]);
        assert!(matches!(cli.command, Some(Commands::Setup { reset: true })));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.json")));
    }
}
