use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Keyboard-driven task, project and time manager for the terminal.
/// Data lives in ~/.taskdeck/tasks.json unless --data or the config says otherwise.
#[derive(Parser)]
#[command(name = "taskdeck", version, about = "Terminal task, project and time manager")]
pub struct Cli {
    /// Path to the JSON data file.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run. Without one the interactive UI starts.
    #[command(subcommand)]
    pub command: Option<Commands>,
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
    fn test_no_subcommand_means_ui() {
        let cli = Cli::try_parse_from(["taskdeck", "--data", "/tmp/t.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/t.json")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["taskdeck", "list", "--config", "c.toml", "--sort", "due"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Some(Commands::List { .. })));
    }
}
