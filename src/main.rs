//! # taskdeck
//!
//! A keyboard-driven task, project and time manager for the terminal.
//!
//! ## Key Features
//!
//! - **Menu bar**: F10 or Alt+<letter> opens the menus; every screen is also
//!   reachable from a single-key shortcut.
//! - **Flicker-free drawing**: each screen is composed in memory and written
//!   to the terminal in one go.
//! - **Many views**: task lists by due date, agenda, kanban board, projects,
//!   weekly time reports, focus on one project.
//! - **Quick add**: Ctrl+N then `Call plumber @Home !high due:fri`.
//! - **Local JSON storage** with rolling backups on every save.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interface
//! taskdeck
//!
//! # Add a task from the shell
//! taskdeck add "Renew passport" --project Home --due "next fri"
//!
//! # List tasks in a project
//! taskdeck list --project Work --sort due
//! ```
//!
//! Data is stored in `~/.taskdeck/tasks.json`; settings are read from
//! `~/.taskdeck/config.toml` and logs go to `~/.taskdeck/taskdeck.log`.

use std::io;

use clap::Parser;
use tracing::info;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod fields;
pub mod logging;
pub mod pipeline;
pub mod project;
pub mod task;
pub mod time;
pub mod tui {
    pub mod action;
    pub mod app;
    pub mod colors;
    pub mod context;
    pub mod enums;
    pub mod form;
    pub mod input;
    pub mod keys;
    pub mod menu;
    pub mod navigation;
    pub mod style_cache;
    pub mod surface;
    pub mod utils;
    pub mod views;
    pub mod widgets;
    #[cfg(test)]
    pub mod testing;
}

use cli::Cli;
use cmd::*;
use config::{Config, CONFIG_FILE};
use db::JsonStore;
use error::Result;
use pipeline::{DataPipeline, TaskQuery};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Ui {
        view: None,
        theme: None,
    });
    if let Commands::Completions { shell } = command {
        return cmd_completions(shell, &mut io::stdout());
    }

    let app_dir = config::app_dir();
    let config_path = cli.config.unwrap_or_else(|| app_dir.join(CONFIG_FILE));
    let config = Config::load(&config_path)?;
    // Logging is optional; without a log file the app simply runs silent.
    let _ = logging::init(&config.log_path(&app_dir), &config.log_level);

    let data_path = cli.data.unwrap_or_else(|| config.data_path(&app_dir));
    info!(data = %data_path.display(), config = %config_path.display(), "taskdeck starting");
    let mut pipeline = DataPipeline::new(Box::new(JsonStore::new(data_path, config.backup_count)));
    let today = dates::today();
    let mut out = io::stdout();

    match command {
        Commands::Ui { view, theme } => cmd_ui(pipeline, &config, view, theme, today),
        Commands::List {
            project,
            search,
            sort,
            all,
        } => {
            let query = TaskQuery {
                project,
                search,
                sort,
            };
            cmd_list(&pipeline, &query, all, today, &mut out)
        }
        Commands::Add {
            text,
            project,
            priority,
            due,
            tags,
        } => cmd_add(&mut pipeline, &text, project, priority, due, &tags, today, &mut out),
        Commands::Done { id } => cmd_done(&mut pipeline, id, &mut out),
        Commands::Projects => cmd_projects(&pipeline, today, &mut out),
        Commands::Time { limit } => cmd_time(&pipeline, limit, &mut out),
        Commands::Stats => cmd_stats(&pipeline, today, &mut out),
        Commands::Backup => cmd_backup(&pipeline, &mut out),
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
