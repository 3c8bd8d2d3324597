//! Command implementations for the CLI interface.
//!
//! Every subcommand except `ui` is a one-shot companion to the interactive
//! interface: it loads the data file through the same pipeline, prints a
//! plain table and exits.

use std::io::{self, IsTerminal, Write};

use chrono::NaiveDate;
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::config::Config;
use crate::dates::{format_due_relative, format_hours, format_minutes, parse_due_on};
use crate::error::{AppError, Result};
use crate::fields::{format_priority, Priority, SortKey};
use crate::pipeline::{project_summaries, DataPipeline, TaskQuery};
use crate::project::split_tags;
use crate::task::Task;
use crate::tui::action::Action;
use crate::tui::app::App;
use crate::tui::colors::Theme;
use crate::tui::context::ViewContext;
use crate::tui::enums::ViewId;
use crate::tui::keys::CrosstermKeys;
use crate::tui::style_cache::StyleCache;
use crate::tui::surface::TerminalSurface;
use crate::tui::views::ViewError;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive interface.
    Ui {
        /// View to open first (e.g. dashboard, tasks, agenda, kanban, time).
        #[arg(long)]
        view: Option<String>,
        /// Colour theme: default | ocean | mono.
        #[arg(long)]
        theme: Option<String>,
    },

    /// List tasks with optional filters.
    List {
        /// Only tasks in this project.
        #[arg(long)]
        project: Option<String>,
        /// Case-insensitive text to look for in text, project and id.
        #[arg(long)]
        search: Option<String>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Id)]
        sort: SortKey,
        /// Include completed and cancelled tasks.
        #[arg(long)]
        all: bool,
    },

    /// Add a new task.
    Add {
        /// Task text.
        text: String,
        /// Project name.
        #[arg(long)]
        project: Option<String>,
        /// Priority: high | medium | low | none.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "fri", "next mon", "in 3d".
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated tags. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Mark a task completed.
    Done {
        /// Task ID.
        id: u64,
    },

    /// List projects with task counts and logged hours.
    Projects,

    /// List logged time, newest first.
    Time {
        /// Limit number of rows printed.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Print task and time totals.
    Stats,

    /// Write a timestamped copy of the data file.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn view_error(e: ViewError) -> AppError {
    match e {
        ViewError::Invalid(msg) => AppError::Usage(msg),
        ViewError::Store(e) => AppError::Store(e),
    }
}

/// Run the interactive interface until the user exits.
///
/// When stdin or stdout is redirected one frame is rendered and the function
/// returns without waiting for keys.
pub fn cmd_ui(
    pipeline: DataPipeline,
    config: &Config,
    view: Option<String>,
    theme: Option<String>,
    today: NaiveDate,
) -> Result<()> {
    let start = match view {
        Some(slug) => ViewId::from_slug(&slug)
            .map(Action::Show)
            .ok_or_else(|| AppError::Usage(format!("unknown view '{}'", slug)))?,
        None => config.start_action()?,
    };
    let theme_name = theme.unwrap_or_else(|| config.theme.clone());
    let palette = Theme::load(&theme_name, &config.colors)?;

    let mut ctx = ViewContext::new(pipeline, ViewId::Dashboard, today);
    ctx.theme = theme_name;
    ctx.load().map_err(view_error)?;

    let styles = StyleCache::new(palette, config.style_cache_capacity);
    let surface = TerminalSurface::new(Box::new(io::stdout()), styles);
    let mut app = App::new(surface, Box::new(CrosstermKeys), ctx, config.colors.clone());

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        info!("not an interactive terminal, rendering a single frame");
        let mut app = app.non_interactive();
        app.start(start)?;
        app.render()?;
        return Ok(());
    }

    let mut guard = app.initialize()?;
    let result = app.start(start).and_then(|_| app.run());
    guard.release()?;
    result?;
    Ok(())
}

/// Print tasks in a formatted table.
pub fn print_table(out: &mut dyn Write, tasks: &[&Task], today: NaiveDate) -> io::Result<()> {
    writeln!(
        out,
        "{:<5} {:<12} {:<5} {:<10} {:<14} {}",
        "ID", "Status", "Pri", "Due", "Project", "Text [tags]"
    )?;
    for t in tasks {
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        let due = match (t.due_date(), t.due.as_deref()) {
            (Some(d), _) => format_due_relative(Some(d), today),
            (None, Some(raw)) => truncate(raw, 10),
            (None, None) => "-".into(),
        };
        let project = t.project.clone().unwrap_or_else(|| "-".into());
        writeln!(
            out,
            "{:<5} {:<12} {:<5} {:<10} {:<14} {}{}",
            t.id,
            t.status.label(),
            format_priority(t.priority),
            due,
            truncate(&project, 14),
            t.text,
            tags
        )?;
    }
    Ok(())
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// List tasks matching the query. Finished tasks only with `all`.
pub fn cmd_list(
    pipeline: &DataPipeline,
    query: &TaskQuery,
    all: bool,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<()> {
    let set = pipeline.load_tasks(query, today)?;
    let shown: Vec<&Task> = set.tasks.iter().filter(|t| all || t.is_active()).collect();
    if shown.is_empty() {
        writeln!(out, "No tasks found.")?;
        return Ok(());
    }
    print_table(out, &shown, today)?;
    writeln!(
        out,
        "\n{} shown, {} active, {} completed, {} overdue",
        shown.len(),
        set.stats.active,
        set.stats.completed,
        set.stats.overdue
    )?;
    Ok(())
}

/// Add a new task to the data file.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    pipeline: &mut DataPipeline,
    text: &str,
    project: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    tags: &[String],
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Usage("task text cannot be empty".into()));
    }
    let due = match due {
        Some(raw) => {
            let date = parse_due_on(&raw, today)
                .ok_or_else(|| AppError::Usage(format!("cannot understand due date '{}'", raw)))?;
            Some(date.format("%Y-%m-%d").to_string())
        }
        None => None,
    };

    let mut db = pipeline.load_database()?;
    let id = db.next_task_id();
    let mut task = Task::new(id, text);
    task.project = project.map(|p| {
        let p = p.trim().to_string();
        db.project_names()
            .into_iter()
            .find(|n| n.eq_ignore_ascii_case(&p))
            .unwrap_or(p)
    });
    task.priority = priority;
    task.due = due;
    for tag in tags {
        task.tags.extend(split_tags(tag));
    }
    db.tasks.push(task);
    pipeline.save(&db, &format!("add task {}", id))?;
    writeln!(out, "Added task {}: {}", id, text)?;
    Ok(())
}

/// Mark a task completed.
pub fn cmd_done(pipeline: &mut DataPipeline, id: u64, out: &mut dyn Write) -> Result<()> {
    let mut db = pipeline.load_database()?;
    let Some(task) = db.task_mut(id) else {
        return Err(AppError::Usage(format!("task {} not found", id)));
    };
    if !task.is_active() {
        writeln!(out, "Task {} is already {}.", id, task.status.label().to_lowercase())?;
        return Ok(());
    }
    task.set_completed(true);
    let text = task.text.clone();
    pipeline.save(&db, &format!("complete task {}", id))?;
    writeln!(out, "Completed task {}: {}", id, text)?;
    Ok(())
}

/// List projects with their task counts and logged hours.
pub fn cmd_projects(pipeline: &DataPipeline, today: NaiveDate, out: &mut dyn Write) -> Result<()> {
    let db = pipeline.load_database()?;
    let projects = pipeline.load_projects()?;
    let summaries = project_summaries(&db, today);
    if summaries.is_empty() {
        writeln!(out, "No projects.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<16} {:<10} {:>6} {:>6} {:>7} {:>7}",
        "Project", "Status", "Active", "Done", "Overdue", "Hours"
    )?;
    for s in summaries {
        let status = projects
            .iter()
            .find(|p| p.matches(&s.name))
            .map(|p| p.status.as_str())
            .unwrap_or("-");
        writeln!(
            out,
            "{:<16} {:<10} {:>6} {:>6} {:>7} {:>7}",
            truncate(&s.name, 16),
            status,
            s.stats.active,
            s.stats.completed,
            s.stats.overdue,
            format_hours(s.minutes)
        )?;
    }
    Ok(())
}

/// List time entries, newest first.
pub fn cmd_time(pipeline: &DataPipeline, limit: usize, out: &mut dyn Write) -> Result<()> {
    let entries = pipeline.load_time_entries()?;
    if entries.is_empty() {
        writeln!(out, "No time logged.")?;
        return Ok(());
    }
    writeln!(out, "{:<5} {:<10} {:>7} {:<16} {}", "ID", "Date", "Time", "Project", "Description")?;
    for e in entries.iter().take(limit) {
        writeln!(
            out,
            "{:<5} {:<10} {:>7} {:<16} {}",
            e.id,
            e.date.format("%Y-%m-%d"),
            format_minutes(e.minutes),
            truncate(&e.bucket(), 16),
            e.description
        )?;
    }
    if entries.len() > limit {
        writeln!(out, "... {} more", entries.len() - limit)?;
    }
    Ok(())
}

/// Print headline counts.
pub fn cmd_stats(pipeline: &DataPipeline, today: NaiveDate, out: &mut dyn Write) -> Result<()> {
    let set = pipeline.load_tasks(&TaskQuery::default(), today)?;
    let entries = pipeline.load_time_entries()?;
    let minutes: u32 = entries.iter().map(|e| e.minutes).sum();
    writeln!(out, "{:<16} {}", "Tasks", set.stats.total)?;
    writeln!(out, "{:<16} {}", "Active", set.stats.active)?;
    writeln!(out, "{:<16} {}", "Completed", set.stats.completed)?;
    writeln!(out, "{:<16} {}", "Overdue", set.stats.overdue)?;
    writeln!(out, "{:<16} {}", "Projects", pipeline.load_projects()?.len())?;
    writeln!(out, "{:<16} {}", "Time logged", format_minutes(minutes))?;
    Ok(())
}

/// Write a timestamped backup of the data file.
pub fn cmd_backup(pipeline: &DataPipeline, out: &mut dyn Write) -> Result<()> {
    let path = pipeline.backup()?;
    writeln!(out, "Backup created: {}", path.display())?;
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, out);
    Ok(())
}
