//! Dashboard, pickers (focus, sort, theme), focus status, statistics, help,
//! about and the backup/exit confirmations.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use tracing::info;

use crate::dates::{format_minutes, start_of_week};
use crate::fields::{Priority, SortKey, Status};
use crate::pipeline::{compute_stats, select_tasks, TaskQuery};
use crate::task::Task;
use crate::tui::colors::{token, THEME_NAMES};
use crate::tui::context::ViewContext;
use crate::tui::enums::ViewId;
use crate::tui::keys::plain_char;
use crate::tui::surface::TerminalSurface;
use crate::tui::views::tasks::{move_by_key, visible};
use crate::tui::views::{DrawError, ViewError};
use crate::tui::widgets;

const ALL_PROJECTS: &str = "(all projects)";
const NEXT_UP: usize = 8;

fn minutes_between(ctx: &ViewContext, from: chrono::NaiveDate) -> u32 {
    ctx.db
        .time_entries
        .iter()
        .filter(|e| e.date >= from && e.date <= ctx.today)
        .map(|e| e.minutes)
        .sum()
}

fn next_up(ctx: &ViewContext) -> Vec<Task> {
    visible(ctx, ViewId::NextActions).into_iter().take(NEXT_UP).collect()
}

pub fn draw_dashboard(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let body = widgets::header(surface, area, "Dashboard", &ctx.today.format("%A %d %B %Y").to_string())?;
    let due_today = visible(ctx, ViewId::TodayTasks).len();
    let focus = ctx.query.project.clone().unwrap_or_else(|| ALL_PROJECTS.to_string());
    let pairs = [
        ("Focus", focus),
        (
            "Tasks",
            format!(
                "{} open, {} done, {} overdue, {} due today",
                ctx.stats.active, ctx.stats.completed, ctx.stats.overdue, due_today
            ),
        ),
        (
            "Logged",
            format!(
                "{} today, {} this week",
                format_minutes(minutes_between(ctx, ctx.today)),
                format_minutes(minutes_between(ctx, start_of_week(ctx.today)))
            ),
        ),
    ];
    let used = widgets::fields(surface, body, &pairs)?;
    let mut y = body.y + used + 1;
    let bottom = body.y + body.height;
    if y >= bottom {
        return Ok(());
    }
    if ctx.stats.overdue > 0 {
        let warning = format!("{} overdue task(s) need attention", ctx.stats.overdue);
        surface.write_at_styled(body.x + 1, y, &warning, token::WARNING, None)?;
        y += 2;
        if y >= bottom {
            return Ok(());
        }
    }
    surface.write_at_styled(body.x + 1, y, "Next up", token::ACCENT, None)?;
    y += 1;
    if y >= bottom {
        return Ok(());
    }
    let tasks = next_up(ctx);
    let refs: Vec<&Task> = tasks.iter().collect();
    let cursor = ctx.cursor(ViewId::Dashboard).min(tasks.len().saturating_sub(1));
    widgets::task_table(surface, Rect::new(body.x, y, body.width, bottom - y), &refs, Some(cursor), ctx.today)?;
    Ok(())
}

pub fn handle_dashboard(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let tasks = next_up(ctx);
    if move_by_key(ctx, ViewId::Dashboard, &key, tasks.len()) {
        return Ok(());
    }
    if key.code == KeyCode::Enter {
        if let Some(task) = tasks.get(ctx.cursor(ViewId::Dashboard)) {
            ctx.selected_task = Some(task.id);
            return ctx.open(ViewId::TaskDetail);
        }
        return Ok(());
    }
    let target = match plain_char(&key) {
        Some('t') => ViewId::TaskList,
        Some('p') => ViewId::ProjectList,
        Some('i') => ViewId::TimeList,
        Some('a') => ViewId::Agenda,
        Some('k') => ViewId::Kanban,
        Some('n') => ViewId::NextActions,
        Some('o') => ViewId::OverdueTasks,
        Some('s') => ViewId::Stats,
        Some('?') => ViewId::Help,
        _ => return Ok(()),
    };
    ctx.open(target)
}

fn select_options(ctx: &ViewContext, view: ViewId) -> Vec<String> {
    match view {
        ViewId::FocusSelect => std::iter::once(ALL_PROJECTS.to_string())
            .chain(
                ctx.db
                    .project_names()
                    .into_iter()
                    .filter(|n| !ctx.db.project(n).is_some_and(|p| p.is_archived())),
            )
            .collect(),
        ViewId::SortSelect => SortKey::ALL.iter().map(|k| k.label().to_string()).collect(),
        _ => THEME_NAMES.iter().map(|t| t.to_string()).collect(),
    }
}

/// Position of the current setting in the option list.
fn current_option(ctx: &ViewContext, view: ViewId, options: &[String]) -> usize {
    match view {
        ViewId::FocusSelect => ctx
            .query
            .project
            .as_deref()
            .and_then(|p| options.iter().position(|o| o.eq_ignore_ascii_case(p)))
            .unwrap_or(0),
        ViewId::SortSelect => SortKey::ALL.iter().position(|k| *k == ctx.query.sort).unwrap_or(0),
        _ => options.iter().position(|t| *t == ctx.theme).unwrap_or(0),
    }
}

pub fn enter_select(ctx: &mut ViewContext) -> Result<(), ViewError> {
    let view = ctx.current();
    let options = select_options(ctx, view);
    let current = current_option(ctx, view, &options);
    ctx.set_cursor(view, current);
    Ok(())
}

pub fn draw_select(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let view = ctx.current();
    let options = select_options(ctx, view);
    let body = widgets::header(surface, area, view.title(), "Enter to choose")?;
    let marked = current_option(ctx, view, &options);
    widgets::select_list(surface, body, &options, ctx.cursor(view), Some(marked))?;
    Ok(())
}

pub fn handle_select(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let view = ctx.current();
    let options = select_options(ctx, view);
    if move_by_key(ctx, view, &key, options.len()) {
        return Ok(());
    }
    match key.code {
        KeyCode::Esc => ctx.back(),
        KeyCode::Enter => {
            let index = ctx.cursor(view);
            let Some(choice) = options.get(index).cloned() else {
                return ctx.back();
            };
            let message = match view {
                ViewId::FocusSelect => {
                    ctx.query.project = if index == 0 { None } else { Some(choice.clone()) };
                    ctx.refresh_stats();
                    ctx.set_cursor(ViewId::TaskList, 0);
                    match index {
                        0 => "Focus cleared".to_string(),
                        _ => format!("Focused on {}", choice),
                    }
                }
                ViewId::SortSelect => {
                    ctx.query.sort = SortKey::ALL.get(index).copied().unwrap_or_default();
                    format!("Sorted by {}", choice)
                }
                _ => {
                    info!(theme = %choice, "theme selected");
                    ctx.theme_changed = ctx.theme != choice;
                    ctx.theme = choice.clone();
                    format!("Theme {}", choice)
                }
            };
            ctx.back()?;
            ctx.set_status(message);
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn draw_focus_status(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let body = widgets::header(surface, area, "Focus", "")?;
    let Some(name) = ctx.query.project.as_deref() else {
        widgets::muted_line(surface, body, "No focus set. All projects are shown. Press f to choose one.")?;
        return Ok(());
    };
    let project = ctx.db.project(name);
    let minutes: u32 = ctx
        .db
        .time_entries
        .iter()
        .filter(|e| e.project.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(name)))
        .map(|e| e.minutes)
        .sum();
    let pairs = [
        ("Project", name.to_string()),
        ("Status", project.map_or("(no record)", |p| p.status.as_str()).to_string()),
        (
            "Tasks",
            format!(
                "{} open, {} done, {} overdue",
                ctx.stats.active, ctx.stats.completed, ctx.stats.overdue
            ),
        ),
        ("Logged", format_minutes(minutes)),
        ("Search", ctx.query.search.clone().unwrap_or_else(|| "-".into())),
    ];
    widgets::fields(surface, body, &pairs)?;
    Ok(())
}

pub fn handle_focus_status(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => return ctx.back(),
        _ => {}
    }
    match plain_char(&key) {
        Some('f') => ctx.open(ViewId::FocusSelect),
        Some('c') => {
            ctx.query.project = None;
            ctx.refresh_stats();
            ctx.set_status("Focus cleared");
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn draw_stats(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let all = compute_stats(&ctx.db.tasks, ctx.today);
    let body = widgets::header(surface, area, "Statistics", &format!("{} tasks", all.total))?;
    let count_status = |s: Status| ctx.db.tasks.iter().filter(|t| t.status == s).count();
    let count_priority = |p: Priority| ctx.db.tasks.iter().filter(|t| t.is_active() && t.priority == Some(p)).count();
    let rate = if all.total == 0 { 0 } else { all.completed * 100 / all.total };
    let by_status = Status::ALL
        .iter()
        .map(|s| format!("{} {}", count_status(*s), s.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let by_priority = [Priority::High, Priority::Medium, Priority::Low]
        .iter()
        .map(|p| format!("{} {}", count_priority(*p), p.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let focused = TaskQuery {
        search: None,
        ..ctx.query.clone()
    };
    let focus_line = match ctx.query.project.as_deref() {
        Some(p) => format!("{}: {} of {} open", p, ctx.stats.active, select_tasks(&ctx.db.tasks, &focused).len()),
        None => "-".to_string(),
    };
    let total_minutes: u32 = ctx.db.time_entries.iter().map(|e| e.minutes).sum();
    let pairs = [
        ("Open", all.active.to_string()),
        ("Completed", format!("{} ({}%)", all.completed, rate)),
        ("Overdue", all.overdue.to_string()),
        ("By status", by_status),
        ("Open by priority", by_priority),
        ("Blocked", visible(ctx, ViewId::BlockedTasks).len().to_string()),
        ("Projects", ctx.db.projects.len().to_string()),
        ("Focus", focus_line),
        (
            "Time logged",
            format!("{} in {} entries", format_minutes(total_minutes), ctx.db.time_entries.len()),
        ),
    ];
    widgets::fields(surface, body, &pairs)?;
    Ok(())
}

const HELP: [&str; 22] = [
    "Global",
    "  F10 / Alt+letter   open the menu bar / a menu",
    "  Ctrl+N             quick add (text @project !high due:fri #tag)",
    "  Ctrl+Q             exit (asks first)",
    "  F1                 this help",
    "  Esc                back / close",
    "",
    "Task lists",
    "  Up/Down PgUp/PgDn  move        Enter   open task",
    "  a  add             e  edit     d  delete",
    "  Space / c  toggle done         s  cycle status",
    "  p  priority        u  due date m  move to project",
    "  /  search          o  sort     h  show completed",
    "",
    "Task detail",
    "  Space  toggle subtask   x  remove subtask",
    "  a  add subtask   n  add note   b  add dependency",
    "",
    "Board",
    "  Left/Right  column    < >  move task to the next status",
    "",
    "Time: a log, e edit, d delete, r weekly report, p totals",
];

pub fn draw_help(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let body = widgets::header(surface, area, "Help", "Up/Down to scroll")?;
    let rows = usize::from(body.height);
    let offset = ctx.cursor(ViewId::Help).min(HELP.len().saturating_sub(rows));
    for (i, line) in HELP.iter().enumerate().skip(offset).take(rows) {
        let y = body.y + (i - offset) as u16;
        let tok = if line.starts_with(' ') || line.is_empty() { token::TEXT } else { token::ACCENT };
        surface.write_at_styled(body.x + 1, y, line, tok, None)?;
    }
    Ok(())
}

pub fn draw_about(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let body = widgets::header(surface, area, "About", "")?;
    let pairs = [
        ("Program", format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))),
        ("Data", ctx.pipeline().describe()),
        ("Theme", ctx.theme.clone()),
        (
            "Records",
            format!(
                "{} tasks, {} projects, {} time entries",
                ctx.db.tasks.len(),
                ctx.db.projects.len(),
                ctx.db.time_entries.len()
            ),
        ),
    ];
    widgets::fields(surface, body, &pairs)?;
    Ok(())
}

/// Shared key handler for read-only pages. Help scrolls.
pub fn handle_info(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let view = ctx.current();
    if view == ViewId::Help {
        let delta: isize = match key.code {
            KeyCode::Up => -1,
            KeyCode::Down => 1,
            KeyCode::PageUp => -10,
            KeyCode::PageDown => 10,
            _ => 0,
        };
        if delta != 0 {
            ctx.move_cursor(view, delta, HELP.len());
            return Ok(());
        }
    }
    match key.code {
        KeyCode::Esc | KeyCode::Enter => ctx.back(),
        _ if plain_char(&key) == Some('q') => ctx.back(),
        _ => Ok(()),
    }
}

pub fn draw_confirm(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let (title, lines) = if ctx.current() == ViewId::BackupConfirm {
        (
            "Backup",
            vec![
                "Write a timestamped copy of the data now?".to_string(),
                ctx.pipeline().describe(),
                String::new(),
                "y: back up   n/Esc: cancel".to_string(),
            ],
        )
    } else {
        (
            "Exit",
            vec![
                "Leave the task manager?".to_string(),
                String::new(),
                "y: exit   n/Esc: stay".to_string(),
            ],
        )
    };
    widgets::confirm_box(surface, area, title, &lines)?;
    Ok(())
}

pub fn handle_confirm(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    match plain_char(&key).map(|c| c.to_ascii_lowercase()) {
        Some('y') if ctx.current() == ViewId::BackupConfirm => {
            let path = ctx.pipeline().backup()?;
            info!(path = %path.display(), "backup written");
            ctx.back()?;
            ctx.set_status(format!("Backup written to {}", path.display()));
            Ok(())
        }
        Some('y') => {
            info!("exit confirmed");
            ctx.running = false;
            Ok(())
        }
        Some('n') => ctx.back(),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DataPipeline;
    use crate::tui::testing::{ch, key, key_event, sample_database, sample_today, MemoryStore};

    fn context(view: ViewId) -> ViewContext {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = ViewContext::new(DataPipeline::new(Box::new(store)), view, sample_today());
        ctx.load().unwrap();
        ctx
    }

    #[test]
    fn test_focus_select_filters_and_updates_stats() {
        let mut ctx = context(ViewId::Dashboard);
        ctx.open(ViewId::FocusSelect).unwrap();
        assert_eq!(ctx.cursor(ViewId::FocusSelect), 0);
        // (all projects), Home, Work
        handle_select(&mut ctx, key_event(key(KeyCode::End))).unwrap();
        handle_select(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(ctx.query.project.as_deref(), Some("Work"));
        assert_eq!(ctx.stats.total, 3);
        assert_eq!(ctx.current(), ViewId::Dashboard);

        ctx.open(ViewId::FocusSelect).unwrap();
        assert_eq!(ctx.cursor(ViewId::FocusSelect), 2);
    }

    #[test]
    fn test_theme_select_flags_rebuild() {
        let mut ctx = context(ViewId::Dashboard);
        ctx.open(ViewId::ThemeSelect).unwrap();
        handle_select(&mut ctx, key_event(key(KeyCode::Down))).unwrap();
        handle_select(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(ctx.theme, "ocean");
        assert!(ctx.theme_changed);
    }

    #[test]
    fn test_sort_select() {
        let mut ctx = context(ViewId::TaskList);
        ctx.open(ViewId::SortSelect).unwrap();
        handle_select(&mut ctx, key_event(key(KeyCode::End))).unwrap();
        handle_select(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(ctx.query.sort, SortKey::Due);
        assert_eq!(ctx.current(), ViewId::TaskList);
    }

    #[test]
    fn test_exit_confirm() {
        let mut ctx = context(ViewId::Dashboard);
        ctx.open(ViewId::ExitConfirm).unwrap();
        handle_confirm(&mut ctx, key_event(ch('n'))).unwrap();
        assert!(ctx.running);
        assert_eq!(ctx.current(), ViewId::Dashboard);
        ctx.open(ViewId::ExitConfirm).unwrap();
        handle_confirm(&mut ctx, key_event(ch('y'))).unwrap();
        assert!(!ctx.running);
    }

    #[test]
    fn test_backup_confirm_reports_location() {
        let mut ctx = context(ViewId::Dashboard);
        ctx.open(ViewId::BackupConfirm).unwrap();
        handle_confirm(&mut ctx, key_event(ch('y'))).unwrap();
        assert_eq!(ctx.status.as_deref(), Some("Backup written to memory-backup.json"));
        assert_eq!(ctx.current(), ViewId::Dashboard);
    }

    #[test]
    fn test_dashboard_shortcuts() {
        let mut ctx = context(ViewId::Dashboard);
        handle_dashboard(&mut ctx, key_event(ch('k'))).unwrap();
        assert_eq!(ctx.current(), ViewId::Kanban);
        ctx.back().unwrap();
        handle_dashboard(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(ctx.current(), ViewId::TaskDetail);
        assert_eq!(ctx.selected_task, Some(1));
    }
}
