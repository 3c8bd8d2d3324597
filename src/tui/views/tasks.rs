//! Task list views, agenda, kanban board and task detail.

use chrono::Duration;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;

use crate::dates::{format_due_relative, start_of_week};
use crate::fields::{format_priority, priority_rank, Priority, Status};
use crate::pipeline::{compare_due, select_tasks, TaskQuery};
use crate::task::{Subtask, Task};
use crate::tui::colors::token;
use crate::tui::context::ViewContext;
use crate::tui::enums::ViewId;
use crate::tui::keys::plain_char;
use crate::tui::surface::TerminalSurface;
use crate::tui::utils::{fit, scroll_offset};
use crate::tui::views::{DrawError, ViewError};
use crate::tui::widgets;

/// Tasks shown by a task-list view, in display order.
pub fn visible(ctx: &ViewContext, view: ViewId) -> Vec<Task> {
    let query = TaskQuery {
        search: if view == ViewId::SearchResults {
            ctx.query.search.clone()
        } else {
            None
        },
        ..ctx.query.clone()
    };
    let today = ctx.today;
    let week_end = start_of_week(today) + Duration::days(6);
    let db = &ctx.db;
    let mut tasks: Vec<Task> = select_tasks(&db.tasks, &query)
        .into_iter()
        .filter(|t| {
            let due = t.due_date();
            let active = t.is_active();
            match view {
                ViewId::TaskList => active || ctx.show_completed,
                ViewId::TodayTasks => active && due == Some(today),
                ViewId::TomorrowTasks => active && due == Some(today + Duration::days(1)),
                ViewId::WeekTasks => active && due.is_some_and(|d| d >= today && d <= week_end),
                ViewId::OverdueTasks => t.is_overdue(today),
                ViewId::UpcomingTasks => {
                    active && due.is_some_and(|d| d > today && d <= today + Duration::days(14))
                }
                ViewId::NoDueTasks => active && due.is_none(),
                ViewId::BlockedTasks => active && (t.status == Status::Blocked || db.is_blocked(t)),
                ViewId::CompletedTasks => !active,
                ViewId::HighPriorityTasks => active && t.priority == Some(Priority::High),
                ViewId::NextActions => active && t.status != Status::Blocked && !db.is_blocked(t),
                _ => true,
            }
        })
        .collect();
    if view == ViewId::NextActions {
        tasks.sort_by(|a, b| {
            priority_rank(a.priority)
                .cmp(&priority_rank(b.priority))
                .then_with(|| compare_due(a, b))
        });
    }
    tasks
}

/// Task under the cursor of the current view, or the task being viewed.
pub fn selected_task_id(ctx: &ViewContext) -> Option<u64> {
    let view = ctx.current();
    let cursor = ctx.cursor(view);
    match view {
        v if v.is_task_list() => visible(ctx, v).get(cursor).map(|t| t.id),
        ViewId::Agenda => agenda_tasks(ctx).get(cursor).map(|t| t.id),
        ViewId::Kanban => column_tasks(ctx, ctx.kanban_column).get(cursor).map(|t| t.id),
        _ => ctx.selected_task.filter(|id| ctx.db.task(*id).is_some()),
    }
}

fn missing(id: u64) -> String {
    format!("Task {} not found", id)
}

pub fn toggle_complete(ctx: &mut ViewContext, id: u64) -> Result<(), ViewError> {
    let mut completed = false;
    ctx.commit(&format!("toggle task {}", id), |db| {
        let task = db.task_mut(id).ok_or_else(|| missing(id))?;
        completed = task.is_active();
        task.set_completed(completed);
        Ok(())
    })?;
    ctx.set_status(if completed {
        format!("Task {} completed", id)
    } else {
        format!("Task {} reopened", id)
    });
    Ok(())
}

fn cycle_status(ctx: &mut ViewContext, id: u64) -> Result<(), ViewError> {
    let mut status = Status::Pending;
    ctx.commit(&format!("cycle status of task {}", id), |db| {
        let task = db.task_mut(id).ok_or_else(|| missing(id))?;
        status = task.status.cycle();
        task.set_status(status);
        Ok(())
    })?;
    ctx.set_status(format!("Task {} is now {}", id, status.label()));
    Ok(())
}

fn open_for(ctx: &mut ViewContext, id: u64, view: ViewId) -> Result<(), ViewError> {
    ctx.selected_task = Some(id);
    ctx.open(view)
}

/// Keys every task-bearing view understands. Returns whether `key` was used.
fn handle_task_key(ctx: &mut ViewContext, key: &KeyEvent, id: Option<u64>) -> Result<bool, ViewError> {
    let Some(id) = id else {
        return Ok(false);
    };
    if key.code == KeyCode::Enter {
        open_for(ctx, id, ViewId::TaskDetail)?;
        return Ok(true);
    }
    if key.code == KeyCode::Delete {
        open_for(ctx, id, ViewId::TaskDeleteConfirm)?;
        return Ok(true);
    }
    match plain_char(key) {
        Some(' ') | Some('c') => toggle_complete(ctx, id)?,
        Some('s') => cycle_status(ctx, id)?,
        Some('e') => open_for(ctx, id, ViewId::TaskEdit)?,
        Some('d') => open_for(ctx, id, ViewId::TaskDeleteConfirm)?,
        Some('p') => open_for(ctx, id, ViewId::TaskSetPriority)?,
        Some('u') => open_for(ctx, id, ViewId::TaskSetDue)?,
        Some('m') => open_for(ctx, id, ViewId::TaskMoveProject)?,
        _ => return Ok(false),
    }
    Ok(true)
}

/// Up/Down/PgUp/PgDn/Home/End. Returns whether `key` moved the cursor.
pub(crate) fn move_by_key(ctx: &mut ViewContext, view: ViewId, key: &KeyEvent, len: usize) -> bool {
    let delta: isize = match key.code {
        KeyCode::Up => -1,
        KeyCode::Down => 1,
        KeyCode::PageUp => -10,
        KeyCode::PageDown => 10,
        KeyCode::Home => -(len as isize),
        KeyCode::End => len as isize,
        _ => return false,
    };
    ctx.move_cursor(view, delta, len);
    true
}

fn list_detail(ctx: &ViewContext, count: usize) -> String {
    let focus = ctx.query.project.as_deref().unwrap_or("all projects");
    format!("{} | {} | {} tasks", focus, ctx.query.sort.label(), count)
}

pub fn draw_list(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let view = ctx.current();
    let tasks = visible(ctx, view);
    let mut title = view.title().to_string();
    if view == ViewId::SearchResults {
        if let Some(search) = ctx.query.search.as_deref() {
            title = format!("{}: \"{}\"", title, search);
        }
    }
    let body = widgets::header(surface, area, &title, &list_detail(ctx, tasks.len()))?;
    let refs: Vec<&Task> = tasks.iter().collect();
    let cursor = ctx.cursor(view).min(tasks.len().saturating_sub(1));
    widgets::task_table(surface, body, &refs, Some(cursor), ctx.today)?;
    Ok(())
}

pub fn handle_list(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let view = ctx.current();
    let len = visible(ctx, view).len();
    if move_by_key(ctx, view, &key, len) {
        return Ok(());
    }
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    let id = selected_task_id(ctx);
    if handle_task_key(ctx, &key, id)? {
        return Ok(());
    }
    match plain_char(&key) {
        Some('a') => ctx.open(ViewId::TaskAdd)?,
        Some('/') => ctx.open(ViewId::SearchPrompt)?,
        Some('o') => ctx.open(ViewId::SortSelect)?,
        Some('h') if view == ViewId::TaskList => {
            ctx.show_completed = !ctx.show_completed;
            ctx.set_status(if ctx.show_completed {
                "Showing completed tasks"
            } else {
                "Hiding completed tasks"
            });
        }
        _ => {}
    }
    Ok(())
}

const AGENDA_GROUPS: [&str; 6] = ["Overdue", "Today", "Tomorrow", "Later this week", "Later", "No date"];

fn agenda_groups(ctx: &ViewContext) -> Vec<(&'static str, Vec<Task>)> {
    let today = ctx.today;
    let week_end = start_of_week(today) + Duration::days(6);
    let query = TaskQuery {
        search: None,
        ..ctx.query.clone()
    };
    let mut tasks: Vec<Task> = select_tasks(&ctx.db.tasks, &query)
        .into_iter()
        .filter(Task::is_active)
        .collect();
    tasks.sort_by(compare_due);

    let mut groups: Vec<(&'static str, Vec<Task>)> = AGENDA_GROUPS.iter().map(|g| (*g, Vec::new())).collect();
    for task in tasks {
        let slot = match task.due_date() {
            Some(d) if d < today => 0,
            Some(d) if d == today => 1,
            Some(d) if d == today + Duration::days(1) => 2,
            Some(d) if d <= week_end => 3,
            Some(_) => 4,
            None => 5,
        };
        groups[slot].1.push(task);
    }
    groups.retain(|(_, tasks)| !tasks.is_empty());
    groups
}

fn agenda_tasks(ctx: &ViewContext) -> Vec<Task> {
    agenda_groups(ctx).into_iter().flat_map(|(_, tasks)| tasks).collect()
}

pub fn draw_agenda(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let groups = agenda_groups(ctx);
    let count: usize = groups.iter().map(|(_, t)| t.len()).sum();
    let body = widgets::header(surface, area, "Agenda", &format!("{} open tasks", count))?;
    if groups.is_empty() {
        widgets::muted_line(surface, body, "Nothing scheduled")?;
        return Ok(());
    }
    let cursor = ctx.cursor(ViewId::Agenda).min(count.saturating_sub(1));

    // (is_heading, text, flat task index)
    let mut lines: Vec<(bool, String, Option<usize>)> = Vec::new();
    let mut flat = 0;
    for (name, tasks) in &groups {
        lines.push((true, format!("{} ({})", name, tasks.len()), None));
        for t in tasks {
            let project = t.project.as_deref().map(|p| format!("  [{}]", p)).unwrap_or_default();
            let due = format_due_relative(t.due_date(), ctx.today);
            lines.push((
                false,
                format!("  #{:<4} {:<4} {:<9} {}{}", t.id, format_priority(t.priority), due, t.text, project),
                Some(flat),
            ));
            flat += 1;
        }
    }
    let cursor_line = lines.iter().position(|l| l.2 == Some(cursor)).unwrap_or(0);
    let rows = usize::from(body.height);
    let offset = scroll_offset(cursor_line, rows);
    let width = usize::from(body.width.saturating_sub(2));
    for (i, (heading, text, idx)) in lines.iter().enumerate().skip(offset).take(rows) {
        let y = body.y + (i - offset) as u16;
        if *heading {
            surface.write_at_styled(body.x + 1, y, text, token::ACCENT, None)?;
        } else if *idx == Some(cursor) {
            surface.write_at_styled(body.x + 1, y, &fit(text, width), token::SELECTED_FG, Some(token::SELECTED_BG))?;
        } else {
            surface.write_at_styled(body.x + 1, y, text, token::TEXT, None)?;
        }
    }
    Ok(())
}

pub fn handle_agenda(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let len = agenda_tasks(ctx).len();
    if move_by_key(ctx, ViewId::Agenda, &key, len) {
        return Ok(());
    }
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    let id = selected_task_id(ctx);
    handle_task_key(ctx, &key, id)?;
    Ok(())
}

pub const KANBAN_COLUMNS: [Status; 4] = [Status::Pending, Status::InProgress, Status::Blocked, Status::Completed];

fn column_tasks(ctx: &ViewContext, column: usize) -> Vec<Task> {
    let Some(status) = KANBAN_COLUMNS.get(column) else {
        return Vec::new();
    };
    let query = TaskQuery {
        search: None,
        ..ctx.query.clone()
    };
    select_tasks(&ctx.db.tasks, &query)
        .into_iter()
        .filter(|t| t.status == *status)
        .collect()
}

pub fn draw_kanban(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let body = widgets::header(surface, area, "Board", ctx.query.project.as_deref().unwrap_or("all projects"))?;
    if body.height < 2 {
        return Ok(());
    }
    let col_w = body.width / KANBAN_COLUMNS.len() as u16;
    if col_w < 4 {
        widgets::muted_line(surface, body, "Window too narrow for the board")?;
        return Ok(());
    }
    let row_cursor = ctx.cursor(ViewId::Kanban);
    for (c, status) in KANBAN_COLUMNS.iter().enumerate() {
        let x = body.x + col_w * c as u16;
        let tasks = column_tasks(ctx, c);
        let active_col = c == ctx.kanban_column;
        let head_tok = if active_col { token::ACCENT } else { token::TITLE };
        let head = fit(&format!(" {} ({})", status.label(), tasks.len()), usize::from(col_w - 1));
        surface.write_at_styled(x, body.y, &head, head_tok, None)?;

        let rows = usize::from(body.height - 1);
        let cursor = row_cursor.min(tasks.len().saturating_sub(1));
        let offset = if active_col { scroll_offset(cursor, rows) } else { 0 };
        for (i, t) in tasks.iter().enumerate().skip(offset).take(rows) {
            let y = body.y + 1 + (i - offset) as u16;
            let line = fit(&format!(" #{} {}", t.id, t.text), usize::from(col_w - 1));
            if active_col && i == cursor {
                surface.write_at_styled(x, y, &line, token::SELECTED_FG, Some(token::SELECTED_BG))?;
            } else {
                let tok = match t.priority {
                    Some(Priority::High) => token::PRIORITY_HIGH,
                    _ if !t.is_active() => token::MUTED,
                    _ => token::TEXT,
                };
                surface.write_at_styled(x, y, &line, tok, None)?;
            }
        }
    }
    Ok(())
}

pub fn handle_kanban(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let columns = KANBAN_COLUMNS.len();
    match key.code {
        KeyCode::Esc => return ctx.back(),
        KeyCode::Left => {
            ctx.kanban_column = (ctx.kanban_column + columns - 1) % columns;
            ctx.set_cursor(ViewId::Kanban, 0);
            return Ok(());
        }
        KeyCode::Right => {
            ctx.kanban_column = (ctx.kanban_column + 1) % columns;
            ctx.set_cursor(ViewId::Kanban, 0);
            return Ok(());
        }
        _ => {}
    }
    let len = column_tasks(ctx, ctx.kanban_column).len();
    if move_by_key(ctx, ViewId::Kanban, &key, len) {
        return Ok(());
    }
    let id = selected_task_id(ctx);
    let step: Option<isize> = match plain_char(&key) {
        Some('<') | Some(',') => Some(-1),
        Some('>') | Some('.') => Some(1),
        _ => None,
    };
    match (step, id) {
        (Some(step), Some(id)) => {
            let target = ctx.kanban_column as isize + step;
            if target < 0 || target >= columns as isize {
                return Ok(());
            }
            let status = KANBAN_COLUMNS[target as usize];
            ctx.commit(&format!("move task {} to {}", id, status.as_str()), |db| {
                db.task_mut(id).ok_or_else(|| missing(id))?.set_status(status);
                Ok(())
            })?;
            ctx.kanban_column = target as usize;
            let row = column_tasks(ctx, ctx.kanban_column).iter().position(|t| t.id == id).unwrap_or(0);
            ctx.set_cursor(ViewId::Kanban, row);
            Ok(())
        }
        _ => {
            handle_task_key(ctx, &key, id)?;
            Ok(())
        }
    }
}

fn detail_task(ctx: &ViewContext) -> Option<&Task> {
    ctx.selected_task.and_then(|id| ctx.db.task(id))
}

pub fn draw_detail(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let task = detail_task(ctx).ok_or_else(|| DrawError::Missing("The selected task no longer exists".into()))?;
    let blocked = if ctx.db.is_blocked(task) { "  (blocked)" } else { "" };
    let body = widgets::header(surface, area, &format!("Task #{}{}", task.id, blocked), task.status.label())?;

    let stamp = |t: Option<chrono::NaiveDateTime>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_else(|| "-".into())
    };
    let due = match (task.due.as_deref(), task.due_date()) {
        (Some(raw), Some(d)) => format!("{} ({})", raw, format_due_relative(Some(d), ctx.today)),
        (Some(raw), None) => format!("{} (unrecognised)", raw),
        (None, _) => "-".into(),
    };
    let depends = if task.depends.is_empty() {
        "-".to_string()
    } else {
        task.depends
            .iter()
            .map(|d| match ctx.db.task(*d) {
                Some(dep) if dep.is_active() => format!("#{} (open)", d),
                Some(_) => format!("#{} (done)", d),
                None => format!("#{} (missing)", d),
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let pairs = [
        ("Text", task.text.clone()),
        ("Priority", task.priority.map(|p| p.as_str()).unwrap_or("-").to_string()),
        ("Project", task.project.clone().unwrap_or_else(|| "-".into())),
        ("Due", due),
        ("Created", stamp(task.created)),
        ("Completed", stamp(task.completed)),
        ("Tags", if task.tags.is_empty() { "-".into() } else { task.tags.join(", ") }),
        ("Depends on", depends),
    ];
    let used = widgets::fields(surface, body, &pairs)?;
    let mut y = body.y + used + 1;
    let bottom = body.y + body.height;
    if y >= bottom {
        return Ok(());
    }

    let (done, total) = task.subtask_progress();
    surface.write_at_styled(body.x + 1, y, &format!("Subtasks ({}/{})", done, total), token::ACCENT, None)?;
    y += 1;
    let cursor = ctx.cursor(ViewId::TaskDetail);
    for (i, sub) in task.subtasks.iter().enumerate() {
        if y >= bottom {
            return Ok(());
        }
        let mark = if sub.done { "[x]" } else { "[ ]" };
        let line = format!("  {} {}", mark, sub.text);
        if i == cursor {
            surface.write_at_styled(body.x + 1, y, &line, token::SELECTED_FG, Some(token::SELECTED_BG))?;
        } else {
            surface.write_at_styled(body.x + 1, y, &line, if sub.done { token::MUTED } else { token::TEXT }, None)?;
        }
        y += 1;
    }

    y += 1;
    if y >= bottom {
        return Ok(());
    }
    surface.write_at_styled(body.x + 1, y, &format!("Notes ({})", task.notes.len()), token::ACCENT, None)?;
    y += 1;
    for note in task.notes.iter().rev() {
        if y >= bottom {
            break;
        }
        let line = format!("  {}  {}", note.created.format("%Y-%m-%d"), note.text);
        surface.write_at_styled(body.x + 1, y, &line, token::TEXT, None)?;
        y += 1;
    }
    Ok(())
}

pub fn handle_detail(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    let Some(task) = detail_task(ctx) else {
        return ctx.back();
    };
    let id = task.id;
    let subtasks = task.subtasks.len();
    if move_by_key(ctx, ViewId::TaskDetail, &key, subtasks) {
        return Ok(());
    }
    let cursor = ctx.cursor(ViewId::TaskDetail);
    match plain_char(&key) {
        Some(' ') if subtasks > 0 => {
            ctx.commit(&format!("toggle subtask {} of task {}", cursor + 1, id), |db| {
                let sub: &mut Subtask = db
                    .task_mut(id)
                    .and_then(|t| t.subtasks.get_mut(cursor))
                    .ok_or_else(|| "No subtask selected".to_string())?;
                sub.done = !sub.done;
                Ok(())
            })?;
        }
        Some('x') if subtasks > 0 => {
            ctx.commit(&format!("remove subtask {} of task {}", cursor + 1, id), |db| {
                let task = db.task_mut(id).ok_or_else(|| missing(id))?;
                if cursor >= task.subtasks.len() {
                    return Err("No subtask selected".to_string());
                }
                task.subtasks.remove(cursor);
                Ok(())
            })?;
            ctx.move_cursor(ViewId::TaskDetail, 0, subtasks - 1);
        }
        Some('a') => ctx.open(ViewId::SubtaskAdd)?,
        Some('n') => ctx.open(ViewId::NoteAdd)?,
        Some('b') => ctx.open(ViewId::DependencyAdd)?,
        Some(' ') => toggle_complete(ctx, id)?,
        _ => {
            if key.code != KeyCode::Enter {
                handle_task_key(ctx, &key, Some(id))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DataPipeline;
    use crate::tui::testing::{ch, key, key_event, sample_database, sample_today, MemoryStore};

    fn context(view: ViewId) -> (ViewContext, MemoryStore) {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = ViewContext::new(DataPipeline::new(Box::new(store.clone())), view, sample_today());
        ctx.load().unwrap();
        (ctx, store)
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_list_filters() {
        let (mut ctx, _) = context(ViewId::TaskList);
        assert_eq!(ids(&visible(&ctx, ViewId::TaskList)), vec![1, 2, 3, 5]);
        assert_eq!(ids(&visible(&ctx, ViewId::OverdueTasks)), vec![1]);
        assert_eq!(ids(&visible(&ctx, ViewId::TodayTasks)), vec![2]);
        assert_eq!(ids(&visible(&ctx, ViewId::TomorrowTasks)), vec![3]);
        assert_eq!(ids(&visible(&ctx, ViewId::WeekTasks)), vec![2, 3]);
        assert_eq!(ids(&visible(&ctx, ViewId::NoDueTasks)), vec![5]);
        assert_eq!(ids(&visible(&ctx, ViewId::BlockedTasks)), vec![5]);
        assert_eq!(ids(&visible(&ctx, ViewId::CompletedTasks)), vec![4]);
        assert_eq!(ids(&visible(&ctx, ViewId::HighPriorityTasks)), vec![1]);
        assert_eq!(ids(&visible(&ctx, ViewId::NextActions)), vec![1, 2, 3]);

        ctx.query.project = Some("work".into());
        assert_eq!(ids(&visible(&ctx, ViewId::TaskList)), vec![1, 2, 5]);
        ctx.show_completed = true;
        ctx.query.project = None;
        assert_eq!(visible(&ctx, ViewId::TaskList).len(), 5);
    }

    #[test]
    fn test_search_only_applies_to_results_view() {
        let (mut ctx, _) = context(ViewId::TaskList);
        ctx.query.search = Some("bug".into());
        assert_eq!(ids(&visible(&ctx, ViewId::SearchResults)), vec![2]);
        assert_eq!(visible(&ctx, ViewId::TaskList).len(), 4);
    }

    #[test]
    fn test_space_completes_selected_task() {
        let (mut ctx, store) = context(ViewId::TaskList);
        handle_list(&mut ctx, key_event(key(KeyCode::Down))).unwrap();
        handle_list(&mut ctx, key_event(ch(' '))).unwrap();
        assert_eq!(store.data().task(2).unwrap().status, Status::Completed);
        assert_eq!(ctx.status.as_deref(), Some("Task 2 completed"));
    }

    #[test]
    fn test_enter_opens_detail_and_escape_returns() {
        let (mut ctx, _) = context(ViewId::TaskList);
        handle_list(&mut ctx, key_event(key(KeyCode::End))).unwrap();
        handle_list(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(ctx.current(), ViewId::TaskDetail);
        assert_eq!(ctx.selected_task, Some(5));
        handle_detail(&mut ctx, key_event(key(KeyCode::Esc))).unwrap();
        assert_eq!(ctx.current(), ViewId::TaskList);
    }

    #[test]
    fn test_agenda_groups_by_due() {
        let (ctx, _) = context(ViewId::Agenda);
        let groups = agenda_groups(&ctx);
        let names: Vec<&str> = groups.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["Overdue", "Today", "Tomorrow", "No date"]);
        assert_eq!(ids(&agenda_tasks(&ctx)), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_kanban_moves_task_between_columns() {
        let (mut ctx, store) = context(ViewId::Kanban);
        // Pending column holds 1, 3, 5.
        handle_kanban(&mut ctx, key_event(key(KeyCode::Down))).unwrap();
        handle_kanban(&mut ctx, key_event(ch('>'))).unwrap();
        assert_eq!(store.data().task(3).unwrap().status, Status::InProgress);
        assert_eq!(ctx.kanban_column, 1);
        assert_eq!(selected_task_id(&ctx), Some(3));

        // Left edge does nothing.
        ctx.kanban_column = 0;
        ctx.set_cursor(ViewId::Kanban, 0);
        handle_kanban(&mut ctx, key_event(ch('<'))).unwrap();
        assert_eq!(store.data().task(1).unwrap().status, Status::Pending);
    }

    #[test]
    fn test_detail_toggles_subtasks() {
        let (mut ctx, store) = context(ViewId::TaskDetail);
        ctx.commit("seed", |db| {
            let t = db.task_mut(1).ok_or("missing")?;
            t.subtasks.push(Subtask { text: "outline".into(), done: false });
            t.subtasks.push(Subtask { text: "draft".into(), done: false });
            Ok(())
        })
        .unwrap();
        ctx.selected_task = Some(1);
        handle_detail(&mut ctx, key_event(key(KeyCode::Down))).unwrap();
        handle_detail(&mut ctx, key_event(ch(' '))).unwrap();
        let task = store.data().task(1).cloned().unwrap();
        assert!(!task.subtasks[0].done);
        assert!(task.subtasks[1].done);

        handle_detail(&mut ctx, key_event(ch('x'))).unwrap();
        assert_eq!(store.data().task(1).unwrap().subtasks.len(), 1);
        assert_eq!(ctx.cursor(ViewId::TaskDetail), 0);
    }
}
