//! Forms and pickers that create or change a single task.

use std::collections::HashSet;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use tracing::info;

use crate::dates::parse_due_on;
use crate::db::Database;
use crate::fields::{Priority, Status};
use crate::project::split_tags;
use crate::task::{Subtask, Task};
use crate::tui::context::ViewContext;
use crate::tui::enums::ViewId;
use crate::tui::form::{Form, FormEvent};
use crate::tui::keys::plain_char;
use crate::tui::surface::TerminalSurface;
use crate::tui::views::tasks::move_by_key;
use crate::tui::views::{DrawError, ViewError};
use crate::tui::widgets;

const NO_VALUE: &str = "-";
const NO_PROJECT: &str = "(no project)";

/// A task parsed from the quick-add line.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickTask {
    pub text: String,
    pub project: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<NaiveDate>,
    pub tags: Vec<String>,
}

/// Parse `text @project !priority due:<when> #tag`. Markers may appear
/// anywhere; the remaining words form the task text.
pub fn parse_quick_add(input: &str, today: NaiveDate) -> Result<QuickTask, String> {
    let mut words = Vec::new();
    let mut task = QuickTask {
        text: String::new(),
        project: None,
        priority: None,
        due: None,
        tags: Vec::new(),
    };
    for word in input.split_whitespace() {
        if let Some(project) = word.strip_prefix('@').filter(|p| !p.is_empty()) {
            task.project = Some(project.to_string());
        } else if let Some(p) = word.strip_prefix('!').filter(|p| !p.is_empty()) {
            task.priority = Some(Priority::parse(p).ok_or_else(|| format!("Unknown priority '{}'", p))?);
        } else if let Some(when) = word.strip_prefix("due:").filter(|w| !w.is_empty()) {
            let due = parse_due_on(when, today)
                .or_else(|| parse_due_on(&when.replace(['_', '-'], " "), today))
                .ok_or_else(|| format!("Unrecognised due date '{}'", when))?;
            task.due = Some(due);
        } else if let Some(tag) = word.strip_prefix('#').filter(|t| !t.is_empty()) {
            task.tags.extend(split_tags(tag));
        } else {
            words.push(word);
        }
    }
    task.text = words.join(" ");
    if task.text.is_empty() {
        return Err("Task text cannot be empty".to_string());
    }
    Ok(task)
}

/// Empty clears the due date; anything else must parse.
fn parse_due_field(raw: Option<String>, today: NaiveDate) -> Result<Option<String>, String> {
    match raw {
        None => Ok(None),
        Some(raw) => parse_due_on(&raw, today)
            .map(|d| Some(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| format!("Unrecognised due date '{}'", raw)),
    }
}

/// Canonical spelling of a project name already in use, else the input.
fn canonical_project(db: &Database, name: &str) -> String {
    db.project_names()
        .into_iter()
        .find(|n| n.eq_ignore_ascii_case(name))
        .unwrap_or_else(|| name.to_string())
}

fn priority_options() -> Vec<String> {
    std::iter::once(NO_VALUE)
        .chain(Priority::ALL.iter().map(|p| p.as_str()))
        .map(String::from)
        .collect()
}

fn priority_index(p: Option<Priority>) -> usize {
    p.and_then(|p| Priority::ALL.iter().position(|x| *x == p)).map_or(0, |i| i + 1)
}

fn priority_at(index: usize) -> Option<Priority> {
    index.checked_sub(1).and_then(|i| Priority::ALL.get(i).copied())
}

/// Projects a task can be assigned to; archived projects are left out.
fn project_options(db: &Database) -> Vec<String> {
    std::iter::once(NO_PROJECT.to_string())
        .chain(
            db.project_names()
                .into_iter()
                .filter(|n| !db.project(n).is_some_and(|p| p.is_archived())),
        )
        .collect()
}

fn project_index(options: &[String], project: Option<&str>) -> usize {
    project
        .and_then(|p| options.iter().position(|o| o.eq_ignore_ascii_case(p)))
        .unwrap_or(0)
}

fn project_at(options: &[String], index: usize) -> Option<String> {
    options.get(index).filter(|o| o.as_str() != NO_PROJECT).cloned()
}

fn target_task(ctx: &ViewContext) -> Result<&Task, ViewError> {
    let id = ctx
        .selected_task
        .ok_or_else(|| ViewError::Invalid("No task selected".to_string()))?;
    ctx.db
        .task(id)
        .ok_or_else(|| ViewError::Invalid(format!("Task {} not found", id)))
}

pub fn enter_form(ctx: &mut ViewContext) -> Result<(), ViewError> {
    let view = ctx.current();
    let form = match view {
        ViewId::TaskAdd => {
            let options = project_options(&ctx.db);
            let focus = project_index(&options, ctx.query.project.as_deref());
            Form::new(view)
                .text("Text", "")
                .choice("Priority", priority_options(), 0)
                .choice("Project", options, focus)
                .text("Due", "")
                .text("Tags", "")
        }
        ViewId::TaskEdit => {
            let task = target_task(ctx)?;
            let options = project_options(&ctx.db);
            let project = project_index(&options, task.project.as_deref());
            let statuses = Status::ALL.iter().map(|s| s.label().to_string()).collect();
            let status = Status::ALL.iter().position(|s| *s == task.status).unwrap_or(0);
            Form::new(view)
                .text("Text", &task.text)
                .choice("Status", statuses, status)
                .choice("Priority", priority_options(), priority_index(task.priority))
                .choice("Project", options, project)
                .text("Due", task.due.as_deref().unwrap_or(""))
                .text("Tags", &task.tags.join(", "))
                .target(task.id)
        }
        ViewId::QuickAdd => Form::new(view).text("Task", ""),
        ViewId::TaskSetDue => {
            let task = target_task(ctx)?;
            Form::new(view)
                .text("Due", task.due.as_deref().unwrap_or(""))
                .target(task.id)
        }
        ViewId::SubtaskAdd => Form::new(view).text("Subtask", "").target(target_task(ctx)?.id),
        ViewId::NoteAdd => Form::new(view).text("Note", "").target(target_task(ctx)?.id),
        ViewId::DependencyAdd => Form::new(view).text("Depends on", "").target(target_task(ctx)?.id),
        ViewId::SearchPrompt => Form::new(view).text("Search", ctx.query.search.as_deref().unwrap_or("")),
        other => return Err(ViewError::Invalid(format!("{} has no form", other.title()))),
    };
    ctx.form = Some(form);
    Ok(())
}

fn form_detail(ctx: &ViewContext, form: &Form) -> String {
    match form.target.and_then(|id| ctx.db.task(id)) {
        Some(task) => format!("#{} {}", task.id, task.text),
        None => String::new(),
    }
}

pub fn draw_form(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let view = ctx.current();
    let form = ctx
        .form
        .as_ref()
        .filter(|f| f.view == view)
        .ok_or_else(|| DrawError::Missing(format!("{} form is not open", view.title())))?;
    let body = widgets::header(surface, area, view.title(), &form_detail(ctx, form))?;
    widgets::form(surface, body, form)?;

    let below = (form.fields.len() as u16) * 2;
    if view == ViewId::QuickAdd && body.height > below {
        let line = body.y + below;
        let preview = match parse_quick_add(&form.value("Task"), ctx.today) {
            Ok(q) => {
                let mut parts = vec![format!("\"{}\"", q.text)];
                parts.extend(q.project.map(|p| format!("@{}", p)));
                parts.extend(q.priority.map(|p| format!("!{}", p.as_str())));
                parts.extend(q.due.map(|d| format!("due {}", d.format("%a %Y-%m-%d"))));
                parts.extend(q.tags.iter().map(|t| format!("#{}", t)));
                format!("-> {}", parts.join("  "))
            }
            Err(e) => e,
        };
        widgets::muted_line(surface, Rect::new(body.x, line, body.width, 1), &preview)?;
    }
    Ok(())
}

pub fn handle_form(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let view = ctx.current();
    let Some(form) = ctx.form.as_mut().filter(|f| f.view == view) else {
        return ctx.back();
    };
    match form.handle_key(&key) {
        FormEvent::Editing => Ok(()),
        FormEvent::Cancel => {
            ctx.form = None;
            ctx.back()
        }
        FormEvent::Submit => {
            let form = form.clone();
            submit(ctx, &form)
        }
    }
}

fn submit(ctx: &mut ViewContext, form: &Form) -> Result<(), ViewError> {
    let today = ctx.today;
    match form.view {
        ViewId::TaskAdd => {
            let text = form.optional("Text").ok_or_else(|| ViewError::Invalid("Task text cannot be empty".into()))?;
            let due = parse_due_field(form.optional("Due"), today).map_err(ViewError::Invalid)?;
            let options = project_options(&ctx.db);
            let quick = QuickTask {
                text,
                project: project_at(&options, form.selected("Project")),
                priority: priority_at(form.selected("Priority")),
                due: None,
                tags: split_tags(&form.value("Tags")),
            };
            add_task(ctx, quick, due)
        }
        ViewId::QuickAdd => {
            let quick = parse_quick_add(&form.value("Task"), today).map_err(ViewError::Invalid)?;
            let due = quick.due.map(|d| d.format("%Y-%m-%d").to_string());
            add_task(ctx, quick, due)
        }
        ViewId::TaskEdit => {
            let id = form.target.ok_or_else(|| ViewError::Invalid("No task selected".into()))?;
            let text = form.optional("Text").ok_or_else(|| ViewError::Invalid("Task text cannot be empty".into()))?;
            let due = match form.optional("Due") {
                // An unchanged value that never parsed is kept as typed.
                Some(raw) if ctx.db.task(id).and_then(|t| t.due.as_deref()) == Some(raw.as_str()) => Some(raw),
                other => parse_due_field(other, today).map_err(ViewError::Invalid)?,
            };
            let status = Status::ALL.get(form.selected("Status")).copied().unwrap_or_default();
            let priority = priority_at(form.selected("Priority"));
            let project = project_at(&project_options(&ctx.db), form.selected("Project"));
            let tags = split_tags(&form.value("Tags"));
            ctx.commit(&format!("edit task {}", id), |db| {
                let task = db.task_mut(id).ok_or_else(|| format!("Task {} not found", id))?;
                task.text = text;
                task.priority = priority;
                task.project = project;
                task.due = due;
                task.tags = tags;
                if task.status != status {
                    task.set_status(status);
                }
                Ok(())
            })?;
            finish(ctx, format!("Task {} updated", id))
        }
        ViewId::TaskSetDue => {
            let id = form.target.ok_or_else(|| ViewError::Invalid("No task selected".into()))?;
            let due = parse_due_field(form.optional("Due"), today).map_err(ViewError::Invalid)?;
            let message = match &due {
                Some(d) => format!("Task {} due {}", id, d),
                None => format!("Task {} has no due date", id),
            };
            ctx.commit(&format!("set due date of task {}", id), |db| {
                db.task_mut(id).ok_or_else(|| format!("Task {} not found", id))?.due = due;
                Ok(())
            })?;
            finish(ctx, message)
        }
        ViewId::SubtaskAdd => {
            let id = form.target.ok_or_else(|| ViewError::Invalid("No task selected".into()))?;
            let text = form.optional("Subtask").ok_or_else(|| ViewError::Invalid("Subtask cannot be empty".into()))?;
            ctx.commit(&format!("add subtask to task {}", id), |db| {
                let task = db.task_mut(id).ok_or_else(|| format!("Task {} not found", id))?;
                task.subtasks.push(Subtask { text, done: false });
                Ok(())
            })?;
            finish(ctx, "Subtask added".to_string())
        }
        ViewId::NoteAdd => {
            let id = form.target.ok_or_else(|| ViewError::Invalid("No task selected".into()))?;
            let text = form.optional("Note").ok_or_else(|| ViewError::Invalid("Note cannot be empty".into()))?;
            ctx.commit(&format!("add note to task {}", id), |db| {
                db.task_mut(id).ok_or_else(|| format!("Task {} not found", id))?.add_note(&text);
                Ok(())
            })?;
            finish(ctx, "Note added".to_string())
        }
        ViewId::DependencyAdd => {
            let id = form.target.ok_or_else(|| ViewError::Invalid("No task selected".into()))?;
            let raw = form.value("Depends on");
            let dep: u64 = raw
                .trim()
                .trim_start_matches('#')
                .parse()
                .map_err(|_| ViewError::Invalid(format!("'{}' is not a task id", raw.trim())))?;
            ctx.commit(&format!("task {} depends on {}", id, dep), |db| add_dependency(db, id, dep))?;
            finish(ctx, format!("Task {} now waits for #{}", id, dep))
        }
        ViewId::SearchPrompt => {
            ctx.form = None;
            match form.optional("Search") {
                Some(search) => {
                    info!(%search, "search");
                    ctx.query.search = Some(search);
                    ctx.set_cursor(ViewId::SearchResults, 0);
                    ctx.nav.replace(ViewId::SearchResults);
                    ctx.load()
                }
                None => {
                    ctx.query.search = None;
                    ctx.set_status("Search cleared");
                    ctx.back()
                }
            }
        }
        other => Err(ViewError::Invalid(format!("{} has no form", other.title()))),
    }
}

fn add_task(ctx: &mut ViewContext, quick: QuickTask, due: Option<String>) -> Result<(), ViewError> {
    let id = ctx.db.next_task_id();
    ctx.commit(&format!("add task {}", id), |db| {
        let mut task = Task::new(id, &quick.text);
        task.project = quick.project.map(|p| canonical_project(db, &p));
        task.priority = quick.priority;
        task.due = due;
        task.tags = quick.tags;
        db.tasks.push(task);
        Ok(())
    })?;
    info!(id, "task added");
    ctx.selected_task = Some(id);
    finish(ctx, format!("Added task {}", id))
}

/// Close the form and return to where it was opened from.
fn finish(ctx: &mut ViewContext, message: String) -> Result<(), ViewError> {
    ctx.form = None;
    ctx.back()?;
    ctx.set_status(message);
    Ok(())
}

/// Whether `from` reaches `target` through dependency edges.
fn reaches(db: &Database, from: u64, target: u64) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        if id == target {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        if let Some(task) = db.task(id) {
            stack.extend(task.depends.iter().copied());
        }
    }
    false
}

fn add_dependency(db: &mut Database, id: u64, dep: u64) -> Result<(), String> {
    if id == dep {
        return Err("A task cannot depend on itself".to_string());
    }
    if db.task(dep).is_none() {
        return Err(format!("Task {} not found", dep));
    }
    if reaches(db, dep, id) {
        return Err(format!("Task {} already depends on task {}", dep, id));
    }
    let task = db.task_mut(id).ok_or_else(|| format!("Task {} not found", id))?;
    if task.depends.contains(&dep) {
        return Err(format!("Task {} already depends on #{}", id, dep));
    }
    task.depends.push(dep);
    task.depends.sort_unstable();
    Ok(())
}

fn choice_options(ctx: &ViewContext, view: ViewId) -> Vec<String> {
    match view {
        ViewId::TaskSetPriority => Priority::ALL.iter().map(|p| p.as_str().to_string()).collect(),
        _ => project_options(&ctx.db),
    }
}

/// Index of the task's current value among the options.
fn current_choice(ctx: &ViewContext, view: ViewId, task: &Task) -> Option<usize> {
    match view {
        ViewId::TaskSetPriority => task.priority.and_then(|p| Priority::ALL.iter().position(|x| *x == p)),
        _ => Some(project_index(&choice_options(ctx, view), task.project.as_deref())),
    }
}

pub fn enter_choice(ctx: &mut ViewContext) -> Result<(), ViewError> {
    let view = ctx.current();
    let task = target_task(ctx)?;
    let cursor = current_choice(ctx, view, task).unwrap_or(0);
    ctx.set_cursor(view, cursor);
    Ok(())
}

pub fn draw_choice(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let view = ctx.current();
    let task = target_task(ctx).map_err(|e| DrawError::Missing(e.to_string()))?;
    let body = widgets::header(surface, area, view.title(), &format!("#{} {}", task.id, task.text))?;
    let options = choice_options(ctx, view);
    let marked = current_choice(ctx, view, task);
    widgets::select_list(surface, body, &options, ctx.cursor(view), marked)?;
    Ok(())
}

pub fn handle_choice(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let view = ctx.current();
    let options = choice_options(ctx, view);
    if move_by_key(ctx, view, &key, options.len()) {
        return Ok(());
    }
    match key.code {
        KeyCode::Esc => ctx.back(),
        KeyCode::Enter => {
            let id = target_task(ctx)?.id;
            let index = ctx.cursor(view);
            let message = if view == ViewId::TaskSetPriority {
                let priority = Priority::ALL.get(index).copied();
                ctx.commit(&format!("set priority of task {}", id), |db| {
                    db.task_mut(id).ok_or_else(|| format!("Task {} not found", id))?.priority = priority;
                    Ok(())
                })?;
                format!("Task {} priority {}", id, priority.map_or("-", |p| p.as_str()))
            } else {
                let project = project_at(&options, index);
                let message = match &project {
                    Some(p) => format!("Task {} moved to {}", id, p),
                    None => format!("Task {} removed from its project", id),
                };
                ctx.commit(&format!("move task {}", id), |db| {
                    db.task_mut(id).ok_or_else(|| format!("Task {} not found", id))?.project = project;
                    Ok(())
                })?;
                message
            };
            ctx.back()?;
            ctx.set_status(message);
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn draw_delete(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let task = target_task(ctx).map_err(|e| DrawError::Missing(e.to_string()))?;
    let mut lines = vec![format!("Delete task #{}?", task.id), task.text.clone()];
    let dependants = ctx.db.tasks.iter().filter(|t| t.depends.contains(&task.id)).count();
    if dependants > 0 {
        lines.push(format!("{} task(s) depend on it", dependants));
    }
    lines.push(String::new());
    lines.push("y: delete   n/Esc: keep".to_string());
    widgets::confirm_box(surface, area, "Delete Task", &lines)?;
    Ok(())
}

pub fn handle_delete(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    match plain_char(&key).map(|c| c.to_ascii_lowercase()) {
        Some('y') => {
            let id = target_task(ctx)?.id;
            ctx.commit(&format!("delete task {}", id), |db| {
                db.remove_task(id).map(|_| ()).ok_or_else(|| format!("Task {} not found", id))
            })?;
            info!(id, "task deleted");
            ctx.selected_task = None;
            ctx.back()?;
            if ctx.current() == ViewId::TaskDetail {
                ctx.nav.replace(ViewId::TaskList);
            }
            ctx.set_status(format!("Deleted task {}", id));
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
    use crate::tui::testing::{ch, key, key_event, sample_database, sample_today, text, MemoryStore};

    fn context(view: ViewId) -> (ViewContext, MemoryStore) {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = ViewContext::new(DataPipeline::new(Box::new(store.clone())), view, sample_today());
        ctx.load().unwrap();
        (ctx, store)
    }

    fn type_text(ctx: &mut ViewContext, s: &str) {
        for event in text(s) {
            handle_form(ctx, key_event(event)).unwrap();
        }
    }

    #[test]
    fn test_parse_quick_add() {
        let q = parse_quick_add("Call the bank @Home !high due:fri #admin", sample_today()).unwrap();
        assert_eq!(q.text, "Call the bank");
        assert_eq!(q.project.as_deref(), Some("Home"));
        assert_eq!(q.priority, Some(Priority::High));
        assert_eq!(q.due, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(q.tags, vec!["admin".to_string()]);

        let q = parse_quick_add("ship it due:next_mon", sample_today()).unwrap();
        assert_eq!(q.due, NaiveDate::from_ymd_opt(2025, 1, 20));
    }

    #[test]
    fn test_parse_quick_add_rejects_bad_markers() {
        assert!(parse_quick_add("@Work !high", sample_today()).is_err());
        assert!(parse_quick_add("thing !urgent", sample_today()).is_err());
        assert!(parse_quick_add("thing due:someday", sample_today()).is_err());
    }

    #[test]
    fn test_quick_add_creates_task_and_returns() {
        let (mut ctx, store) = context(ViewId::TaskList);
        ctx.open(ViewId::QuickAdd).unwrap();
        type_text(&mut ctx, "Water plants @home due:tomorrow");
        handle_form(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();

        let task = store.data().task(6).cloned().unwrap();
        assert_eq!(task.text, "Water plants");
        assert_eq!(task.project.as_deref(), Some("Home"));
        assert_eq!(task.due.as_deref(), Some("2025-01-09"));
        assert_eq!(ctx.current(), ViewId::TaskList);
        assert_eq!(ctx.status.as_deref(), Some("Added task 6"));
        assert!(ctx.form.is_none());
    }

    #[test]
    fn test_invalid_submit_keeps_form_open() {
        let (mut ctx, store) = context(ViewId::TaskList);
        ctx.open(ViewId::TaskAdd).unwrap();
        type_text(&mut ctx, "Something");
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        type_text(&mut ctx, "whenever");
        let result = handle_form(&mut ctx, key_event(key(KeyCode::Enter)));
        assert!(matches!(result, Err(ViewError::Invalid(_))));
        assert_eq!(ctx.current(), ViewId::TaskAdd);
        assert!(ctx.form.is_some());
        assert_eq!(store.data().tasks.len(), 5);
    }

    #[test]
    fn test_edit_prefills_and_saves() {
        let (mut ctx, store) = context(ViewId::TaskList);
        ctx.selected_task = Some(3);
        ctx.open(ViewId::TaskEdit).unwrap();
        assert_eq!(ctx.form.as_ref().unwrap().value("Text"), "Buy groceries");
        type_text(&mut ctx, " and milk");
        // Status: Pending -> In Progress.
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Right))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();

        let task = store.data().task(3).cloned().unwrap();
        assert_eq!(task.text, "Buy groceries and milk");
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.due.as_deref(), Some("2025-01-09"));
        assert_eq!(ctx.current(), ViewId::TaskList);
    }

    #[test]
    fn test_dependency_cycles_are_rejected() {
        let mut db = sample_database();
        assert!(add_dependency(&mut db, 2, 5).is_err());
        assert!(add_dependency(&mut db, 2, 2).is_err());
        assert!(add_dependency(&mut db, 2, 42).is_err());
        add_dependency(&mut db, 5, 1).unwrap();
        assert_eq!(db.task(5).unwrap().depends, vec![1, 2]);
    }

    #[test]
    fn test_priority_picker_starts_on_current_value() {
        let (mut ctx, store) = context(ViewId::TaskList);
        ctx.selected_task = Some(2);
        ctx.open(ViewId::TaskSetPriority).unwrap();
        assert_eq!(ctx.cursor(ViewId::TaskSetPriority), 1);
        handle_choice(&mut ctx, key_event(key(KeyCode::Up))).unwrap();
        handle_choice(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(store.data().task(2).unwrap().priority, Some(Priority::High));
        assert_eq!(ctx.current(), ViewId::TaskList);
    }

    #[test]
    fn test_move_to_project() {
        let (mut ctx, store) = context(ViewId::TaskList);
        ctx.selected_task = Some(3);
        ctx.open(ViewId::TaskMoveProject).unwrap();
        // (no project), Home, Work
        assert_eq!(ctx.cursor(ViewId::TaskMoveProject), 1);
        handle_choice(&mut ctx, key_event(key(KeyCode::Down))).unwrap();
        handle_choice(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(store.data().task(3).unwrap().project.as_deref(), Some("Work"));
    }

    #[test]
    fn test_delete_from_detail_lands_on_list() {
        let (mut ctx, store) = context(ViewId::TaskList);
        ctx.selected_task = Some(1);
        ctx.open(ViewId::TaskDetail).unwrap();
        ctx.open(ViewId::TaskDeleteConfirm).unwrap();
        handle_delete(&mut ctx, key_event(ch('y'))).unwrap();
        assert!(store.data().task(1).is_none());
        assert_eq!(ctx.current(), ViewId::TaskList);
    }

    #[test]
    fn test_search_prompt_shows_results() {
        let (mut ctx, _) = context(ViewId::TaskList);
        ctx.open(ViewId::SearchPrompt).unwrap();
        type_text(&mut ctx, "groc");
        handle_form(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(ctx.current(), ViewId::SearchResults);
        assert_eq!(ctx.query.search.as_deref(), Some("groc"));
        assert_eq!(ctx.selected_task_id(), Some(3));
    }
}
