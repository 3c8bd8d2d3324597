//! Project list, detail, add/edit form, archive confirmation and stats.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use tracing::info;

use crate::dates::{format_hours, format_minutes, parse_due_on};
use crate::db::Database;
use crate::fields::ProjectStatus;
use crate::pipeline::{compute_stats, project_summaries};
use crate::project::{split_tags, validate_project_name, Project};
use crate::task::Task;
use crate::tui::colors::token;
use crate::tui::context::ViewContext;
use crate::tui::enums::ViewId;
use crate::tui::form::{Form, FormEvent};
use crate::tui::keys::plain_char;
use crate::tui::surface::TerminalSurface;
use crate::tui::utils::{fit, scroll_offset};
use crate::tui::views::tasks::move_by_key;
use crate::tui::views::{DrawError, ViewError};
use crate::tui::widgets;

const PROJECT_STATUSES: [ProjectStatus; 4] = [
    ProjectStatus::Active,
    ProjectStatus::OnHold,
    ProjectStatus::Completed,
    ProjectStatus::Archived,
];

fn sorted_projects(db: &Database) -> Vec<&Project> {
    let mut projects: Vec<&Project> = db.projects.iter().collect();
    projects.sort_by_key(|p| p.name.to_lowercase());
    projects
}

fn project_tasks<'a>(db: &'a Database, name: &str) -> Vec<&'a Task> {
    db.tasks
        .iter()
        .filter(|t| t.project.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(name)))
        .collect()
}

fn logged_minutes(db: &Database, name: &str) -> u32 {
    db.time_entries
        .iter()
        .filter(|e| e.project.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(name)))
        .map(|e| e.minutes)
        .sum()
}

fn selected_project<'a>(ctx: &'a ViewContext) -> Result<&'a Project, ViewError> {
    let name = ctx
        .selected_project
        .as_deref()
        .ok_or_else(|| ViewError::Invalid("No project selected".to_string()))?;
    ctx.db
        .project(name)
        .ok_or_else(|| ViewError::Invalid(format!("Project '{}' not found", name)))
}

/// Remember the project under the list cursor and open `view` for it.
fn open_selected(ctx: &mut ViewContext, view: ViewId) -> Result<(), ViewError> {
    let cursor = ctx.cursor(ViewId::ProjectList);
    let Some(name) = sorted_projects(&ctx.db).get(cursor).map(|p| p.name.clone()) else {
        return Ok(());
    };
    ctx.selected_project = Some(name);
    ctx.open(view)
}

fn set_focus(ctx: &mut ViewContext, name: String) {
    ctx.set_status(format!("Focused on {}", name));
    ctx.query.project = Some(name);
    ctx.refresh_stats();
}

pub fn draw_list(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let projects = sorted_projects(&ctx.db);
    let focus = ctx.query.project.as_deref().map(|f| format!("focus: {}", f)).unwrap_or_default();
    let body = widgets::header(surface, area, "Projects", &focus)?;
    if projects.is_empty() {
        widgets::muted_line(surface, body, "No projects yet. Press a to add one.")?;
        return Ok(());
    }
    if body.height == 0 {
        return Ok(());
    }
    let width = usize::from(body.width.saturating_sub(2));
    let head = format!("{:<20} {:<10} {:>5} {:>5} {:>8}  Client", "Name", "Status", "Open", "Done", "Logged");
    surface.write_at_styled(body.x + 1, body.y, &fit(&head, width), token::MUTED, None)?;

    let rows = usize::from(body.height - 1);
    let cursor = ctx.cursor(ViewId::ProjectList).min(projects.len() - 1);
    let offset = scroll_offset(cursor, rows);
    for (i, project) in projects.iter().enumerate().skip(offset).take(rows) {
        let y = body.y + 1 + (i - offset) as u16;
        let stats = compute_stats(
            &project_tasks(&ctx.db, &project.name).into_iter().cloned().collect::<Vec<_>>(),
            ctx.today,
        );
        let line = format!(
            "{:<20} {:<10} {:>5} {:>5} {:>8}  {}",
            fit(&project.name, 20),
            project.status.as_str(),
            stats.active,
            stats.completed,
            format_minutes(logged_minutes(&ctx.db, &project.name)),
            project.client.as_deref().unwrap_or(""),
        );
        let line = fit(&line, width);
        if i == cursor {
            surface.write_at_styled(body.x + 1, y, &line, token::SELECTED_FG, Some(token::SELECTED_BG))?;
        } else if project.is_archived() {
            surface.write_at_styled(body.x + 1, y, &line, token::MUTED, None)?;
        } else {
            surface.write_at_styled(body.x + 1, y, &line, token::PROJECT, None)?;
        }
    }
    Ok(())
}

pub fn handle_list(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let len = ctx.db.projects.len();
    if move_by_key(ctx, ViewId::ProjectList, &key, len) {
        return Ok(());
    }
    match key.code {
        KeyCode::Esc => return ctx.back(),
        KeyCode::Enter => return open_selected(ctx, ViewId::ProjectDetail),
        _ => {}
    }
    match plain_char(&key) {
        Some('a') => ctx.open(ViewId::ProjectAdd),
        Some('e') => open_selected(ctx, ViewId::ProjectEdit),
        Some('x') => open_selected(ctx, ViewId::ProjectArchiveConfirm),
        Some('s') => ctx.open(ViewId::ProjectStats),
        Some('f') => {
            let cursor = ctx.cursor(ViewId::ProjectList);
            if let Some(name) = sorted_projects(&ctx.db).get(cursor).map(|p| p.name.clone()) {
                set_focus(ctx, name);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn draw_detail(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let project = selected_project(ctx).map_err(|e| DrawError::Missing(e.to_string()))?;
    let body = widgets::header(surface, area, &project.name, project.status.as_str())?;
    let tasks = project_tasks(&ctx.db, &project.name);
    let stats = compute_stats(&tasks.iter().map(|t| (*t).clone()).collect::<Vec<_>>(), ctx.today);
    let minutes = logged_minutes(&ctx.db, &project.name);
    let logged = match project.budget_hours {
        Some(budget) => format!("{} of {}h budget", format_minutes(minutes), budget),
        None => format_minutes(minutes),
    };
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let pairs = [
        (
            "Description",
            if project.description.is_empty() { "-".to_string() } else { project.description.clone() },
        ),
        ("Client", or_dash(&project.client)),
        ("Assigned", or_dash(&project.assigned)),
        ("References", format!("{} / {}", or_dash(&project.id1), or_dash(&project.id2))),
        ("Due", or_dash(&project.due)),
        ("Tags", if project.tags.is_empty() { "-".into() } else { project.tags.join(", ") }),
        (
            "Tasks",
            format!("{} open, {} done, {} overdue", stats.active, stats.completed, stats.overdue),
        ),
        ("Logged", logged),
    ];
    let used = widgets::fields(surface, body, &pairs)?;
    let top = body.y + used + 1;
    if top >= body.y + body.height {
        return Ok(());
    }
    let open: Vec<&Task> = tasks.into_iter().filter(|t| t.is_active()).collect();
    let rest = Rect::new(body.x, top, body.width, body.y + body.height - top);
    widgets::task_table(surface, rest, &open, None, ctx.today)?;
    Ok(())
}

pub fn handle_detail(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    let name = selected_project(ctx)?.name.clone();
    match plain_char(&key) {
        Some('e') => ctx.open(ViewId::ProjectEdit),
        Some('x') => ctx.open(ViewId::ProjectArchiveConfirm),
        Some('f') => {
            set_focus(ctx, name);
            Ok(())
        }
        Some('t') => {
            set_focus(ctx, name);
            ctx.set_cursor(ViewId::TaskList, 0);
            ctx.open(ViewId::TaskList)
        }
        _ => Ok(()),
    }
}

pub fn enter_form(ctx: &mut ViewContext) -> Result<(), ViewError> {
    let view = ctx.current();
    let form = if view == ViewId::ProjectEdit {
        let p = selected_project(ctx)?;
        let statuses = PROJECT_STATUSES.iter().map(|s| s.as_str().to_string()).collect();
        let status = PROJECT_STATUSES.iter().position(|s| *s == p.status).unwrap_or(0);
        Form::new(view)
            .text("Name", &p.name)
            .text("Description", &p.description)
            .choice("Status", statuses, status)
            .text("Client", p.client.as_deref().unwrap_or(""))
            .text("Assigned", p.assigned.as_deref().unwrap_or(""))
            .text("Ref 1", p.id1.as_deref().unwrap_or(""))
            .text("Ref 2", p.id2.as_deref().unwrap_or(""))
            .text("Due", p.due.as_deref().unwrap_or(""))
            .text("Budget (h)", &p.budget_hours.map(|b| b.to_string()).unwrap_or_default())
            .text("Tags", &p.tags.join(", "))
    } else {
        Form::new(view)
            .text("Name", "")
            .text("Description", "")
            .text("Client", "")
            .text("Due", "")
            .text("Budget (h)", "")
            .text("Tags", "")
    };
    ctx.form = Some(form);
    Ok(())
}

pub fn draw_form(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let view = ctx.current();
    let form = ctx
        .form
        .as_ref()
        .filter(|f| f.view == view)
        .ok_or_else(|| DrawError::Missing(format!("{} form is not open", view.title())))?;
    let detail = if view == ViewId::ProjectEdit {
        ctx.selected_project.clone().unwrap_or_default()
    } else {
        String::new()
    };
    let body = widgets::header(surface, area, view.title(), &detail)?;
    widgets::form(surface, body, form)?;
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

fn parse_budget(raw: Option<String>) -> Result<Option<f64>, ViewError> {
    match raw {
        None => Ok(None),
        Some(raw) => match raw.trim_end_matches('h').trim().parse::<f64>() {
            Ok(b) if b.is_finite() && b >= 0.0 => Ok(Some(b)),
            _ => Err(ViewError::Invalid(format!("Budget '{}' is not a number of hours", raw))),
        },
    }
}

fn parse_due(raw: Option<String>, ctx: &ViewContext) -> Result<Option<String>, ViewError> {
    match raw {
        None => Ok(None),
        Some(raw) => parse_due_on(&raw, ctx.today)
            .map(|d| Some(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| ViewError::Invalid(format!("Unrecognised due date '{}'", raw))),
    }
}

/// Point tasks and time entries at a renamed project.
fn rename_references(db: &mut Database, old: &str, new: &str) {
    let matches = |p: &Option<String>| p.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(old));
    for task in db.tasks.iter_mut().filter(|t| matches(&t.project)) {
        task.project = Some(new.to_string());
    }
    for entry in db.time_entries.iter_mut().filter(|e| matches(&e.project)) {
        entry.project = Some(new.to_string());
    }
}

fn submit(ctx: &mut ViewContext, form: &Form) -> Result<(), ViewError> {
    let name = validate_project_name(&form.value("Name")).map_err(ViewError::Invalid)?;
    let due = parse_due(form.optional("Due"), ctx)?;
    let budget = parse_budget(form.optional("Budget (h)"))?;
    let original = if form.view == ViewId::ProjectEdit {
        Some(selected_project(ctx)?.name.clone())
    } else {
        None
    };
    let clash = ctx
        .db
        .projects
        .iter()
        .any(|p| p.matches(&name) && !original.as_deref().is_some_and(|o| p.matches(o)));
    if clash {
        return Err(ViewError::Invalid(format!("Project '{}' already exists", name)));
    }

    let message = match original {
        None => {
            let mut project = Project::new(&name);
            project.description = form.value("Description").trim().to_string();
            project.client = form.optional("Client");
            project.due = due;
            project.budget_hours = budget;
            project.tags = split_tags(&form.value("Tags"));
            ctx.commit(&format!("add project {}", name), |db| {
                db.projects.push(project);
                Ok(())
            })?;
            info!(project = %name, "project added");
            format!("Added project {}", name)
        }
        Some(old) => {
            let status = PROJECT_STATUSES.get(form.selected("Status")).copied().unwrap_or_default();
            let new_name = name.clone();
            ctx.commit(&format!("edit project {}", old), |db| {
                let p = db.project_mut(&old).ok_or_else(|| format!("Project '{}' not found", old))?;
                p.name = new_name.clone();
                p.description = form.value("Description").trim().to_string();
                p.status = status;
                p.client = form.optional("Client");
                p.assigned = form.optional("Assigned");
                p.id1 = form.optional("Ref 1");
                p.id2 = form.optional("Ref 2");
                p.due = due;
                p.budget_hours = budget;
                p.tags = split_tags(&form.value("Tags"));
                if old != new_name {
                    rename_references(db, &old, &new_name);
                }
                Ok(())
            })?;
            if ctx.query.project.as_deref().is_some_and(|f| f.eq_ignore_ascii_case(&old)) {
                ctx.query.project = Some(name.clone());
            }
            format!("Project {} updated", name)
        }
    };
    ctx.selected_project = Some(name);
    ctx.form = None;
    ctx.back()?;
    ctx.set_status(message);
    Ok(())
}

pub fn draw_archive(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let project = selected_project(ctx).map_err(|e| DrawError::Missing(e.to_string()))?;
    let open = project_tasks(&ctx.db, &project.name).iter().filter(|t| t.is_active()).count();
    let (title, question) = if project.is_archived() {
        ("Restore Project", format!("Restore {}?", project.name))
    } else {
        ("Archive Project", format!("Archive {}?", project.name))
    };
    let mut lines = vec![question];
    if open > 0 && !project.is_archived() {
        lines.push(format!("It still has {} open task(s).", open));
    }
    lines.push(String::new());
    lines.push("y: confirm   n/Esc: cancel".to_string());
    widgets::confirm_box(surface, area, title, &lines)?;
    Ok(())
}

pub fn handle_archive(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    match plain_char(&key).map(|c| c.to_ascii_lowercase()) {
        Some('y') => {
            let project = selected_project(ctx)?;
            let name = project.name.clone();
            let archive = !project.is_archived();
            let status = if archive { ProjectStatus::Archived } else { ProjectStatus::Active };
            ctx.commit(&format!("set project {} {}", name, status.as_str()), |db| {
                db.project_mut(&name)
                    .ok_or_else(|| format!("Project '{}' not found", name))?
                    .status = status;
                Ok(())
            })?;
            if archive && ctx.query.project.as_deref().is_some_and(|f| f.eq_ignore_ascii_case(&name)) {
                ctx.query.project = None;
                ctx.refresh_stats();
            }
            ctx.back()?;
            ctx.set_status(if archive {
                format!("Archived {}", name)
            } else {
                format!("Restored {}", name)
            });
            Ok(())
        }
        Some('n') => ctx.back(),
        _ => Ok(()),
    }
}

pub fn draw_stats(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let summaries = project_summaries(&ctx.db, ctx.today);
    let body = widgets::header(surface, area, "Project Stats", &format!("{} projects", summaries.len()))?;
    if summaries.is_empty() {
        widgets::muted_line(surface, body, "No projects")?;
        return Ok(());
    }
    if body.height == 0 {
        return Ok(());
    }
    let width = usize::from(body.width.saturating_sub(2));
    let head = format!(
        "{:<20} {:>6} {:>6} {:>6} {:>8} {:>8}  Progress",
        "Project", "Open", "Done", "Late", "Hours", "Budget"
    );
    surface.write_at_styled(body.x + 1, body.y, &fit(&head, width), token::MUTED, None)?;
    let rows = usize::from(body.height - 1);
    let cursor = ctx.cursor(ViewId::ProjectStats).min(summaries.len() - 1);
    let offset = scroll_offset(cursor, rows);
    for (i, s) in summaries.iter().enumerate().skip(offset).take(rows) {
        let y = body.y + 1 + (i - offset) as u16;
        let budget = ctx
            .db
            .project(&s.name)
            .and_then(|p| p.budget_hours)
            .map(|b| format!("{:.1}", b))
            .unwrap_or_else(|| "-".into());
        let progress = if s.stats.total == 0 {
            String::new()
        } else {
            let filled = s.stats.completed * 10 / s.stats.total;
            format!("{}{} {}%", "#".repeat(filled), ".".repeat(10 - filled), s.stats.completed * 100 / s.stats.total)
        };
        let hours = format_hours(s.minutes);
        let line = format!(
            "{:<20} {:>6} {:>6} {:>6} {:>8} {:>8}  {}",
            fit(&s.name, 20),
            s.stats.active,
            s.stats.completed,
            s.stats.overdue,
            if hours.is_empty() { "-".to_string() } else { hours },
            budget,
            progress
        );
        let line = fit(&line, width);
        if i == cursor {
            surface.write_at_styled(body.x + 1, y, &line, token::SELECTED_FG, Some(token::SELECTED_BG))?;
        } else {
            let tok = if s.stats.overdue > 0 { token::WARNING } else { token::TEXT };
            surface.write_at_styled(body.x + 1, y, &line, tok, None)?;
        }
    }
    Ok(())
}

pub fn handle_stats(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let summaries = project_summaries(&ctx.db, ctx.today);
    if move_by_key(ctx, ViewId::ProjectStats, &key, summaries.len()) {
        return Ok(());
    }
    match key.code {
        KeyCode::Esc => ctx.back(),
        KeyCode::Enter => {
            let cursor = ctx.cursor(ViewId::ProjectStats);
            match summaries.get(cursor) {
                Some(s) if ctx.db.project(&s.name).is_some() => {
                    ctx.selected_project = Some(s.name.clone());
                    ctx.open(ViewId::ProjectDetail)
                }
                Some(s) => Err(ViewError::Invalid(format!("'{}' has no project record", s.name))),
                None => Ok(()),
            }
        }
        _ => Ok(()),
    }
}
