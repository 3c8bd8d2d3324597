//! Time entries: list, log/edit form, delete confirmation, weekly report and
//! totals per project or time code.

use chrono::Duration;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use tracing::info;

use crate::dates::{format_hours, format_minutes, parse_due_on, parse_minutes, start_of_week};
use crate::db::Database;
use crate::time::{sort_entries_desc, totals_by_bucket, weekly_summary, TimeEntry};
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

const NO_PROJECT: &str = "(none)";
const MAX_MINUTES: u32 = 24 * 60;

fn sorted_entries(db: &Database) -> Vec<TimeEntry> {
    let mut entries = db.time_entries.clone();
    sort_entries_desc(&mut entries);
    entries
}

fn selected_entry(ctx: &ViewContext) -> Result<&TimeEntry, ViewError> {
    let id = ctx
        .selected_entry
        .ok_or_else(|| ViewError::Invalid("No time entry selected".to_string()))?;
    ctx.db
        .time_entry(id)
        .ok_or_else(|| ViewError::Invalid(format!("Time entry {} not found", id)))
}

fn open_selected(ctx: &mut ViewContext, view: ViewId) -> Result<(), ViewError> {
    let cursor = ctx.cursor(ViewId::TimeList);
    let Some(id) = sorted_entries(&ctx.db).get(cursor).map(|e| e.id) else {
        return Ok(());
    };
    ctx.selected_entry = Some(id);
    ctx.open(view)
}

pub fn draw_list(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let entries = sorted_entries(&ctx.db);
    let week_start = start_of_week(ctx.today);
    let today_total: u32 = entries.iter().filter(|e| e.date == ctx.today).map(|e| e.minutes).sum();
    let week_total: u32 = entries
        .iter()
        .filter(|e| e.date >= week_start && e.date <= ctx.today)
        .map(|e| e.minutes)
        .sum();
    let detail = format!("today {} | week {}", format_minutes(today_total), format_minutes(week_total));
    let body = widgets::header(surface, area, "Time Entries", &detail)?;
    if entries.is_empty() {
        widgets::muted_line(surface, body, "No time logged yet. Press a to log time.")?;
        return Ok(());
    }
    if body.height == 0 {
        return Ok(());
    }
    let width = usize::from(body.width.saturating_sub(2));
    let head = format!("{:<5} {:<10} {:>8}  {:<16} Description", "ID", "Date", "Time", "Project");
    surface.write_at_styled(body.x + 1, body.y, &fit(&head, width), token::MUTED, None)?;

    let rows = usize::from(body.height - 1);
    let cursor = ctx.cursor(ViewId::TimeList).min(entries.len() - 1);
    let offset = scroll_offset(cursor, rows);
    for (i, e) in entries.iter().enumerate().skip(offset).take(rows) {
        let y = body.y + 1 + (i - offset) as u16;
        let line = format!(
            "{:<5} {:<10} {:>8}  {:<16} {}",
            e.id,
            e.date.format("%Y-%m-%d"),
            format_minutes(e.minutes),
            fit(&e.bucket(), 16),
            e.description
        );
        let line = fit(&line, width);
        if i == cursor {
            surface.write_at_styled(body.x + 1, y, &line, token::SELECTED_FG, Some(token::SELECTED_BG))?;
        } else {
            surface.write_at_styled(body.x + 1, y, &line, token::TEXT, None)?;
        }
    }
    Ok(())
}

pub fn handle_list(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let len = ctx.db.time_entries.len();
    if move_by_key(ctx, ViewId::TimeList, &key, len) {
        return Ok(());
    }
    match key.code {
        KeyCode::Esc => return ctx.back(),
        KeyCode::Enter => return open_selected(ctx, ViewId::TimeEdit),
        KeyCode::Delete => return open_selected(ctx, ViewId::TimeDeleteConfirm),
        _ => {}
    }
    match plain_char(&key) {
        Some('a') => ctx.open(ViewId::TimeAdd),
        Some('e') => open_selected(ctx, ViewId::TimeEdit),
        Some('d') => open_selected(ctx, ViewId::TimeDeleteConfirm),
        Some('r') => ctx.open(ViewId::TimeReport),
        Some('p') => ctx.open(ViewId::TimeByProject),
        _ => Ok(()),
    }
}

fn project_options(db: &Database) -> Vec<String> {
    std::iter::once(NO_PROJECT.to_string())
        .chain(
            db.project_names()
                .into_iter()
                .filter(|n| !db.project(n).is_some_and(|p| p.is_archived())),
        )
        .collect()
}

pub fn enter_form(ctx: &mut ViewContext) -> Result<(), ViewError> {
    let view = ctx.current();
    let options = project_options(&ctx.db);
    let form = if view == ViewId::TimeEdit {
        let e = selected_entry(ctx)?;
        let project = e
            .project
            .as_deref()
            .and_then(|p| options.iter().position(|o| o.eq_ignore_ascii_case(p)))
            .unwrap_or(0);
        Form::new(view)
            .text("Date", &e.date.format("%Y-%m-%d").to_string())
            .text("Duration", &format_minutes(e.minutes).replace(' ', ""))
            .choice("Project", options, project)
            .text("Time code", e.time_code.as_deref().unwrap_or(""))
            .text("Description", &e.description)
            .target(e.id)
    } else {
        let focus = ctx
            .query
            .project
            .as_deref()
            .and_then(|p| options.iter().position(|o| o.eq_ignore_ascii_case(p)))
            .unwrap_or(0);
        Form::new(view)
            .text("Date", &ctx.today.format("%Y-%m-%d").to_string())
            .text("Duration", "")
            .choice("Project", options, focus)
            .text("Time code", "")
            .text("Description", "")
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
    let detail = form.target.map(|id| format!("entry #{}", id)).unwrap_or_default();
    let body = widgets::header(surface, area, view.title(), &detail)?;
    widgets::form(surface, body, form)?;
    let below = (form.fields.len() as u16) * 2;
    if body.height > below {
        let hint = "Duration: 90, 45m, 1h30m, 1.5h   Date: today, yesterday, mon, YYYY-MM-DD";
        widgets::muted_line(surface, Rect::new(body.x, body.y + below, body.width, 1), hint)?;
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

/// Validated entry built from the form. `id` is filled in by the caller.
fn entry_from_form(ctx: &ViewContext, form: &Form, id: u64) -> Result<TimeEntry, String> {
    let raw_date = form.value("Date");
    let date = match raw_date.trim() {
        "" => ctx.today,
        raw => parse_due_on(raw, ctx.today).ok_or_else(|| format!("Unrecognised date '{}'", raw))?,
    };
    let raw_minutes = form.value("Duration");
    let minutes = parse_minutes(&raw_minutes).ok_or_else(|| format!("Unrecognised duration '{}'", raw_minutes.trim()))?;
    if minutes == 0 || minutes > MAX_MINUTES {
        return Err("Duration must be between 1 minute and 24 hours".to_string());
    }
    let project = form.selected_label("Project").filter(|p| p != NO_PROJECT);
    Ok(TimeEntry {
        id,
        project,
        time_code: form.optional("Time code").map(|c| c.trim_start_matches('#').to_uppercase()),
        date,
        minutes,
        description: form.value("Description").trim().to_string(),
    })
}

fn submit(ctx: &mut ViewContext, form: &Form) -> Result<(), ViewError> {
    let (id, creating) = match form.target {
        Some(id) => (id, false),
        None => (ctx.db.next_time_id(), true),
    };
    let entry = entry_from_form(ctx, form, id).map_err(ViewError::Invalid)?;
    let summary = format!("{} on {}", format_minutes(entry.minutes), entry.bucket());
    if creating {
        ctx.commit(&format!("log time entry {}", id), |db| {
            db.time_entries.push(entry);
            Ok(())
        })?;
        info!(id, "time logged");
    } else {
        ctx.commit(&format!("edit time entry {}", id), |db| {
            let slot = db.time_entry_mut(id).ok_or_else(|| format!("Time entry {} not found", id))?;
            *slot = entry;
            Ok(())
        })?;
    }
    ctx.selected_entry = Some(id);
    ctx.form = None;
    ctx.back()?;
    ctx.set_status(if creating {
        format!("Logged {}", summary)
    } else {
        format!("Entry {} updated", id)
    });
    Ok(())
}

pub fn draw_delete(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let e = selected_entry(ctx).map_err(|e| DrawError::Missing(e.to_string()))?;
    let lines = vec![
        format!("Delete entry #{}?", e.id),
        format!("{}  {}  {}", e.date.format("%Y-%m-%d"), format_minutes(e.minutes), e.bucket()),
        String::new(),
        "y: delete   n/Esc: keep".to_string(),
    ];
    widgets::confirm_box(surface, area, "Delete Time Entry", &lines)?;
    Ok(())
}

pub fn handle_delete(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    match plain_char(&key).map(|c| c.to_ascii_lowercase()) {
        Some('y') => {
            let id = selected_entry(ctx)?.id;
            ctx.commit(&format!("delete time entry {}", id), |db| {
                db.remove_time_entry(id)
                    .map(|_| ())
                    .ok_or_else(|| format!("Time entry {} not found", id))
            })?;
            ctx.selected_entry = None;
            ctx.back()?;
            ctx.set_status(format!("Deleted entry {}", id));
            Ok(())
        }
        Some('n') => ctx.back(),
        _ => Ok(()),
    }
}

pub fn draw_report(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let week_start = start_of_week(ctx.today) + Duration::weeks(ctx.week_offset);
    let summary = weekly_summary(&ctx.db.time_entries, week_start);
    let detail = format!(
        "{} - {}",
        week_start.format("%b %d"),
        (week_start + Duration::days(6)).format("%b %d %Y")
    );
    let body = widgets::header(surface, area, "Weekly Report", &detail)?;
    if body.height == 0 {
        return Ok(());
    }
    let width = usize::from(body.width.saturating_sub(2));
    let mut head = format!("{:<16}", "Project");
    for d in 0..7 {
        head.push_str(&format!(" {:>5}", (week_start + Duration::days(d)).format("%a")));
    }
    head.push_str(&format!(" {:>6}", "Total"));
    surface.write_at_styled(body.x + 1, body.y, &fit(&head, width), token::MUTED, None)?;

    let mut y = body.y + 1;
    let bottom = body.y + body.height;
    if summary.rows.is_empty() && y < bottom {
        widgets::muted_line(surface, Rect::new(body.x, y, body.width, 1), "No time logged this week")?;
        return Ok(());
    }
    for (bucket, days) in &summary.rows {
        if y + 1 >= bottom {
            break;
        }
        let mut line = format!("{:<16}", fit(bucket, 16));
        for m in days {
            line.push_str(&format!(" {:>5}", format_hours(*m)));
        }
        line.push_str(&format!(" {:>6}", format_hours(days.iter().sum())));
        surface.write_at_styled(body.x + 1, y, &fit(&line, width), token::TEXT, None)?;
        y += 1;
    }
    if y < bottom {
        let mut line = format!("{:<16}", "Total");
        for m in summary.day_totals {
            line.push_str(&format!(" {:>5}", format_hours(m)));
        }
        line.push_str(&format!(" {:>6}", format_hours(summary.total())));
        surface.write_at_styled(body.x + 1, y, &fit(&line, width), token::ACCENT, None)?;
    }
    Ok(())
}

pub fn handle_report(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    match key.code {
        KeyCode::Esc => return ctx.back(),
        KeyCode::Left => ctx.week_offset -= 1,
        KeyCode::Right => ctx.week_offset += 1,
        _ => {
            if plain_char(&key) == Some('t') {
                ctx.week_offset = 0;
            }
        }
    }
    Ok(())
}

pub fn draw_by_project(ctx: &ViewContext, surface: &mut TerminalSurface, area: Rect) -> Result<(), DrawError> {
    let totals = totals_by_bucket(&ctx.db.time_entries);
    let grand: u32 = totals.iter().map(|(_, m)| m).sum();
    let body = widgets::header(surface, area, "Time by Project", &format!("total {}", format_minutes(grand)))?;
    if totals.is_empty() {
        widgets::muted_line(surface, body, "No time logged yet")?;
        return Ok(());
    }
    let rows = usize::from(body.height);
    let cursor = ctx.cursor(ViewId::TimeByProject).min(totals.len() - 1);
    let offset = scroll_offset(cursor, rows);
    let bar_w = usize::from(body.width).saturating_sub(40).min(30);
    let width = usize::from(body.width.saturating_sub(2));
    for (i, (bucket, minutes)) in totals.iter().enumerate().skip(offset).take(rows) {
        let y = body.y + (i - offset) as u16;
        let share = if grand == 0 { 0 } else { *minutes as usize * 100 / grand as usize };
        let bar = "#".repeat(share * bar_w / 100);
        let line = format!("{:<18} {:>9} {:>4}%  {}", fit(bucket, 18), format_minutes(*minutes), share, bar);
        let line = fit(&line, width);
        if i == cursor {
            surface.write_at_styled(body.x + 1, y, &line, token::SELECTED_FG, Some(token::SELECTED_BG))?;
        } else {
            surface.write_at_styled(body.x + 1, y, &line, token::TEXT, None)?;
        }
    }
    Ok(())
}

pub fn handle_by_project(ctx: &mut ViewContext, key: KeyEvent) -> Result<(), ViewError> {
    let len = totals_by_bucket(&ctx.db.time_entries).len();
    if move_by_key(ctx, ViewId::TimeByProject, &key, len) {
        return Ok(());
    }
    if key.code == KeyCode::Esc {
        return ctx.back();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DataPipeline;
    use crate::tui::testing::{ch, key, key_event, sample_database, sample_today, text, MemoryStore};

    fn context() -> (ViewContext, MemoryStore) {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = ViewContext::new(DataPipeline::new(Box::new(store.clone())), ViewId::TimeList, sample_today());
        ctx.load().unwrap();
        (ctx, store)
    }

    fn type_text(ctx: &mut ViewContext, s: &str) {
        for event in text(s) {
            handle_form(ctx, key_event(event)).unwrap();
        }
    }

    #[test]
    fn test_log_time_defaults_to_today() {
        let (mut ctx, store) = context();
        handle_list(&mut ctx, key_event(ch('a'))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        type_text(&mut ctx, "1h30m");
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        type_text(&mut ctx, "#admin");
        handle_form(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();

        let entry = store.data().time_entry(2).cloned().unwrap();
        assert_eq!(entry.minutes, 90);
        assert_eq!(entry.date, sample_today());
        assert_eq!(entry.project, None);
        assert_eq!(entry.time_code.as_deref(), Some("ADMIN"));
        assert_eq!(ctx.status.as_deref(), Some("Logged 1h 30m on #ADMIN"));
        assert_eq!(ctx.current(), ViewId::TimeList);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let (mut ctx, store) = context();
        ctx.open(ViewId::TimeAdd).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        type_text(&mut ctx, "0");
        let result = handle_form(&mut ctx, key_event(key(KeyCode::Enter)));
        assert!(matches!(result, Err(ViewError::Invalid(_))));
        assert_eq!(store.data().time_entries.len(), 1);
    }

    #[test]
    fn test_edit_and_delete_entry() {
        let (mut ctx, store) = context();
        handle_list(&mut ctx, key_event(ch('e'))).unwrap();
        assert_eq!(ctx.form.as_ref().unwrap().value("Duration"), "1h30m");
        handle_form(&mut ctx, key_event(key(KeyCode::Tab))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Backspace))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Backspace))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Backspace))).unwrap();
        handle_form(&mut ctx, key_event(key(KeyCode::Enter))).unwrap();
        assert_eq!(store.data().time_entry(1).unwrap().minutes, 60);

        handle_list(&mut ctx, key_event(ch('d'))).unwrap();
        handle_delete(&mut ctx, key_event(ch('y'))).unwrap();
        assert!(store.data().time_entries.is_empty());
    }

    #[test]
    fn test_report_week_navigation() {
        let (mut ctx, _) = context();
        ctx.open(ViewId::TimeReport).unwrap();
        handle_report(&mut ctx, key_event(key(KeyCode::Left))).unwrap();
        handle_report(&mut ctx, key_event(key(KeyCode::Left))).unwrap();
        assert_eq!(ctx.week_offset, -2);
        handle_report(&mut ctx, key_event(ch('t'))).unwrap();
        assert_eq!(ctx.week_offset, 0);
        handle_report(&mut ctx, key_event(key(KeyCode::Esc))).unwrap();
        assert_eq!(ctx.current(), ViewId::TimeList);
    }
}
