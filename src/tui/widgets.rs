//! Drawing helpers shared by the views.

use std::io;

use chrono::NaiveDate;
use ratatui::layout::Rect;

use crate::dates::format_due_relative;
use crate::fields::{format_priority, Priority};
use crate::task::Task;
use crate::tui::colors::token;
use crate::tui::form::{FieldKind, Form};
use crate::tui::surface::TerminalSurface;
use crate::tui::utils::{centered_fixed, display_width, fit, scroll_offset};

/// Title on the first row of `area`, `detail` right-aligned, rule below.
/// Returns the area left for content.
pub fn header(surface: &mut TerminalSurface, area: Rect, title: &str, detail: &str) -> io::Result<Rect> {
    if area.height == 0 {
        return Ok(area);
    }
    surface.write_at_styled(area.x + 1, area.y, title, token::TITLE, None)?;
    let detail_len = display_width(detail) as u16;
    if !detail.is_empty() && area.width > detail_len + display_width(title) as u16 + 3 {
        surface.write_at_styled(area.x + area.width - detail_len - 1, area.y, detail, token::MUTED, None)?;
    }
    if area.height > 1 {
        surface.draw_horizontal_line(area.x, area.y + 1, area.width)?;
    }
    let used = area.height.min(2);
    Ok(Rect::new(area.x, area.y + used, area.width, area.height - used))
}

pub fn muted_line(surface: &mut TerminalSurface, area: Rect, text: &str) -> io::Result<()> {
    if area.height == 0 {
        return Ok(());
    }
    surface.write_at_styled(area.x + 1, area.y, text, token::MUTED, None)
}

fn priority_token(p: Option<Priority>) -> &'static str {
    match p {
        Some(Priority::High) => token::PRIORITY_HIGH,
        Some(Priority::Medium) => token::PRIORITY_MEDIUM,
        Some(Priority::Low) => token::PRIORITY_LOW,
        _ => token::MUTED,
    }
}

fn due_token(task: &Task, today: NaiveDate) -> &'static str {
    match task.due_date() {
        _ if !task.is_active() => token::MUTED,
        Some(d) if d < today => token::OVERDUE,
        Some(d) if d == today => token::DUE_TODAY,
        _ => token::TEXT,
    }
}

const ID_W: usize = 5;
const PRI_W: usize = 5;
const STATUS_W: usize = 12;
const DUE_W: usize = 10;
const PROJECT_W: usize = 12;

fn due_text(task: &Task, today: NaiveDate) -> String {
    match (task.due_date(), task.due.as_deref()) {
        (Some(d), _) => format_due_relative(Some(d), today),
        (None, Some(raw)) => raw.to_string(),
        (None, None) => "-".to_string(),
    }
}

/// Scrolling task table with a header row. `cursor` highlights a row.
pub fn task_table(
    surface: &mut TerminalSurface,
    area: Rect,
    tasks: &[&Task],
    cursor: Option<usize>,
    today: NaiveDate,
) -> io::Result<()> {
    if area.height == 0 {
        return Ok(());
    }
    let width = usize::from(area.width.saturating_sub(1));
    let head = format!(
        "{}{}{}{}{}{}",
        fit("ID", ID_W),
        fit("Pri", PRI_W),
        fit("Status", STATUS_W),
        fit("Due", DUE_W),
        fit("Project", PROJECT_W),
        "Task"
    );
    surface.write_at_styled(area.x + 1, area.y, &fit(&head, width), token::MUTED, None)?;
    if tasks.is_empty() {
        if area.height > 1 {
            muted_line(surface, Rect::new(area.x, area.y + 1, area.width, 1), "No tasks")?;
        }
        return Ok(());
    }

    let rows = usize::from(area.height - 1);
    let offset = scroll_offset(cursor.unwrap_or(0), rows);
    for (i, task) in tasks.iter().enumerate().skip(offset).take(rows) {
        let y = area.y + 1 + (i - offset) as u16;
        let text_w = width.saturating_sub(ID_W + PRI_W + STATUS_W + DUE_W + PROJECT_W);
        let cells = [
            fit(&task.id.to_string(), ID_W),
            fit(format_priority(task.priority), PRI_W),
            fit(task.status.label(), STATUS_W),
            fit(&due_text(task, today), DUE_W),
            fit(task.project.as_deref().unwrap_or("-"), PROJECT_W),
            fit(&task.text, text_w),
        ];
        if cursor == Some(i) {
            surface.write_at_styled(area.x + 1, y, &cells.concat(), token::SELECTED_FG, Some(token::SELECTED_BG))?;
            continue;
        }
        let base = if task.is_active() { token::TEXT } else { token::MUTED };
        let tokens = [
            base,
            priority_token(task.priority),
            base,
            due_token(task, today),
            token::PROJECT,
            base,
        ];
        let mut x = area.x + 1;
        for (cell, tok) in cells.iter().zip(tokens) {
            surface.write_at_styled(x, y, cell, tok, None)?;
            x = x.saturating_add(display_width(cell) as u16);
        }
    }
    Ok(())
}

/// Vertical list of choices. `marked` gets a bullet (the current value).
pub fn select_list(
    surface: &mut TerminalSurface,
    area: Rect,
    items: &[String],
    cursor: usize,
    marked: Option<usize>,
) -> io::Result<()> {
    if items.is_empty() {
        return muted_line(surface, area, "Nothing to choose from");
    }
    let rows = usize::from(area.height);
    let offset = scroll_offset(cursor, rows);
    let width = usize::from(area.width.saturating_sub(2));
    for (i, item) in items.iter().enumerate().skip(offset).take(rows) {
        let y = area.y + (i - offset) as u16;
        let bullet = if marked == Some(i) { "● " } else { "  " };
        let line = fit(&format!("{}{}", bullet, item), width);
        if i == cursor {
            surface.write_at_styled(area.x + 1, y, &line, token::SELECTED_FG, Some(token::SELECTED_BG))?;
        } else {
            surface.write_at_styled(area.x + 1, y, &line, token::TEXT, None)?;
        }
    }
    Ok(())
}

/// Label/value pairs, one per row. Returns rows used.
pub fn fields(surface: &mut TerminalSurface, area: Rect, pairs: &[(&str, String)]) -> io::Result<u16> {
    let label_w = pairs.iter().map(|(l, _)| display_width(l)).max().unwrap_or(0) + 2;
    let mut used = 0;
    for (label, value) in pairs.iter().take(usize::from(area.height)) {
        let y = area.y + used;
        surface.write_at_styled(area.x + 1, y, &fit(&format!("{}:", label), label_w), token::MUTED, None)?;
        surface.write_at_styled(area.x + 1 + label_w as u16, y, value, token::TEXT, None)?;
        used += 1;
    }
    Ok(used)
}

/// Centred box with a title and message lines, for confirmations.
pub fn confirm_box(surface: &mut TerminalSurface, area: Rect, title: &str, lines: &[String]) -> io::Result<()> {
    let inner_w = lines
        .iter()
        .map(|l| display_width(l))
        .chain(std::iter::once(display_width(title) + 4))
        .max()
        .unwrap_or(0) as u16
        + 4;
    let rect = centered_fixed(inner_w + 2, lines.len() as u16 + 4, area);
    surface.draw_filled_box(rect.x, rect.y, rect.width, rect.height, token::MODAL_BG)?;
    surface.write_at_styled(rect.x + 2, rect.y, &format!(" {} ", title), token::TITLE, Some(token::MODAL_BG))?;
    for (i, line) in lines.iter().enumerate() {
        surface.write_at_styled(rect.x + 2, rect.y + 2 + i as u16, line, token::TEXT, Some(token::MODAL_BG))?;
    }
    Ok(())
}

/// Blocking error box drawn in direct mode, outside any frame.
pub fn modal(surface: &mut TerminalSurface, title: &str, message: &str) -> io::Result<()> {
    let screen = Rect::new(0, 0, surface.width(), surface.height());
    let width = surface.width().saturating_sub(4).min(70);
    let text_w = usize::from(width.saturating_sub(4)).max(1);
    let mut lines: Vec<String> = message
        .chars()
        .collect::<Vec<_>>()
        .chunks(text_w)
        .map(|c| c.iter().collect())
        .collect();
    lines.push(String::new());
    lines.push("Press any key to continue".to_string());
    let rect = centered_fixed(width, lines.len() as u16 + 4, screen);
    surface.draw_filled_box(rect.x, rect.y, rect.width, rect.height, token::MODAL_BG)?;
    surface.write_at_styled(rect.x + 2, rect.y, &format!(" {} ", title), token::ERROR, Some(token::MODAL_BG))?;
    for (i, line) in lines.iter().enumerate() {
        surface.write_at_styled(rect.x + 2, rect.y + 2 + i as u16, line, token::TEXT, Some(token::MODAL_BG))?;
    }
    Ok(())
}

/// Render a form: one row per field, the focused one highlighted with a
/// block cursor.
pub fn form(surface: &mut TerminalSurface, area: Rect, form: &Form) -> io::Result<()> {
    let label_w = form.fields.iter().map(|f| display_width(&f.label)).max().unwrap_or(0) + 2;
    let value_w = usize::from(area.width).saturating_sub(label_w + 4).max(1);
    for (i, field) in form.fields.iter().enumerate().take(usize::from(area.height / 2)) {
        let y = area.y + (i as u16) * 2;
        let focused = i == form.focus;
        let label_tok = if focused { token::ACCENT } else { token::MUTED };
        surface.write_at_styled(area.x + 1, y, &fit(&format!("{}:", field.label), label_w), label_tok, None)?;
        let x = area.x + 1 + label_w as u16;
        match &field.kind {
            FieldKind::Text(input) => {
                let (visible, col) = input.window(value_w.saturating_sub(1));
                let shown = fit(&visible, value_w);
                if focused {
                    surface.write_at_styled(x, y, &shown, token::TEXT, Some(token::SELECTED_BG))?;
                    let under: String = shown.chars().nth(col).map(String::from).unwrap_or_else(|| " ".into());
                    surface.write_at_styled(x + col as u16, y, &under, token::SELECTED_BG, Some(token::TEXT))?;
                } else {
                    surface.write_at_styled(x, y, &shown, token::TEXT, None)?;
                }
            }
            FieldKind::Choice { options, selected } => {
                let value = options.get(*selected).map(String::as_str).unwrap_or("-");
                let shown = format!("◀ {} ▶", value);
                if focused {
                    surface.write_at_styled(x, y, &shown, token::SELECTED_FG, Some(token::SELECTED_BG))?;
                } else {
                    surface.write_at_styled(x, y, &shown, token::TEXT, None)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::colors::Theme;
    use crate::tui::style_cache::StyleCache;
    use crate::tui::testing::{sample_database, sample_today, screen_text, SharedBuffer};

    fn surface(w: u16, h: u16) -> (TerminalSurface, SharedBuffer) {
        let buf = SharedBuffer::default();
        let mut s = TerminalSurface::new(Box::new(buf.clone()), StyleCache::new(Theme::default(), 64));
        s.apply_dimensions(Ok((w, h)));
        (s, buf)
    }

    #[test]
    fn test_task_table_rows_and_relative_due() {
        let (mut s, buf) = surface(80, 10);
        let db = sample_database();
        let tasks: Vec<&Task> = db.tasks.iter().take(3).collect();
        task_table(&mut s, Rect::new(0, 0, 80, 10), &tasks, Some(1), sample_today()).unwrap();
        let rows = screen_text(&buf.contents(), 80, 10);
        assert!(rows[0].contains("Status"));
        assert!(rows[1].contains("Write quarterly report"));
        assert!(rows[1].contains("2d late"));
        assert!(rows[2].contains("today"));
        assert!(rows[3].contains("tomorrow"));
    }

    #[test]
    fn test_table_scrolls_to_cursor() {
        let (mut s, buf) = surface(80, 3);
        let db = sample_database();
        let tasks: Vec<&Task> = db.tasks.iter().collect();
        task_table(&mut s, Rect::new(0, 0, 80, 3), &tasks, Some(4), sample_today()).unwrap();
        let rows = screen_text(&buf.contents(), 80, 3);
        assert!(rows[1].contains("Renew passport"));
        assert!(rows[2].contains("Deploy release"));
    }

    #[test]
    fn test_modal_wraps_long_messages() {
        let (mut s, buf) = surface(40, 12);
        modal(&mut s, "Save failed", &"x".repeat(60)).unwrap();
        let rows = screen_text(&buf.contents(), 40, 12);
        assert!(rows.iter().any(|r| r.contains("Save failed")));
        assert!(rows.iter().any(|r| r.contains("Press any key")));
    }
}
