//! View registry: one draw routine and one key handler per [`ViewId`].
//!
//! `draw` only reads the context and writes to the surface. `handle` consumes
//! one key and may change navigation, mutate the in-memory data through
//! [`ViewContext::commit`], or set a status message. The optional `enter`
//! hook prepares per-view state (form fields, list cursor) whenever the view
//! is entered.

use std::io;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use thiserror::Error;

use crate::error::StoreError;
use crate::tui::context::ViewContext;
use crate::tui::enums::ViewId;
use crate::tui::surface::TerminalSurface;

pub mod projects;
pub mod task_forms;
pub mod tasks;
pub mod time;
pub mod tools;

/// Failure while composing a frame. Shown inline, never fatal.
#[derive(Error, Debug)]
pub enum DrawError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0}")]
    Missing(String),
}

/// Failure while handling a key.
#[derive(Error, Debug)]
pub enum ViewError {
    /// Rejected input. The view stays put and shows the message.
    #[error("{0}")]
    Invalid(String),

    /// The store failed. The view shows a modal and falls back.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type DrawFn = fn(&ViewContext, &mut TerminalSurface, Rect) -> Result<(), DrawError>;
pub type HandleFn = fn(&mut ViewContext, KeyEvent) -> Result<(), ViewError>;
pub type EnterFn = fn(&mut ViewContext) -> Result<(), ViewError>;

#[derive(Clone, Copy)]
pub struct ViewEntry {
    pub draw: DrawFn,
    pub handle: HandleFn,
    pub enter: Option<EnterFn>,
}

impl ViewEntry {
    const fn new(draw: DrawFn, handle: HandleFn) -> Self {
        ViewEntry {
            draw,
            handle,
            enter: None,
        }
    }

    const fn with_enter(draw: DrawFn, handle: HandleFn, enter: EnterFn) -> Self {
        ViewEntry {
            draw,
            handle,
            enter: Some(enter),
        }
    }
}

pub fn entry(view: ViewId) -> ViewEntry {
    use ViewId::*;
    match view {
        v if v.is_task_list() => ViewEntry::new(tasks::draw_list, tasks::handle_list),
        Agenda => ViewEntry::new(tasks::draw_agenda, tasks::handle_agenda),
        Kanban => ViewEntry::new(tasks::draw_kanban, tasks::handle_kanban),
        TaskDetail => ViewEntry::new(tasks::draw_detail, tasks::handle_detail),

        TaskAdd | TaskEdit | QuickAdd | TaskSetDue | SubtaskAdd | NoteAdd | DependencyAdd | SearchPrompt => {
            ViewEntry::with_enter(task_forms::draw_form, task_forms::handle_form, task_forms::enter_form)
        }
        TaskSetPriority | TaskMoveProject => {
            ViewEntry::with_enter(task_forms::draw_choice, task_forms::handle_choice, task_forms::enter_choice)
        }
        TaskDeleteConfirm => ViewEntry::new(task_forms::draw_delete, task_forms::handle_delete),

        ProjectList => ViewEntry::new(projects::draw_list, projects::handle_list),
        ProjectDetail => ViewEntry::new(projects::draw_detail, projects::handle_detail),
        ProjectAdd | ProjectEdit => {
            ViewEntry::with_enter(projects::draw_form, projects::handle_form, projects::enter_form)
        }
        ProjectArchiveConfirm => ViewEntry::new(projects::draw_archive, projects::handle_archive),
        ProjectStats => ViewEntry::new(projects::draw_stats, projects::handle_stats),

        TimeList => ViewEntry::new(time::draw_list, time::handle_list),
        TimeAdd | TimeEdit => ViewEntry::with_enter(time::draw_form, time::handle_form, time::enter_form),
        TimeDeleteConfirm => ViewEntry::new(time::draw_delete, time::handle_delete),
        TimeReport => ViewEntry::new(time::draw_report, time::handle_report),
        TimeByProject => ViewEntry::new(time::draw_by_project, time::handle_by_project),

        Dashboard => ViewEntry::new(tools::draw_dashboard, tools::handle_dashboard),
        FocusSelect | SortSelect | ThemeSelect => {
            ViewEntry::with_enter(tools::draw_select, tools::handle_select, tools::enter_select)
        }
        FocusStatus => ViewEntry::new(tools::draw_focus_status, tools::handle_focus_status),
        Stats => ViewEntry::new(tools::draw_stats, tools::handle_info),
        Help => ViewEntry::new(tools::draw_help, tools::handle_info),
        About => ViewEntry::new(tools::draw_about, tools::handle_info),
        BackupConfirm | ExitConfirm => ViewEntry::new(tools::draw_confirm, tools::handle_confirm),

        // Covered by the task-list guard above.
        _ => ViewEntry::new(tasks::draw_list, tasks::handle_list),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DataPipeline;
    use crate::tui::colors::Theme;
    use crate::tui::style_cache::StyleCache;
    use crate::tui::testing::{sample_database, sample_today, MemoryStore, SharedBuffer};

    /// Every view draws something without error on a realistic data set,
    /// including on a surface too small for most of its content.
    #[test]
    fn test_every_view_draws() {
        for (w, h) in [(100, 30), (20, 6)] {
            for view in ViewId::ALL {
                let store = MemoryStore::with_data(sample_database());
                let mut ctx = ViewContext::new(DataPipeline::new(Box::new(store)), ViewId::Dashboard, sample_today());
                ctx.load().unwrap();
                ctx.selected_task = Some(1);
                ctx.selected_project = Some("Work".into());
                ctx.selected_entry = Some(1);
                ctx.open(view).unwrap();

                let buf = SharedBuffer::default();
                let mut surface =
                    TerminalSurface::new(Box::new(buf.clone()), StyleCache::new(Theme::default(), 64));
                surface.apply_dimensions(Ok((w, h)));
                let body = Rect::new(0, 1, w, h - 3);
                surface.begin_frame();
                let result = (entry(view).draw)(&ctx, &mut surface, body);
                assert!(result.is_ok(), "{:?}: {:?}", view, result.err());
                surface.end_frame().unwrap();
            }
        }
    }
}
