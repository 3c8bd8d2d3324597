//! Mutable state shared by every view: navigation, the data snapshot, list
//! cursors, the active form and the status line.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::db::Database;
use crate::pipeline::{compute_stats, select_tasks, DataPipeline, Stats, TaskQuery};
use crate::tui::action::Action;
use crate::tui::enums::ViewId;
use crate::tui::form::Form;
use crate::tui::navigation::NavigationState;
use crate::tui::views::{self, tasks, ViewError};

pub struct ViewContext {
    pub nav: NavigationState,
    pipeline: DataPipeline,
    /// Snapshot loaded on view entry and mutated in place.
    pub db: Database,
    pub today: NaiveDate,
    /// Focus project, search text and sort order.
    pub query: TaskQuery,
    /// Stats of the tasks under the current focus.
    pub stats: Stats,
    cursors: HashMap<ViewId, usize>,
    pub selected_task: Option<u64>,
    pub selected_project: Option<String>,
    pub selected_entry: Option<u64>,
    pub form: Option<Form>,
    pub status: Option<String>,
    pub running: bool,
    pub theme: String,
    /// Set when the theme changed and the style cache must be rebuilt.
    pub theme_changed: bool,
    pub show_completed: bool,
    /// Weeks relative to the current one in the weekly report.
    pub week_offset: i64,
    pub kanban_column: usize,
}

impl ViewContext {
    pub fn new(pipeline: DataPipeline, start: ViewId, today: NaiveDate) -> Self {
        ViewContext {
            nav: NavigationState::new(start),
            pipeline,
            db: Database::default(),
            today,
            query: TaskQuery::default(),
            stats: Stats::default(),
            cursors: HashMap::new(),
            selected_task: None,
            selected_project: None,
            selected_entry: None,
            form: None,
            status: None,
            running: true,
            theme: "default".to_string(),
            theme_changed: false,
            show_completed: false,
            week_offset: 0,
            kanban_column: 0,
        }
    }

    pub fn current(&self) -> ViewId {
        self.nav.current()
    }

    /// Reload the snapshot from the store.
    pub fn load(&mut self) -> Result<(), ViewError> {
        self.db = self.pipeline.load_database()?;
        self.refresh_stats();
        Ok(())
    }

    pub fn refresh_stats(&mut self) {
        let focus = TaskQuery {
            search: None,
            ..self.query.clone()
        };
        self.stats = compute_stats(&select_tasks(&self.db.tasks, &focus), self.today);
    }

    pub fn pipeline(&self) -> &DataPipeline {
        &self.pipeline
    }

    /// Navigate to `view`, reload and run its enter hook. Rejected input
    /// leaves navigation where it was.
    pub fn open(&mut self, view: ViewId) -> Result<(), ViewError> {
        let before = self.nav.clone();
        self.nav.navigate_to(view);
        let result = self.load().and_then(|_| self.run_enter(view));
        if let Err(ViewError::Invalid(_)) = &result {
            self.nav = before;
        }
        result
    }

    fn run_enter(&mut self, view: ViewId) -> Result<(), ViewError> {
        match views::entry(view).enter {
            Some(enter) => enter(self),
            None => Ok(()),
        }
    }

    /// Single-level back navigation, falling back to the view's parent.
    pub fn back(&mut self) -> Result<(), ViewError> {
        let current = self.current();
        self.nav.go_back(current.parent());
        self.load()?;
        let target = self.current();
        let form_matches = self.form.as_ref().is_some_and(|f| f.view == target);
        if !form_matches {
            self.run_enter(target)?;
        }
        Ok(())
    }

    /// Leave the current view after a store failure. Never fails; a reload
    /// error is reported on the status line.
    pub fn fall_back(&mut self) {
        let current = self.current();
        self.nav.go_back(current.parent());
        self.form = None;
        if let Err(e) = self.load() {
            self.status = Some(format!("Data unavailable: {}", e));
        }
    }

    pub fn cursor(&self, view: ViewId) -> usize {
        self.cursors.get(&view).copied().unwrap_or(0)
    }

    pub fn set_cursor(&mut self, view: ViewId, value: usize) {
        self.cursors.insert(view, value);
    }

    /// Move the cursor of `view` by `delta`, clamped to `len` rows.
    pub fn move_cursor(&mut self, view: ViewId, delta: isize, len: usize) {
        let max = len.saturating_sub(1) as isize;
        let next = (self.cursor(view) as isize + delta).clamp(0, max.max(0));
        self.set_cursor(view, next as usize);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Mutate the snapshot and persist it. If the mutation rejects the input
    /// or the save fails, the snapshot is restored to its prior state.
    pub fn commit<F>(&mut self, action: &str, mutate: F) -> Result<(), ViewError>
    where
        F: FnOnce(&mut Database) -> Result<(), String>,
    {
        let snapshot = self.db.clone();
        if let Err(msg) = mutate(&mut self.db) {
            self.db = snapshot;
            return Err(ViewError::Invalid(msg));
        }
        if let Err(e) = self.pipeline.save(&self.db, action) {
            error!(action, error = %e, "save failed, rolling back");
            self.db = snapshot;
            return Err(ViewError::Store(e));
        }
        self.refresh_stats();
        Ok(())
    }

    /// Task under the cursor of the current view.
    pub fn selected_task_id(&self) -> Option<u64> {
        tasks::selected_task_id(self)
    }

    fn require_task(&mut self) -> Result<u64, ViewError> {
        let id = self
            .selected_task_id()
            .ok_or_else(|| ViewError::Invalid("No task selected".to_string()))?;
        self.selected_task = Some(id);
        Ok(id)
    }

    /// Carry out a menu selection.
    pub fn apply(&mut self, action: Action) -> Result<(), ViewError> {
        debug!(%action, "dispatch");
        match action {
            Action::Show(view) => self.open(view),
            Action::TaskAdd => self.open(ViewId::TaskAdd),
            Action::TaskQuickAdd => self.open(ViewId::QuickAdd),
            Action::TaskEdit => {
                self.require_task()?;
                self.open(ViewId::TaskEdit)
            }
            Action::TaskDelete => {
                self.require_task()?;
                self.open(ViewId::TaskDeleteConfirm)
            }
            Action::TaskComplete => {
                let id = self.require_task()?;
                tasks::toggle_complete(self, id)
            }
            Action::TaskSearch => self.open(ViewId::SearchPrompt),
            Action::ProjectAdd => self.open(ViewId::ProjectAdd),
            Action::TimeAdd => self.open(ViewId::TimeAdd),
            Action::FocusClear => {
                self.query.project = None;
                self.refresh_stats();
                self.set_status("Focus cleared");
                Ok(())
            }
            Action::Backup => {
                let path = self.pipeline.backup()?;
                self.set_status(format!("Backup written to {}", path.display()));
                Ok(())
            }
            Action::Refresh => {
                self.load()?;
                self.set_status("Reloaded");
                Ok(())
            }
            Action::Exit => {
                info!("exit requested from menu");
                self.running = false;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;
    use crate::tui::testing::{sample_database, sample_today, MemoryStore};

    fn context(store: &MemoryStore) -> ViewContext {
        let mut ctx = ViewContext::new(
            DataPipeline::new(Box::new(store.clone())),
            ViewId::TaskList,
            sample_today(),
        );
        ctx.load().unwrap();
        ctx
    }

    #[test]
    fn test_commit_persists_with_action_description() {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = context(&store);
        ctx.commit("complete task 1", |db| {
            db.task_mut(1).ok_or("missing")?.set_completed(true);
            Ok(())
        })
        .unwrap();
        assert_eq!(store.data().task(1).unwrap().status, Status::Completed);
        assert_eq!(store.saved_actions(), vec!["complete task 1".to_string()]);
    }

    #[test]
    fn test_failed_save_rolls_back_memory() {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = context(&store);
        store.fail_saves(true);
        let result = ctx.commit("rename", |db| {
            db.task_mut(1).ok_or("missing")?.text = "changed".into();
            Ok(())
        });
        assert!(matches!(result, Err(ViewError::Store(_))));
        assert_eq!(ctx.db.task(1).unwrap().text, "Write quarterly report");
        assert_eq!(ctx.db, store.data());
    }

    #[test]
    fn test_rejected_mutation_rolls_back_and_is_invalid() {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = context(&store);
        let result = ctx.commit("half done", |db| {
            db.tasks.clear();
            Err("nope".to_string())
        });
        assert!(matches!(result, Err(ViewError::Invalid(_))));
        assert_eq!(ctx.db.tasks.len(), 5);
        assert!(store.saved_actions().is_empty());
    }

    #[test]
    fn test_open_with_invalid_enter_keeps_navigation() {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = context(&store);
        ctx.selected_task = Some(99);
        let result = ctx.open(ViewId::TaskEdit);
        assert!(matches!(result, Err(ViewError::Invalid(_))));
        assert_eq!(ctx.current(), ViewId::TaskList);
    }

    #[test]
    fn test_menu_actions() {
        let store = MemoryStore::with_data(sample_database());
        let mut ctx = context(&store);
        ctx.query.project = Some("Work".into());
        ctx.apply(Action::FocusClear).unwrap();
        assert_eq!(ctx.query.project, None);

        ctx.apply(Action::Show(ViewId::Agenda)).unwrap();
        assert_eq!(ctx.current(), ViewId::Agenda);

        ctx.apply(Action::Backup).unwrap();
        assert!(ctx.status.as_deref().unwrap().contains("memory-backup.json"));

        ctx.apply(Action::Exit).unwrap();
        assert!(!ctx.running);
    }

    #[test]
    fn test_cursor_moves_are_clamped() {
        let store = MemoryStore::default();
        let mut ctx = context(&store);
        ctx.move_cursor(ViewId::TaskList, -3, 4);
        assert_eq!(ctx.cursor(ViewId::TaskList), 0);
        ctx.move_cursor(ViewId::TaskList, 10, 4);
        assert_eq!(ctx.cursor(ViewId::TaskList), 3);
        ctx.move_cursor(ViewId::TaskList, 1, 0);
        assert_eq!(ctx.cursor(ViewId::TaskList), 0);
    }
}
