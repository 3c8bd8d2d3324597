//! Task data structure and related functionality.
//!
//! A task is a single work item with optional project, priority and due date,
//! plus inline subtasks, notes and dependencies on other tasks.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A work item.
///
/// `due` keeps the text the user entered; it is parsed on demand so a value
/// that no longer parses is preserved rather than dropped on the next save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub created: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed: Option<NaiveDateTime>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub depends: Vec<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A checklist entry inside a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// A timestamped free-form note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub created: NaiveDateTime,
    pub text: String,
}

impl Task {
    /// Create a pending task stamped with the current local time.
    pub fn new(id: u64, text: &str) -> Self {
        Task {
            id,
            text: text.trim().to_string(),
            status: Status::Pending,
            priority: None,
            project: None,
            due: None,
            created: Some(Local::now().naive_local()),
            completed: None,
            subtasks: Vec::new(),
            notes: Vec::new(),
            depends: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// The due date, when one is set and parses as `YYYY-MM-DD`.
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_active() && self.due_date().is_some_and(|d| d < today)
    }

    /// Mark completed (or reopen), keeping the completion stamp in sync.
    pub fn set_completed(&mut self, done: bool) {
        if done {
            self.status = Status::Completed;
            self.completed = Some(Local::now().naive_local());
        } else {
            self.status = Status::Pending;
            self.completed = None;
        }
    }

    pub fn set_status(&mut self, status: Status) {
        if status == Status::Completed {
            self.set_completed(true);
        } else {
            self.status = status;
            self.completed = None;
        }
    }

    /// Completed/total subtask counts.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.done).count();
        (done, self.subtasks.len())
    }

    pub fn add_note(&mut self, text: &str) {
        self.notes.push(Note {
            created: Local::now().naive_local(),
            text: text.trim().to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_date_ignores_unparsable_text() {
        let mut t = Task::new(1, "write report");
        t.due = Some("2025-01-10".into());
        assert_eq!(t.due_date(), NaiveDate::from_ymd_opt(2025, 1, 10));
        t.due = Some("someday".into());
        assert_eq!(t.due_date(), None);
    }

    #[test]
    fn test_overdue_only_for_active_tasks() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut t = Task::new(1, "pay invoice");
        t.due = Some("2025-01-09".into());
        assert!(t.is_overdue(today));
        t.set_completed(true);
        assert!(!t.is_overdue(today));
        assert!(t.completed.is_some());
        t.set_completed(false);
        assert_eq!(t.status, Status::Pending);
        assert!(t.completed.is_none());
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let t: Task = serde_json::from_str(r#"{"id": 7, "text": "bare"}"#).unwrap();
        assert_eq!(t.status, Status::Pending);
        assert!(t.priority.is_none());
        assert!(t.subtasks.is_empty());
    }
}
