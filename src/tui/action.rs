//! Commands produced by the menu bar and consumed by the view layer.
//!
//! Each action has a stable string id (`view:today`, `task:add`,
//! `app:exit`) used in the config file's `start` key and in logs.

use std::fmt;
use std::str::FromStr;

use crate::tui::enums::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Show(ViewId),
    TaskAdd,
    TaskQuickAdd,
    TaskEdit,
    TaskComplete,
    TaskDelete,
    TaskSearch,
    ProjectAdd,
    FocusClear,
    TimeAdd,
    Backup,
    Refresh,
    Exit,
}

const NAMED: [(Action, &str); 12] = [
    (Action::TaskAdd, "task:add"),
    (Action::TaskQuickAdd, "task:quick-add"),
    (Action::TaskEdit, "task:edit"),
    (Action::TaskComplete, "task:complete"),
    (Action::TaskDelete, "task:delete"),
    (Action::TaskSearch, "task:search"),
    (Action::ProjectAdd, "project:add"),
    (Action::FocusClear, "focus:clear"),
    (Action::TimeAdd, "time:add"),
    (Action::Backup, "app:backup"),
    (Action::Refresh, "app:refresh"),
    (Action::Exit, "app:exit"),
];

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Show(view) => write!(f, "view:{}", view.slug()),
            other => {
                let id = NAMED
                    .iter()
                    .find(|(a, _)| a == other)
                    .map(|(_, id)| *id)
                    .unwrap_or("unknown");
                f.write_str(id)
            }
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(slug) = s.strip_prefix("view:") {
            return ViewId::from_slug(slug)
                .map(Action::Show)
                .ok_or_else(|| format!("unknown view '{}'", slug));
        }
        NAMED
            .iter()
            .find(|(_, id)| id.eq_ignore_ascii_case(s))
            .map(|(a, _)| *a)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}
