//! Enumerations and field types for tasks and projects.
//!
//! Status, priority and sort vocabularies shared by the data file, the CLI
//! and the terminal views.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Pending,
    #[serde(alias = "active")]
    InProgress,
    Blocked,
    #[serde(alias = "done")]
    Completed,
    Cancelled,
}

impl Status {
    /// Every status in board order.
    pub const ALL: [Status; 5] = [
        Status::Pending,
        Status::InProgress,
        Status::Blocked,
        Status::Completed,
        Status::Cancelled,
    ];

    /// Stored name, also used for lexical sorting.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Blocked => "blocked",
            Status::Completed => "completed",
            Status::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Blocked => "Blocked",
            Status::Completed => "Completed",
            Status::Cancelled => "Cancelled",
        }
    }

    /// Whether the task still needs doing.
    pub fn is_active(self) -> bool {
        !matches!(self, Status::Completed | Status::Cancelled)
    }

    /// Next status in the `s` cycle: Pending -> In Progress -> Completed -> Pending.
    pub fn cycle(self) -> Status {
        match self {
            Status::Pending => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Blocked => Status::InProgress,
            Status::Completed | Status::Cancelled => Status::Pending,
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        let s = s.trim().to_lowercase();
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == s || st.label().to_lowercase() == s)
            .or(match s.as_str() {
                "active" | "doing" => Some(Status::InProgress),
                "done" => Some(Status::Completed),
                "todo" => Some(Status::Pending),
                _ => None,
            })
    }
}

/// Task priority. `Unset` is an explicit "none", distinct from a missing value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    High,
    Medium,
    Low,
    #[serde(rename = "none")]
    #[value(name = "none")]
    Unset,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::High, Priority::Medium, Priority::Low, Priority::Unset];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Unset => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" | "1" => Some(Priority::High),
            "medium" | "med" | "m" | "2" => Some(Priority::Medium),
            "low" | "l" | "3" => Some(Priority::Low),
            "none" | "-" => Some(Priority::Unset),
            _ => None,
        }
    }
}

/// Sort rank: high < medium < low < none < missing.
pub fn priority_rank(p: Option<Priority>) -> u8 {
    match p {
        Some(Priority::High) => 0,
        Some(Priority::Medium) => 1,
        Some(Priority::Low) => 2,
        Some(Priority::Unset) => 3,
        None => 4,
    }
}

/// Short display form used in tables.
pub fn format_priority(p: Option<Priority>) -> &'static str {
    match p {
        Some(Priority::High) => "high",
        Some(Priority::Medium) => "med",
        Some(Priority::Low) => "low",
        Some(Priority::Unset) | None => "-",
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Active,
    OnHold,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on-hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<ProjectStatus> {
        match s.trim().to_lowercase().replace(' ', "-").as_str() {
            "active" => Some(ProjectStatus::Active),
            "on-hold" | "hold" | "paused" => Some(ProjectStatus::OnHold),
            "completed" | "done" => Some(ProjectStatus::Completed),
            "archived" => Some(ProjectStatus::Archived),
            _ => None,
        }
    }
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Id,
    Priority,
    Status,
    Created,
    Due,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Id,
        SortKey::Priority,
        SortKey::Status,
        SortKey::Created,
        SortKey::Due,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Id => "ID (ascending)",
            SortKey::Priority => "Priority (high first)",
            SortKey::Status => "Status (A-Z)",
            SortKey::Created => "Created (newest first)",
            SortKey::Due => "Due date (soonest first)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_orders_missing_last() {
        let mut ps = vec![None, Some(Priority::Unset), Some(Priority::Low), Some(Priority::High), Some(Priority::Medium)];
        ps.sort_by_key(|p| priority_rank(*p));
        assert_eq!(
            ps,
            vec![Some(Priority::High), Some(Priority::Medium), Some(Priority::Low), Some(Priority::Unset), None]
        );
    }

    #[test]
    fn test_status_parse_accepts_aliases() {
        assert_eq!(Status::parse("done"), Some(Status::Completed));
        assert_eq!(Status::parse("In Progress"), Some(Status::InProgress));
        assert_eq!(Status::parse("blocked"), Some(Status::Blocked));
        assert_eq!(Status::parse("later"), None);
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: Status = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(back, Status::Completed);
        let p: Priority = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(p, Priority::Unset);
    }
}
