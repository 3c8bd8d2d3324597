//! Project records.
//!
//! Projects are referenced from tasks and time entries by name. Names are
//! matched case-insensitively everywhere.

use serde::{Deserialize, Serialize};

use crate::fields::ProjectStatus;

/// A project with its descriptive metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Client or owning team.
    #[serde(default)]
    pub client: Option<String>,
    /// External reference codes (ticket system, billing code).
    #[serde(default)]
    pub id1: Option<String>,
    #[serde(default)]
    pub id2: Option<String>,
    #[serde(default)]
    pub assigned: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub budget_hours: Option<f64>,
}

impl Project {
    pub fn new(name: &str) -> Self {
        Project {
            name: name.trim().to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            tags: Vec::new(),
            client: None,
            id1: None,
            id2: None,
            assigned: None,
            due: None,
            budget_hours: None,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    pub fn is_archived(&self) -> bool {
        self.status == ProjectStatus::Archived
    }
}

/// Validate a project name typed into a form.
pub fn validate_project_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Project name cannot be empty".to_string());
    }
    if name.chars().any(|c| c.is_control() || c == '@') {
        return Err(format!("Project name '{}' contains invalid characters", name));
    }
    Ok(name.to_string())
}

/// Split comma-separated tags, normalising each one.
pub fn split_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = input
        .split(',')
        .map(|t| t.trim().to_lowercase().replace(' ', "-"))
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_project_name() {
        assert_eq!(validate_project_name("  Work "), Ok("Work".to_string()));
        assert!(validate_project_name("   ").is_err());
        assert!(validate_project_name("a@b").is_err());
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("Backend, ops ,,Backend, deep work"), vec!["backend", "deep-work", "ops"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        assert!(Project::new("Work").matches("work"));
        assert!(!Project::new("Work").matches("home"));
    }
}
