//! Filtered, sorted and summarised views of the stored data.
//!
//! The pure functions (`select_tasks`, `sort_tasks`, `compute_stats`) work on
//! a snapshot already in memory; `DataPipeline` wraps a `DataStore` and runs
//! them against a fresh load.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::db::{DataStore, Database};
use crate::error::StoreError;
use crate::fields::{priority_rank, SortKey};
use crate::project::Project;
use crate::task::Task;
use crate::time::{sort_entries_desc, TimeEntry};

/// Conjunctive task filter plus ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    /// Only tasks in this project (case-insensitive).
    pub project: Option<String>,
    /// Case-insensitive substring over text, project and id.
    pub search: Option<String>,
    pub sort: SortKey,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(project) = self.project.as_deref() {
            if !task
                .project
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(project))
            {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_text = task.text.to_lowercase().contains(&needle);
            let in_project = task
                .project
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&needle));
            let in_id = task.id.to_string().contains(&needle);
            if !(in_text || in_project || in_id) {
                return false;
            }
        }
        true
    }
}

/// Headline counts for a task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
}

/// Tasks returned by a query with the stats of that same selection.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    pub tasks: Vec<Task>,
    pub stats: Stats,
}

/// Filter and sort a snapshot.
pub fn select_tasks(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.iter().filter(|t| query.matches(t)).cloned().collect();
    sort_tasks(&mut out, query.sort);
    out
}

/// Stable sort by the given key.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey) {
    match key {
        SortKey::Id => tasks.sort_by_key(|t| t.id),
        SortKey::Priority => tasks.sort_by_key(|t| priority_rank(t.priority)),
        SortKey::Status => tasks.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
        SortKey::Created => tasks.sort_by(|a, b| match (a.created, b.created) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortKey::Due => tasks.sort_by(|a, b| compare_due(a, b)),
    }
}

/// Ascending due date; missing or unparsable dates sort last.
pub fn compare_due(a: &Task, b: &Task) -> Ordering {
    match (a.due_date(), b.due_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compute_stats(tasks: &[Task], today: NaiveDate) -> Stats {
    let mut stats = Stats {
        total: tasks.len(),
        ..Stats::default()
    };
    for t in tasks {
        if t.is_active() {
            stats.active += 1;
            if t.is_overdue(today) {
                stats.overdue += 1;
            }
        } else {
            stats.completed += 1;
        }
    }
    stats
}

/// Per-project rollup used by the project stats view.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub stats: Stats,
    pub minutes: u32,
}

pub fn project_summaries(db: &Database, today: NaiveDate) -> Vec<ProjectSummary> {
    db.project_names()
        .into_iter()
        .map(|name| {
            let tasks: Vec<Task> = db
                .tasks
                .iter()
                .filter(|t| t.project.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(&name)))
                .cloned()
                .collect();
            let minutes = db
                .time_entries
                .iter()
                .filter(|e| e.project.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(&name)))
                .map(|e| e.minutes)
                .sum();
            ProjectSummary {
                stats: compute_stats(&tasks, today),
                name,
                minutes,
            }
        })
        .collect()
}

/// Loads through a `DataStore` and shapes the result for views.
pub struct DataPipeline {
    store: Box<dyn DataStore>,
}

impl DataPipeline {
    pub fn new(store: Box<dyn DataStore>) -> Self {
        DataPipeline { store }
    }

    pub fn load_database(&self) -> Result<Database, StoreError> {
        self.store.load()
    }

    pub fn load_tasks(&self, query: &TaskQuery, today: NaiveDate) -> Result<TaskSet, StoreError> {
        let db = self.store.load()?;
        let tasks = select_tasks(&db.tasks, query);
        let stats = compute_stats(&tasks, today);
        Ok(TaskSet { tasks, stats })
    }

    pub fn load_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut projects = self.store.load()?.projects;
        projects.sort_by_key(|p| p.name.to_lowercase());
        Ok(projects)
    }

    /// Time entries, newest first.
    pub fn load_time_entries(&self) -> Result<Vec<TimeEntry>, StoreError> {
        let mut entries = self.store.load()?.time_entries;
        sort_entries_desc(&mut entries);
        Ok(entries)
    }

    pub fn save(&mut self, data: &Database, action: &str) -> Result<(), StoreError> {
        self.store.save(data, action)
    }

    pub fn backup(&self) -> Result<std::path::PathBuf, StoreError> {
        self.store.backup()
    }

    pub fn describe(&self) -> String {
        self.store.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, Status};
    use crate::tui::testing::MemoryStore;

    fn task(id: u64, due: Option<&str>) -> Task {
        let mut t = Task::new(id, &format!("task {}", id));
        t.due = due.map(str::to_string);
        t
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_sort_by_due_puts_missing_last() {
        let mut tasks = vec![task(3, Some("2025-01-10")), task(1, None), task(2, Some("2025-01-05"))];
        sort_tasks(&mut tasks, SortKey::Due);
        assert_eq!(ids(&tasks), vec![2, 3, 1]);
        sort_tasks(&mut tasks, SortKey::Id);
        assert_eq!(ids(&tasks), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_by_due_treats_unparsable_as_missing() {
        let mut tasks = vec![task(1, Some("someday")), task(2, Some("2030-01-01")), task(3, None)];
        sort_tasks(&mut tasks, SortKey::Due);
        assert_eq!(ids(&tasks), vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_by_priority_and_status() {
        let mut tasks: Vec<Task> = (1..=5).map(|i| task(i, None)).collect();
        tasks[0].priority = None;
        tasks[1].priority = Some(Priority::Low);
        tasks[2].priority = Some(Priority::High);
        tasks[3].priority = Some(Priority::Unset);
        tasks[4].priority = Some(Priority::Medium);
        sort_tasks(&mut tasks, SortKey::Priority);
        assert_eq!(ids(&tasks), vec![3, 5, 2, 4, 1]);

        tasks[0].status = Status::Pending;
        tasks[1].status = Status::Blocked;
        tasks[2].status = Status::Completed;
        tasks[3].status = Status::InProgress;
        tasks[4].status = Status::Cancelled;
        sort_tasks(&mut tasks, SortKey::Status);
        let statuses: Vec<&str> = tasks.iter().map(|t| t.status.as_str()).collect();
        assert_eq!(statuses, vec!["blocked", "cancelled", "completed", "in-progress", "pending"]);
    }

    #[test]
    fn test_sort_by_created_newest_first() {
        let mut tasks = vec![task(1, None), task(2, None), task(3, None)];
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        tasks[0].created = Some(base);
        tasks[1].created = None;
        tasks[2].created = Some(base + chrono::Duration::hours(1));
        sort_tasks(&mut tasks, SortKey::Created);
        assert_eq!(ids(&tasks), vec![3, 1, 2]);
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let mut a = task(1, None);
        a.project = Some("work".into());
        a.text = "fix login bug".into();
        let mut b = task(2, None);
        b.project = Some("home".into());
        b.text = "fix bug".into();
        let query = TaskQuery {
            project: Some("work".into()),
            search: Some("bug".into()),
            sort: SortKey::Id,
        };
        assert!(query.matches(&a));
        assert!(!query.matches(&b));
    }

    #[test]
    fn test_search_covers_project_and_id() {
        let mut a = task(42, None);
        a.project = Some("Garden".into());
        let by_project = TaskQuery { search: Some("GARD".into()), ..TaskQuery::default() };
        let by_id = TaskQuery { search: Some("42".into()), ..TaskQuery::default() };
        let miss = TaskQuery { search: Some("kitchen".into()), ..TaskQuery::default() };
        assert!(by_project.matches(&a));
        assert!(by_id.matches(&a));
        assert!(!miss.matches(&a));
    }

    #[test]
    fn test_stats_and_pipeline_load() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let mut db = Database::default();
        db.tasks.push(task(1, Some("2025-01-01")));
        db.tasks.push(task(2, Some("2025-01-09")));
        let mut done = task(3, Some("2025-01-01"));
        done.status = Status::Completed;
        db.tasks.push(done);

        let pipeline = DataPipeline::new(Box::new(MemoryStore::with_data(db)));
        let set = pipeline.load_tasks(&TaskQuery::default(), today).unwrap();
        assert_eq!(
            set.stats,
            Stats { total: 3, active: 2, completed: 1, overdue: 1 }
        );
    }

    #[test]
    fn test_time_entries_load_newest_first() {
        let mut db = Database::default();
        for (id, date) in [(1, "2025-01-02"), (2, "2025-01-09"), (3, "2025-01-05")] {
            db.time_entries.push(TimeEntry {
                id,
                project: None,
                time_code: None,
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                minutes: 10,
                description: String::new(),
            });
        }
        let pipeline = DataPipeline::new(Box::new(MemoryStore::with_data(db)));
        let entries = pipeline.load_time_entries().unwrap();
        let order: Vec<u64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_project_summaries_roll_up_minutes() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let mut db = Database::default();
        db.projects.push(Project::new("Work"));
        let mut t = task(1, None);
        t.project = Some("work".into());
        db.tasks.push(t);
        db.time_entries.push(TimeEntry {
            id: 1,
            project: Some("Work".into()),
            time_code: None,
            date: today,
            minutes: 45,
            description: String::new(),
        });
        let summaries = project_summaries(&db, today);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].stats.total, 1);
        assert_eq!(summaries[0].minutes, 45);
    }
}
