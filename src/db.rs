//! Data-access layer: the in-memory `Database` snapshot and the stores that
//! load and persist it.
//!
//! Views never touch the file system themselves. They hold a `Database`
//! snapshot, mutate it, and hand it back through `DataStore::save` together
//! with a short description of what changed.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::project::Project;
use crate::task::Task;
use crate::time::TimeEntry;

/// In-memory snapshot of everything the application stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
}

impl Database {
    /// Generate the next available task ID.
    pub fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Generate the next available time entry ID.
    pub fn next_time_id(&self) -> u64 {
        self.time_entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    /// Get a task by ID.
    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Remove a task and drop dependency edges that pointed at it.
    pub fn remove_task(&mut self, id: u64) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(idx);
        for t in self.tasks.iter_mut() {
            t.depends.retain(|&d| d != id);
        }
        Some(removed)
    }

    /// Look up a project by name, ignoring ASCII case.
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.matches(name))
    }

    pub fn project_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.matches(name))
    }

    pub fn time_entry(&self, id: u64) -> Option<&TimeEntry> {
        self.time_entries.iter().find(|e| e.id == id)
    }

    pub fn time_entry_mut(&mut self, id: u64) -> Option<&mut TimeEntry> {
        self.time_entries.iter_mut().find(|e| e.id == id)
    }

    /// Remove a time entry, returning it if it existed.
    pub fn remove_time_entry(&mut self, id: u64) -> Option<TimeEntry> {
        let idx = self.time_entries.iter().position(|e| e.id == id)?;
        Some(self.time_entries.remove(idx))
    }

    /// Whether any dependency of `task` is still active.
    pub fn is_blocked(&self, task: &Task) -> bool {
        task.depends
            .iter()
            .any(|&d| self.task(d).is_some_and(|dep| dep.is_active()))
    }

    /// Project names known from the project list and from task/time references.
    pub fn project_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.projects.iter().map(|p| p.name.clone()).collect();
        let referenced = self
            .tasks
            .iter()
            .filter_map(|t| t.project.clone())
            .chain(self.time_entries.iter().filter_map(|e| e.project.clone()));
        for name in referenced {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                names.push(name);
            }
        }
        names.sort_by_key(|n| n.to_lowercase());
        names
    }
}

/// Synchronous data-access contract consumed by the pipeline and the views.
pub trait DataStore {
    /// Load a fresh snapshot.
    fn load(&self) -> Result<Database, StoreError>;

    /// Persist a snapshot. `action` describes the change for logs and backups.
    fn save(&mut self, data: &Database, action: &str) -> Result<(), StoreError>;

    /// Write a timestamped copy of the current data and return its location.
    fn backup(&self) -> Result<PathBuf, StoreError>;

    /// Human-readable location, shown in the About view.
    fn describe(&self) -> String;
}

/// JSON file store with rolling backups.
///
/// Saves go through a sibling `.json.tmp` file that is renamed over the data
/// file, so a failed write leaves the previous contents in place. Before each
/// save the current file is copied to `<path>.bak1`, shifting older copies up
/// to `backup_count`.
pub struct JsonStore {
    path: PathBuf,
    backup_count: usize,
}

impl JsonStore {
    /// Store at `path`, keeping `backup_count` rolling copies (0 disables them).
    /// Nothing is touched on disk until the first save.
    pub fn new(path: impl Into<PathBuf>, backup_count: usize) -> Self {
        JsonStore {
            path: path.into(),
            backup_count,
        }
    }

    /// Location of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rolling_backup_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".bak{}", n));
        PathBuf::from(name)
    }

    /// Shift `.bak1..N` up by one and copy the current file into `.bak1`.
    fn rotate_backups(&self) -> Result<(), StoreError> {
        if self.backup_count == 0 || !self.path.exists() {
            return Ok(());
        }
        for n in (1..self.backup_count).rev() {
            let from = self.rolling_backup_path(n);
            if from.exists() {
                let to = self.rolling_backup_path(n + 1);
                fs::rename(&from, &to).map_err(|e| StoreError::io(&to, e))?;
            }
        }
        let first = self.rolling_backup_path(1);
        fs::copy(&self.path, &first).map_err(|e| StoreError::io(&first, e))?;
        Ok(())
    }
}

impl DataStore for JsonStore {
    fn load(&self) -> Result<Database, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "data file missing, starting empty");
            return Ok(Database::default());
        }
        let mut buf = String::new();
        File::open(&self.path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .map_err(|e| StoreError::io(&self.path, e))?;
        if buf.trim().is_empty() {
            return Ok(Database::default());
        }
        serde_json::from_str(&buf).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&mut self, data: &Database, action: &str) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        if let Err(e) = self.rotate_backups() {
            warn!(error = %e, "rolling backup failed, saving anyway");
        }

        // Atomic-ish write via temp + rename.
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(data).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let written = File::create(&tmp)
            .and_then(|mut f| f.write_all(json.as_bytes()).and_then(|_| f.flush()))
            .map_err(|e| StoreError::io(&tmp, e))
            .and_then(|_| fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e)));
        if let Err(e) = written {
            if let Err(rm) = fs::remove_file(&tmp) {
                debug!(path = %tmp.display(), error = %rm, "temp file not removed");
            }
            return Err(e);
        }

        info!(action, path = %self.path.display(), "saved");
        Ok(())
    }

    fn backup(&self) -> Result<PathBuf, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::io(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "data file does not exist"),
            ));
        }
        let parent_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let backup_dir = parent_dir.join("backup");
        fs::create_dir_all(&backup_dir).map_err(|e| StoreError::io(&backup_dir, e))?;

        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("taskdeck.json");
        let backup_path = backup_dir.join(format!("{}_{}", timestamp, file_name));
        fs::copy(&self.path, &backup_path).map_err(|e| StoreError::io(&backup_path, e))?;

        info!(path = %backup_path.display(), "backup written");
        Ok(backup_path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Database {
        let mut db = Database::default();
        db.tasks.push(Task::new(1, "first"));
        let mut second = Task::new(2, "second");
        second.depends.push(1);
        second.project = Some("Work".into());
        db.tasks.push(second);
        db.projects.push(Project::new("Home"));
        db
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nope.json"), 3);
        assert_eq!(store.load().unwrap(), Database::default());
    }

    #[test]
    fn test_save_then_load_and_rolling_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut store = JsonStore::new(&path, 2);
        let mut db = sample();

        store.save(&db, "first save").unwrap();
        assert!(!store.rolling_backup_path(1).exists());

        db.tasks[0].text = "renamed".into();
        store.save(&db, "rename").unwrap();
        store.save(&db, "again").unwrap();
        store.save(&db, "and again").unwrap();

        assert_eq!(store.load().unwrap(), db);
        assert!(store.rolling_backup_path(1).exists());
        assert!(store.rolling_backup_path(2).exists());
        assert!(!store.rolling_backup_path(3).exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        // A non-empty directory where the data file should be: the temp file
        // can be written but not renamed over it.
        let path = dir.path().join("data.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        let mut store = JsonStore::new(&path, 0);

        assert!(matches!(store.save(&sample(), "seed"), Err(StoreError::Io { .. })));
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_corrupt_file_is_distinguishable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonStore::new(&path, 0);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_backup_copies_into_backup_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut store = JsonStore::new(&path, 0);
        assert!(store.backup().is_err());
        store.save(&sample(), "seed").unwrap();
        let copy = store.backup().unwrap();
        assert!(copy.starts_with(dir.path().join("backup")));
        assert!(copy.to_string_lossy().ends_with("_data.json"));
    }

    #[test]
    fn test_remove_task_clears_dependency_edges() {
        let mut db = sample();
        assert!(db.is_blocked(db.task(2).unwrap()));
        db.remove_task(1);
        assert!(db.task(2).unwrap().depends.is_empty());
        assert!(db.remove_task(1).is_none());
    }

    #[test]
    fn test_project_names_merge_references() {
        let db = sample();
        assert_eq!(db.project_names(), vec!["Home".to_string(), "Work".to_string()]);
    }
}
