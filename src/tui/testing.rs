//! Headless doubles for driving the interface from tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::db::{DataStore, Database};
use crate::error::StoreError;
use crate::fields::{Priority, Status};
use crate::project::Project;
use crate::task::Task;
use crate::time::TimeEntry;
use crate::tui::keys::{InputEvent, KeySource};

/// In-memory store. Clones share the same data, so a test can keep a handle
/// after boxing one into a pipeline.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<Database>>,
    fail_saves: Rc<Cell<bool>>,
    saves: Rc<RefCell<Vec<String>>>,
}

impl MemoryStore {
    pub fn with_data(db: Database) -> Self {
        MemoryStore {
            data: Rc::new(RefCell::new(db)),
            ..MemoryStore::default()
        }
    }

    /// Make saves and backups fail with "disk full".
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    pub fn data(&self) -> Database {
        self.data.borrow().clone()
    }

    pub fn saved_actions(&self) -> Vec<String> {
        self.saves.borrow().clone()
    }
}

impl DataStore for MemoryStore {
    fn load(&self) -> Result<Database, StoreError> {
        Ok(self.data.borrow().clone())
    }

    fn save(&mut self, data: &Database, action: &str) -> Result<(), StoreError> {
        if self.fail_saves.get() {
            return Err(StoreError::Rejected("disk full".to_string()));
        }
        *self.data.borrow_mut() = data.clone();
        self.saves.borrow_mut().push(action.to_string());
        Ok(())
    }

    fn backup(&self) -> Result<PathBuf, StoreError> {
        if self.fail_saves.get() {
            return Err(StoreError::Rejected("disk full".to_string()));
        }
        Ok(PathBuf::from("memory-backup.json"))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Replays a fixed list of events, then fails like a lost terminal.
pub struct ScriptedKeys {
    events: VecDeque<InputEvent>,
}

impl ScriptedKeys {
    pub fn new(events: Vec<InputEvent>) -> Self {
        ScriptedKeys {
            events: events.into(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn read_event(&mut self) -> io::Result<InputEvent> {
        self.events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

/// Writer that records everything written, shared between clones.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
    writes: Rc<Cell<usize>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }

    /// Number of `write` calls that carried data.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn clear(&self) {
        self.bytes.borrow_mut().clear();
        self.writes.set(0);
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !buf.is_empty() {
            self.writes.set(self.writes.get() + 1);
        }
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn key(code: KeyCode) -> InputEvent {
    InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn ch(c: char) -> InputEvent {
    key(KeyCode::Char(c))
}

pub fn alt(c: char) -> InputEvent {
    InputEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::ALT))
}

pub fn ctrl(c: char) -> InputEvent {
    InputEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

pub fn text(s: &str) -> Vec<InputEvent> {
    s.chars().map(ch).collect()
}

pub fn key_event(event: InputEvent) -> KeyEvent {
    match event {
        InputEvent::Key(k) => k,
        InputEvent::Resize(..) => KeyEvent::new(KeyCode::Null, KeyModifiers::NONE),
    }
}

/// Row of a parsed screen with blank cells as spaces and trailing blanks trimmed.
pub fn row_text(parser: &vt100::Parser, row: u16) -> String {
    let (_, cols) = parser.screen().size();
    let line: String = (0..cols)
        .filter_map(|col| match parser.screen().cell(row, col) {
            Some(cell) if cell.is_wide_continuation() => None,
            Some(cell) if cell.has_contents() => Some(cell.contents()),
            _ => Some(" ".to_string()),
        })
        .collect();
    line.trim_end().to_string()
}

pub fn screen_text(bytes: &[u8], width: u16, height: u16) -> Vec<String> {
    let mut parser = vt100::Parser::new(height, width, 0);
    parser.process(bytes);
    (0..height).map(|row| row_text(&parser, row)).collect()
}

pub fn sample_today() -> NaiveDate {
    // A Wednesday.
    NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
}

pub fn sample_database() -> Database {
    let mut db = Database::default();

    let mut t1 = Task::new(1, "Write quarterly report");
    t1.project = Some("Work".into());
    t1.priority = Some(Priority::High);
    t1.due = Some("2025-01-06".into());

    let mut t2 = Task::new(2, "Fix login bug");
    t2.project = Some("Work".into());
    t2.priority = Some(Priority::Medium);
    t2.due = Some("2025-01-08".into());
    t2.status = Status::InProgress;

    let mut t3 = Task::new(3, "Buy groceries");
    t3.project = Some("Home".into());
    t3.due = Some("2025-01-09".into());

    let mut t4 = Task::new(4, "Renew passport");
    t4.set_completed(true);

    let mut t5 = Task::new(5, "Deploy release");
    t5.project = Some("Work".into());
    t5.depends.push(2);

    db.tasks = vec![t1, t2, t3, t4, t5];
    db.projects = vec![Project::new("Work"), Project::new("Home")];
    db.time_entries.push(TimeEntry {
        id: 1,
        project: Some("Work".into()),
        time_code: None,
        date: sample_today(),
        minutes: 90,
        description: "report draft".into(),
    });
    db
}
