//! Time entries and the summaries built from them.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Minutes logged against a project or a bare time code on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub time_code: Option<String>,
    pub date: NaiveDate,
    pub minutes: u32,
    #[serde(default)]
    pub description: String,
}

impl TimeEntry {
    /// Grouping key: the project name, else `#code`, else `(unassigned)`.
    pub fn bucket(&self) -> String {
        match (&self.project, &self.time_code) {
            (Some(p), _) if !p.is_empty() => p.clone(),
            (_, Some(c)) if !c.is_empty() => format!("#{}", c),
            _ => "(unassigned)".to_string(),
        }
    }
}

/// Newest first; entries on the same day keep newest id first.
pub fn sort_entries_desc(entries: &mut [TimeEntry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

/// Per-bucket minutes for the seven days starting at `week_start`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub week_start: NaiveDate,
    pub rows: Vec<(String, [u32; 7])>,
    pub day_totals: [u32; 7],
}

impl WeekSummary {
    pub fn total(&self) -> u32 {
        self.day_totals.iter().sum()
    }
}

pub fn weekly_summary(entries: &[TimeEntry], week_start: NaiveDate) -> WeekSummary {
    let week_end = week_start + Duration::days(6);
    let mut rows: BTreeMap<String, [u32; 7]> = BTreeMap::new();
    let mut day_totals = [0u32; 7];
    for e in entries.iter().filter(|e| e.date >= week_start && e.date <= week_end) {
        let day = (e.date - week_start).num_days() as usize;
        rows.entry(e.bucket()).or_insert([0; 7])[day] += e.minutes;
        day_totals[day] += e.minutes;
    }
    WeekSummary {
        week_start,
        rows: rows.into_iter().collect(),
        day_totals,
    }
}

/// Total minutes per bucket, largest first.
pub fn totals_by_bucket(entries: &[TimeEntry]) -> Vec<(String, u32)> {
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for e in entries {
        *totals.entry(e.bucket()).or_default() += e.minutes;
    }
    let mut out: Vec<(String, u32)> = totals.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    out
}
