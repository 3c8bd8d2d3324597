//! Enumerations for TUI state management.

/// Every screen the interface can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Dashboard,
    // task lists
    TaskList,
    TodayTasks,
    TomorrowTasks,
    WeekTasks,
    OverdueTasks,
    UpcomingTasks,
    NoDueTasks,
    BlockedTasks,
    CompletedTasks,
    HighPriorityTasks,
    NextActions,
    SearchResults,
    Agenda,
    Kanban,
    TaskDetail,
    // task forms
    TaskAdd,
    TaskEdit,
    QuickAdd,
    TaskDeleteConfirm,
    TaskSetPriority,
    TaskSetDue,
    TaskMoveProject,
    SubtaskAdd,
    NoteAdd,
    DependencyAdd,
    SearchPrompt,
    // projects
    ProjectList,
    ProjectDetail,
    ProjectAdd,
    ProjectEdit,
    ProjectArchiveConfirm,
    ProjectStats,
    // time tracking
    TimeList,
    TimeAdd,
    TimeEdit,
    TimeDeleteConfirm,
    TimeReport,
    TimeByProject,
    // tools
    FocusSelect,
    FocusStatus,
    SortSelect,
    ThemeSelect,
    Stats,
    Help,
    About,
    BackupConfirm,
    ExitConfirm,
}

impl ViewId {
    pub const ALL: [ViewId; 48] = [
        ViewId::Dashboard,
        ViewId::TaskList,
        ViewId::TodayTasks,
        ViewId::TomorrowTasks,
        ViewId::WeekTasks,
        ViewId::OverdueTasks,
        ViewId::UpcomingTasks,
        ViewId::NoDueTasks,
        ViewId::BlockedTasks,
        ViewId::CompletedTasks,
        ViewId::HighPriorityTasks,
        ViewId::NextActions,
        ViewId::SearchResults,
        ViewId::Agenda,
        ViewId::Kanban,
        ViewId::TaskDetail,
        ViewId::TaskAdd,
        ViewId::TaskEdit,
        ViewId::QuickAdd,
        ViewId::TaskDeleteConfirm,
        ViewId::TaskSetPriority,
        ViewId::TaskSetDue,
        ViewId::TaskMoveProject,
        ViewId::SubtaskAdd,
        ViewId::NoteAdd,
        ViewId::DependencyAdd,
        ViewId::SearchPrompt,
        ViewId::ProjectList,
        ViewId::ProjectDetail,
        ViewId::ProjectAdd,
        ViewId::ProjectEdit,
        ViewId::ProjectArchiveConfirm,
        ViewId::ProjectStats,
        ViewId::TimeList,
        ViewId::TimeAdd,
        ViewId::TimeEdit,
        ViewId::TimeDeleteConfirm,
        ViewId::TimeReport,
        ViewId::TimeByProject,
        ViewId::FocusSelect,
        ViewId::FocusStatus,
        ViewId::SortSelect,
        ViewId::ThemeSelect,
        ViewId::Stats,
        ViewId::Help,
        ViewId::About,
        ViewId::BackupConfirm,
        ViewId::ExitConfirm,
    ];

    /// Identifier used in `view:<slug>` action ids and `--view`.
    pub fn slug(self) -> &'static str {
        match self {
            ViewId::Dashboard => "dashboard",
            ViewId::TaskList => "tasks",
            ViewId::TodayTasks => "today",
            ViewId::TomorrowTasks => "tomorrow",
            ViewId::WeekTasks => "week",
            ViewId::OverdueTasks => "overdue",
            ViewId::UpcomingTasks => "upcoming",
            ViewId::NoDueTasks => "no-due",
            ViewId::BlockedTasks => "blocked",
            ViewId::CompletedTasks => "completed",
            ViewId::HighPriorityTasks => "high-priority",
            ViewId::NextActions => "next",
            ViewId::SearchResults => "search-results",
            ViewId::Agenda => "agenda",
            ViewId::Kanban => "kanban",
            ViewId::TaskDetail => "task",
            ViewId::TaskAdd => "task-add",
            ViewId::TaskEdit => "task-edit",
            ViewId::QuickAdd => "quick-add",
            ViewId::TaskDeleteConfirm => "task-delete",
            ViewId::TaskSetPriority => "task-priority",
            ViewId::TaskSetDue => "task-due",
            ViewId::TaskMoveProject => "task-move",
            ViewId::SubtaskAdd => "subtask-add",
            ViewId::NoteAdd => "note-add",
            ViewId::DependencyAdd => "dependency-add",
            ViewId::SearchPrompt => "search",
            ViewId::ProjectList => "projects",
            ViewId::ProjectDetail => "project",
            ViewId::ProjectAdd => "project-add",
            ViewId::ProjectEdit => "project-edit",
            ViewId::ProjectArchiveConfirm => "project-archive",
            ViewId::ProjectStats => "project-stats",
            ViewId::TimeList => "time",
            ViewId::TimeAdd => "time-add",
            ViewId::TimeEdit => "time-edit",
            ViewId::TimeDeleteConfirm => "time-delete",
            ViewId::TimeReport => "time-report",
            ViewId::TimeByProject => "time-by-project",
            ViewId::FocusSelect => "focus",
            ViewId::FocusStatus => "focus-status",
            ViewId::SortSelect => "sort",
            ViewId::ThemeSelect => "theme",
            ViewId::Stats => "stats",
            ViewId::Help => "help",
            ViewId::About => "about",
            ViewId::BackupConfirm => "backup",
            ViewId::ExitConfirm => "exit",
        }
    }

    pub fn from_slug(slug: &str) -> Option<ViewId> {
        let slug = slug.trim();
        ViewId::ALL.iter().copied().find(|v| v.slug().eq_ignore_ascii_case(slug))
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewId::Dashboard => "Dashboard",
            ViewId::TaskList => "All Tasks",
            ViewId::TodayTasks => "Due Today",
            ViewId::TomorrowTasks => "Due Tomorrow",
            ViewId::WeekTasks => "Due This Week",
            ViewId::OverdueTasks => "Overdue",
            ViewId::UpcomingTasks => "Upcoming",
            ViewId::NoDueTasks => "No Due Date",
            ViewId::BlockedTasks => "Blocked",
            ViewId::CompletedTasks => "Completed",
            ViewId::HighPriorityTasks => "High Priority",
            ViewId::NextActions => "Next Actions",
            ViewId::SearchResults => "Search Results",
            ViewId::Agenda => "Agenda",
            ViewId::Kanban => "Board",
            ViewId::TaskDetail => "Task",
            ViewId::TaskAdd => "New Task",
            ViewId::TaskEdit => "Edit Task",
            ViewId::QuickAdd => "Quick Add",
            ViewId::TaskDeleteConfirm => "Delete Task",
            ViewId::TaskSetPriority => "Set Priority",
            ViewId::TaskSetDue => "Set Due Date",
            ViewId::TaskMoveProject => "Move to Project",
            ViewId::SubtaskAdd => "Add Subtask",
            ViewId::NoteAdd => "Add Note",
            ViewId::DependencyAdd => "Add Dependency",
            ViewId::SearchPrompt => "Search",
            ViewId::ProjectList => "Projects",
            ViewId::ProjectDetail => "Project",
            ViewId::ProjectAdd => "New Project",
            ViewId::ProjectEdit => "Edit Project",
            ViewId::ProjectArchiveConfirm => "Archive Project",
            ViewId::ProjectStats => "Project Stats",
            ViewId::TimeList => "Time Entries",
            ViewId::TimeAdd => "Log Time",
            ViewId::TimeEdit => "Edit Time Entry",
            ViewId::TimeDeleteConfirm => "Delete Time Entry",
            ViewId::TimeReport => "Weekly Report",
            ViewId::TimeByProject => "Time by Project",
            ViewId::FocusSelect => "Focus Project",
            ViewId::FocusStatus => "Focus",
            ViewId::SortSelect => "Sort Tasks",
            ViewId::ThemeSelect => "Theme",
            ViewId::Stats => "Statistics",
            ViewId::Help => "Help",
            ViewId::About => "About",
            ViewId::BackupConfirm => "Backup",
            ViewId::ExitConfirm => "Exit",
        }
    }

    /// Where `go_back` lands when there is no previous view.
    pub fn parent(self) -> ViewId {
        match self {
            ViewId::TaskDetail
            | ViewId::TaskAdd
            | ViewId::TaskEdit
            | ViewId::QuickAdd
            | ViewId::TaskDeleteConfirm
            | ViewId::TaskSetPriority
            | ViewId::TaskSetDue
            | ViewId::TaskMoveProject
            | ViewId::SearchPrompt => ViewId::TaskList,
            ViewId::SubtaskAdd | ViewId::NoteAdd | ViewId::DependencyAdd => ViewId::TaskDetail,
            ViewId::ProjectDetail
            | ViewId::ProjectAdd
            | ViewId::ProjectEdit
            | ViewId::ProjectArchiveConfirm
            | ViewId::ProjectStats => ViewId::ProjectList,
            ViewId::TimeAdd
            | ViewId::TimeEdit
            | ViewId::TimeDeleteConfirm
            | ViewId::TimeReport
            | ViewId::TimeByProject => ViewId::TimeList,
            _ => ViewId::Dashboard,
        }
    }

    /// Task list views share one draw/handle pair and differ only in their filter.
    pub fn is_task_list(self) -> bool {
        matches!(
            self,
            ViewId::TaskList
                | ViewId::TodayTasks
                | ViewId::TomorrowTasks
                | ViewId::WeekTasks
                | ViewId::OverdueTasks
                | ViewId::UpcomingTasks
                | ViewId::NoDueTasks
                | ViewId::BlockedTasks
                | ViewId::CompletedTasks
                | ViewId::HighPriorityTasks
                | ViewId::NextActions
                | ViewId::SearchResults
        )
    }

    /// Key hints shown in the footer.
    pub fn hint(self) -> &'static str {
        match self {
            v if v.is_task_list() => {
                "Enter:Open  a:Add  e:Edit  Space:Done  s:Status  p:Pri  u:Due  m:Move  d:Del  /:Search  o:Sort  F10:Menu"
            }
            ViewId::Agenda => "Enter:Open  Space:Done  Esc:Back  F10:Menu",
            ViewId::Kanban => "←→:Column  ↑↓:Task  </>:Move  Enter:Open  Esc:Back",
            ViewId::TaskDetail => "Space:Toggle subtask  a:Subtask  n:Note  b:Depends  e:Edit  c:Done  d:Del  Esc:Back",
            ViewId::TaskAdd
            | ViewId::TaskEdit
            | ViewId::ProjectAdd
            | ViewId::ProjectEdit
            | ViewId::TimeAdd
            | ViewId::TimeEdit => "Tab:Next field  ←→:Choose  Enter:Save  Esc:Cancel",
            ViewId::QuickAdd => "text @project !high due:fri  Enter:Add  Esc:Cancel",
            ViewId::TaskSetDue => "today, tomorrow, fri, next mon, in 3d, eom, YYYY-MM-DD  (empty clears)",
            ViewId::TaskDeleteConfirm
            | ViewId::ProjectArchiveConfirm
            | ViewId::TimeDeleteConfirm
            | ViewId::BackupConfirm
            | ViewId::ExitConfirm => "y:Yes  n/Esc:No",
            ViewId::ProjectList => "Enter:Open  a:Add  e:Edit  f:Focus  x:Archive  s:Stats  Esc:Back",
            ViewId::ProjectDetail => "e:Edit  f:Focus  x:Archive  t:Tasks  Esc:Back",
            ViewId::TimeList => "a:Log  e:Edit  d:Delete  r:Report  p:By project  Esc:Back",
            ViewId::TimeReport => "←→:Week  t:This week  Esc:Back",
            ViewId::Dashboard => "F10:Menu  Ctrl+N:Quick add  t:Tasks  p:Projects  i:Time  ?:Help  Ctrl+Q:Quit",
            _ => "↑↓:Select  Enter:Choose  Esc:Back",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugs_are_unique_and_round_trip() {
        let mut seen = HashSet::new();
        for view in ViewId::ALL {
            assert!(seen.insert(view.slug()), "duplicate slug {}", view.slug());
            assert_eq!(ViewId::from_slug(view.slug()), Some(view));
        }
        assert_eq!(ViewId::from_slug("TODAY"), Some(ViewId::TodayTasks));
        assert_eq!(ViewId::from_slug("nowhere"), None);
    }

    #[test]
    fn test_parent_chain_reaches_dashboard() {
        for view in ViewId::ALL {
            let mut v = view;
            for _ in 0..4 {
                v = v.parent();
            }
            assert_eq!(v, ViewId::Dashboard, "{:?}", view);
        }
    }
}
