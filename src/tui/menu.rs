//! Menu bar with keyboard-driven dropdowns.
//!
//! State machine: `Idle -> MenuActive -> DropdownOpen -> Idle`.
//!
//! - `Idle`: F10 activates the bar; Alt+<menu hotkey> opens that menu's
//!   dropdown directly.
//! - `MenuActive`: Left/Right cycle menus (wrapping), Enter/Down or a menu
//!   hotkey open the dropdown, Esc returns to `Idle`.
//! - `DropdownOpen`: Up/Down move over selectable items (bounded), Enter or an
//!   item hotkey yields the item's action and returns to `Idle`. Esc goes back
//!   to `MenuActive`, or to `Idle` when the dropdown was opened with Alt.

use std::io;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::tui::action::Action;
use crate::tui::colors::token;
use crate::tui::enums::ViewId;
use crate::tui::keys::alt_char;
use crate::tui::surface::TerminalSurface;
use crate::tui::utils::{display_width, fit};

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub label: String,
    pub action: Option<Action>,
    pub hotkey: Option<char>,
    pub enabled: bool,
    pub separator: bool,
}

impl MenuItem {
    pub fn new(label: &str, hotkey: char, action: Action) -> Self {
        MenuItem {
            label: label.to_string(),
            action: Some(action),
            hotkey: Some(hotkey.to_ascii_lowercase()),
            enabled: true,
            separator: false,
        }
    }

    pub fn separator() -> Self {
        MenuItem {
            label: String::new(),
            action: None,
            hotkey: None,
            enabled: false,
            separator: true,
        }
    }

    fn selectable(&self) -> bool {
        self.enabled && !self.separator && self.action.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub name: String,
    pub hotkey: char,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(name: &str, hotkey: char, items: Vec<MenuItem>) -> Self {
        Menu {
            name: name.to_string(),
            hotkey: hotkey.to_ascii_lowercase(),
            items,
        }
    }

    fn first_selectable(&self) -> usize {
        self.items.iter().position(MenuItem::selectable).unwrap_or(0)
    }

    fn width(&self) -> usize {
        self.items
            .iter()
            .map(|i| display_width(&i.label))
            .max()
            .unwrap_or(0)
            + 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    MenuActive,
    DropdownOpen,
}

pub struct MenuSystem {
    menus: Vec<Menu>,
    state: MenuState,
    selected_menu: usize,
    selected_item: usize,
    opened_directly: bool,
}

impl MenuSystem {
    pub fn new(menus: Vec<Menu>) -> Self {
        MenuSystem {
            menus,
            state: MenuState::Idle,
            selected_menu: 0,
            selected_item: 0,
            opened_directly: false,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != MenuState::Idle
    }

    pub fn selected_menu(&self) -> usize {
        self.selected_menu
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    fn menu_for_hotkey(&self, c: char) -> Option<usize> {
        let c = c.to_ascii_lowercase();
        self.menus.iter().position(|m| m.hotkey == c)
    }

    /// F10, or Alt plus a menu hotkey.
    pub fn is_activation_key(&self, key: &KeyEvent) -> bool {
        key.code == KeyCode::F(10) || alt_char(key).is_some_and(|c| self.menu_for_hotkey(c).is_some())
    }

    /// Enable or disable every item bound to `action`.
    pub fn set_enabled(&mut self, action: Action, enabled: bool) {
        for item in self.menus.iter_mut().flat_map(|m| m.items.iter_mut()) {
            if item.action == Some(action) {
                item.enabled = enabled;
            }
        }
    }

    fn close(&mut self) {
        self.state = MenuState::Idle;
        self.opened_directly = false;
    }

    fn open_dropdown(&mut self, menu: usize, directly: bool) {
        self.selected_menu = menu;
        self.selected_item = self.menus[menu].first_selectable();
        self.opened_directly = directly;
        self.state = MenuState::DropdownOpen;
    }

    /// Feed one key. Returns the chosen action once a selection is made.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<Action> {
        if self.menus.is_empty() {
            return None;
        }
        match self.state {
            MenuState::Idle => {
                if key.code == KeyCode::F(10) {
                    self.state = MenuState::MenuActive;
                } else if let Some(idx) = alt_char(key).and_then(|c| self.menu_for_hotkey(c)) {
                    self.open_dropdown(idx, true);
                }
                None
            }
            MenuState::MenuActive => {
                let n = self.menus.len();
                match key.code {
                    KeyCode::Esc | KeyCode::F(10) => self.close(),
                    KeyCode::Left => self.selected_menu = (self.selected_menu + n - 1) % n,
                    KeyCode::Right => self.selected_menu = (self.selected_menu + 1) % n,
                    KeyCode::Enter | KeyCode::Down => self.open_dropdown(self.selected_menu, false),
                    KeyCode::Char(c) => {
                        if let Some(idx) = self.menu_for_hotkey(c) {
                            self.open_dropdown(idx, false);
                        }
                    }
                    _ => {}
                }
                None
            }
            MenuState::DropdownOpen => self.handle_dropdown_key(key),
        }
    }

    fn handle_dropdown_key(&mut self, key: &KeyEvent) -> Option<Action> {
        let n = self.menus.len();
        match key.code {
            KeyCode::Esc => {
                if self.opened_directly {
                    self.close();
                } else {
                    self.state = MenuState::MenuActive;
                }
                None
            }
            KeyCode::F(10) => {
                self.close();
                None
            }
            KeyCode::Up => {
                self.step_item(false);
                None
            }
            KeyCode::Down => {
                self.step_item(true);
                None
            }
            KeyCode::Left => {
                self.open_dropdown((self.selected_menu + n - 1) % n, self.opened_directly);
                None
            }
            KeyCode::Right => {
                self.open_dropdown((self.selected_menu + 1) % n, self.opened_directly);
                None
            }
            KeyCode::Enter => {
                let item = self.menus[self.selected_menu].items.get(self.selected_item)?;
                if !item.selectable() {
                    return None;
                }
                let action = item.action;
                self.close();
                debug!(action = ?action, "menu selection");
                action
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::ALT) {
                    if let Some(idx) = self.menu_for_hotkey(c) {
                        self.open_dropdown(idx, self.opened_directly);
                    }
                    return None;
                }
                let c = c.to_ascii_lowercase();
                let action = self.menus[self.selected_menu]
                    .items
                    .iter()
                    .find(|i| i.selectable() && i.hotkey == Some(c))?
                    .action;
                self.close();
                debug!(action = ?action, "menu hotkey");
                action
            }
            _ => None,
        }
    }

    fn step_item(&mut self, down: bool) {
        let items = &self.menus[self.selected_menu].items;
        let mut i = self.selected_item;
        loop {
            let next = if down {
                i + 1
            } else {
                match i.checked_sub(1) {
                    Some(n) => n,
                    None => return,
                }
            };
            let Some(item) = items.get(next) else {
                return;
            };
            i = next;
            if item.selectable() {
                self.selected_item = i;
                return;
            }
        }
    }

    /// Column where each menu title starts on the bar.
    fn title_columns(&self) -> Vec<u16> {
        let mut x = 1u16;
        self.menus
            .iter()
            .map(|m| {
                let at = x;
                x = x.saturating_add(display_width(&m.name) as u16 + 2);
                at
            })
            .collect()
    }

    /// Draw the bar on row 0 and, when open, the dropdown below it.
    pub fn render(&self, surface: &mut TerminalSurface) -> io::Result<()> {
        let width = surface.width();
        surface.fill_area_styled(0, 0, width, 1, ' ', token::MENU_BG)?;
        let columns = self.title_columns();
        for (i, (menu, &x)) in self.menus.iter().zip(&columns).enumerate() {
            let highlighted = self.is_open() && i == self.selected_menu;
            let (fg, bg) = if highlighted {
                (token::MENU_ACTIVE_FG, token::MENU_ACTIVE_BG)
            } else {
                (token::MENU_FG, token::MENU_BG)
            };
            let title = format!(" {} ", menu.name);
            surface.write_at_styled(x, 0, &title, fg, Some(bg))?;
            if let Some(pos) = menu.name.chars().position(|c| c.to_ascii_lowercase() == menu.hotkey) {
                let hot: String = menu.name.chars().skip(pos).take(1).collect();
                surface.write_at_styled(x + 1 + pos as u16, 0, &hot, token::MENU_HOTKEY, Some(bg))?;
            }
        }

        if self.state == MenuState::DropdownOpen {
            let menu = &self.menus[self.selected_menu];
            let x = columns[self.selected_menu];
            self.render_dropdown(surface, menu, x)?;
        }
        Ok(())
    }

    fn render_dropdown(&self, surface: &mut TerminalSurface, menu: &Menu, x: u16) -> io::Result<()> {
        let inner = menu.width();
        let w = inner as u16 + 2;
        let h = menu.items.len() as u16 + 2;
        let x = x.min(surface.width().saturating_sub(w));
        surface.draw_filled_box(x, 1, w, h, token::MENU_BG)?;
        for (i, item) in menu.items.iter().enumerate() {
            let y = 2 + i as u16;
            if item.separator {
                surface.write_at_styled(x, y, &format!("├{}┤", "─".repeat(inner)), token::BORDER, Some(token::MENU_BG))?;
                continue;
            }
            let selected = i == self.selected_item;
            let (fg, bg) = if selected {
                (token::MENU_ACTIVE_FG, token::MENU_ACTIVE_BG)
            } else if item.enabled {
                (token::MENU_FG, token::MENU_BG)
            } else {
                (token::MENU_DISABLED, token::MENU_BG)
            };
            let line = format!(" {} ", fit(&item.label, inner - 2));
            surface.write_at_styled(x + 1, y, &line, fg, Some(bg))?;
            if item.enabled {
                if let Some(pos) = item
                    .hotkey
                    .and_then(|h| item.label.chars().position(|c| c.to_ascii_lowercase() == h))
                {
                    let hot: String = item.label.chars().skip(pos).take(1).collect();
                    surface.write_at_styled(x + 2 + pos as u16, y, &hot, token::MENU_HOTKEY, Some(bg))?;
                }
            }
        }
        Ok(())
    }
}

/// The application's menu bar.
pub fn default_menus() -> Vec<Menu> {
    use ViewId::*;
    vec![
        Menu::new(
            "File",
            'f',
            vec![
                MenuItem::new("New Task", 'n', Action::TaskAdd),
                MenuItem::new("Quick Add", 'q', Action::TaskQuickAdd),
                MenuItem::separator(),
                MenuItem::new("Backup Now", 'b', Action::Backup),
                MenuItem::new("Reload", 'r', Action::Refresh),
                MenuItem::separator(),
                MenuItem::new("Exit", 'x', Action::Exit),
            ],
        ),
        Menu::new(
            "Tasks",
            't',
            vec![
                MenuItem::new("All Tasks", 'a', Action::Show(TaskList)),
                MenuItem::new("Today", 't', Action::Show(TodayTasks)),
                MenuItem::new("Tomorrow", 'm', Action::Show(TomorrowTasks)),
                MenuItem::new("This Week", 'w', Action::Show(WeekTasks)),
                MenuItem::new("Overdue", 'o', Action::Show(OverdueTasks)),
                MenuItem::new("Upcoming", 'u', Action::Show(UpcomingTasks)),
                MenuItem::new("No Due Date", 'n', Action::Show(NoDueTasks)),
                MenuItem::new("Blocked", 'b', Action::Show(BlockedTasks)),
                MenuItem::new("Completed", 'c', Action::Show(CompletedTasks)),
                MenuItem::new("High Priority", 'h', Action::Show(HighPriorityTasks)),
                MenuItem::new("Next Actions", 'x', Action::Show(NextActions)),
                MenuItem::separator(),
                MenuItem::new("Edit Selected", 'e', Action::TaskEdit),
                MenuItem::new("Toggle Done", 'd', Action::TaskComplete),
                MenuItem::new("Delete Selected", 'l', Action::TaskDelete),
                MenuItem::new("Search", 's', Action::TaskSearch),
            ],
        ),
        Menu::new(
            "View",
            'v',
            vec![
                MenuItem::new("Dashboard", 'd', Action::Show(Dashboard)),
                MenuItem::new("Agenda", 'a', Action::Show(Agenda)),
                MenuItem::new("Kanban Board", 'k', Action::Show(Kanban)),
                MenuItem::new("Statistics", 's', Action::Show(Stats)),
                MenuItem::separator(),
                MenuItem::new("Sort Order", 'o', Action::Show(SortSelect)),
                MenuItem::new("Theme", 't', Action::Show(ThemeSelect)),
            ],
        ),
        Menu::new(
            "Projects",
            'p',
            vec![
                MenuItem::new("Project List", 'l', Action::Show(ProjectList)),
                MenuItem::new("New Project", 'n', Action::ProjectAdd),
                MenuItem::new("Project Stats", 's', Action::Show(ProjectStats)),
            ],
        ),
        Menu::new(
            "Time",
            'i',
            vec![
                MenuItem::new("Entries", 'e', Action::Show(TimeList)),
                MenuItem::new("Log Time", 'l', Action::TimeAdd),
                MenuItem::new("Weekly Report", 'w', Action::Show(TimeReport)),
                MenuItem::new("By Project", 'p', Action::Show(TimeByProject)),
            ],
        ),
        Menu::new(
            "Tools",
            'o',
            vec![
                MenuItem::new("Focus Project", 'f', Action::Show(FocusSelect)),
                MenuItem::new("Focus Status", 's', Action::Show(FocusStatus)),
                MenuItem::new("Clear Focus", 'c', Action::FocusClear),
                MenuItem::separator(),
                MenuItem::new("Backup...", 'b', Action::Show(BackupConfirm)),
            ],
        ),
        Menu::new(
            "Help",
            'h',
            vec![
                MenuItem::new("Keys", 'k', Action::Show(Help)),
                MenuItem::new("About", 'a', Action::Show(About)),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::colors::Theme;
    use crate::tui::style_cache::StyleCache;
    use crate::tui::testing::{key_event, screen_text, SharedBuffer};
    use crate::tui::testing::{alt, ch, key};

    fn menus() -> MenuSystem {
        MenuSystem::new(default_menus())
    }

    fn press(m: &mut MenuSystem, event: crate::tui::keys::InputEvent) -> Option<Action> {
        m.handle_key(&key_event(event))
    }

    #[test]
    fn test_hotkey_then_escape_is_idle_without_action() {
        let mut m = menus();
        assert_eq!(press(&mut m, alt('t')), None);
        assert_eq!(m.state(), MenuState::DropdownOpen);
        assert_eq!(press(&mut m, key(KeyCode::Esc)), None);
        assert_eq!(m.state(), MenuState::Idle);
    }

    #[test]
    fn test_item_hotkey_returns_action_and_resets() {
        let mut m = menus();
        press(&mut m, alt('T'));
        assert_eq!(press(&mut m, ch('O')), Some(Action::Show(ViewId::OverdueTasks)));
        assert_eq!(m.state(), MenuState::Idle);
    }

    #[test]
    fn test_escape_from_dropdown_opened_from_bar_returns_to_bar() {
        let mut m = menus();
        press(&mut m, key(KeyCode::F(10)));
        assert_eq!(m.state(), MenuState::MenuActive);
        press(&mut m, key(KeyCode::Right));
        press(&mut m, key(KeyCode::Enter));
        assert_eq!(m.state(), MenuState::DropdownOpen);
        press(&mut m, key(KeyCode::Esc));
        assert_eq!(m.state(), MenuState::MenuActive);
        assert_eq!(m.selected_menu(), 1);
        press(&mut m, key(KeyCode::Esc));
        assert_eq!(m.state(), MenuState::Idle);
    }

    #[test]
    fn test_left_right_wrap() {
        let mut m = menus();
        press(&mut m, key(KeyCode::F(10)));
        press(&mut m, key(KeyCode::Left));
        assert_eq!(m.selected_menu(), m.menus().len() - 1);
        press(&mut m, key(KeyCode::Right));
        assert_eq!(m.selected_menu(), 0);
    }

    #[test]
    fn test_up_down_skip_separators_and_stop_at_ends() {
        let mut m = menus();
        press(&mut m, alt('f'));
        press(&mut m, key(KeyCode::Up));
        press(&mut m, key(KeyCode::Down));
        press(&mut m, key(KeyCode::Down));
        // New Task, Quick Add, (separator), Backup Now
        assert_eq!(press(&mut m, key(KeyCode::Enter)), Some(Action::Backup));

        press(&mut m, alt('f'));
        for _ in 0..20 {
            press(&mut m, key(KeyCode::Down));
        }
        assert_eq!(press(&mut m, key(KeyCode::Enter)), Some(Action::Exit));
    }

    #[test]
    fn test_disabled_items_cannot_be_chosen() {
        let mut m = menus();
        m.set_enabled(Action::FocusClear, false);
        press(&mut m, alt('o'));
        assert_eq!(press(&mut m, ch('c')), None);
        assert_eq!(m.state(), MenuState::DropdownOpen);
        press(&mut m, key(KeyCode::Down));
        press(&mut m, key(KeyCode::Down));
        // Skips the disabled item and the separator.
        assert_eq!(press(&mut m, key(KeyCode::Enter)), Some(Action::Show(ViewId::BackupConfirm)));
    }

    #[test]
    fn test_activation_keys() {
        let m = menus();
        assert!(m.is_activation_key(&key_event(key(KeyCode::F(10)))));
        assert!(m.is_activation_key(&key_event(alt('p'))));
        assert!(!m.is_activation_key(&key_event(alt('z'))));
        assert!(!m.is_activation_key(&key_event(ch('p'))));
    }

    #[test]
    fn test_render_shows_bar_and_dropdown() {
        let buf = SharedBuffer::default();
        let mut surface = TerminalSurface::new(Box::new(buf.clone()), StyleCache::new(Theme::default(), 64));
        surface.apply_dimensions(Ok((80, 24)));
        let mut m = menus();
        press(&mut m, alt('h'));
        m.render(&mut surface).unwrap();
        let rows = screen_text(&buf.contents(), 80, 24);
        assert!(rows[0].contains("File"));
        assert!(rows[0].contains("Help"));
        assert!(rows.iter().any(|r| r.contains("About")));
    }
}
