//! Main loop of the terminal user interface.
//!
//! `App` ties the pieces together: it reads one key at a time, offers it to
//! the global shortcuts and the menu bar, hands it to the current view
//! otherwise, and redraws the whole screen as one buffered frame.

use std::collections::BTreeMap;
use std::io;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, error, info, warn};

use crate::tui::action::Action;
use crate::tui::colors::{token, Theme};
use crate::tui::context::ViewContext;
use crate::tui::enums::ViewId;
use crate::tui::keys::{is_ctrl, InputEvent, KeySource};
use crate::tui::menu::{default_menus, MenuSystem};
use crate::tui::surface::{TerminalGuard, TerminalSurface};
use crate::tui::utils::{fit, screen_layout};
use crate::tui::views::{self, ViewError};
use crate::tui::widgets;

/// One interactive session: screen and input plus the state views share.
pub struct App {
    surface: TerminalSurface,
    keys: Box<dyn KeySource>,
    menu: MenuSystem,
    ctx: ViewContext,
    /// `[colors]` overrides from the config, reapplied on theme changes.
    color_overrides: BTreeMap<String, String>,
    /// False when nobody can answer a prompt; errors then skip the modal.
    interactive: bool,
}

impl App {
    /// Build an interactive app over `surface`, starting on the view already
    /// selected in `ctx`.
    pub fn new(
        surface: TerminalSurface,
        keys: Box<dyn KeySource>,
        ctx: ViewContext,
        color_overrides: BTreeMap<String, String>,
    ) -> Self {
        App {
            surface,
            keys,
            menu: MenuSystem::new(default_menus()),
            ctx,
            color_overrides,
            interactive: true,
        }
    }

    /// Never wait for a key. Store errors are logged and shown on the status
    /// line instead of a modal, for single-frame output to a pipe.
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Enter raw mode on the real terminal. Restored when the guard is released or dropped.
    pub fn initialize(&mut self) -> io::Result<TerminalGuard> {
        self.surface.initialize()
    }

    /// Carry out the configured start action before the first frame.
    pub fn start(&mut self, action: Action) -> io::Result<()> {
        info!(%action, "starting");
        let result = self.ctx.apply(action);
        self.report(result)
    }

    /// Run until the user exits or input is lost.
    pub fn run(&mut self) -> io::Result<()> {
        info!(view = self.ctx.current().slug(), "session start");
        while self.ctx.running {
            self.render().inspect_err(|e| error!(error = %e, "terminal write failed"))?;
            match self.keys.read_event() {
                Ok(InputEvent::Key(key)) => self.handle_key(key)?,
                Ok(InputEvent::Resize(w, h)) => {
                    debug!(w, h, "resize");
                    self.surface.apply_dimensions(Ok((w, h)));
                }
                Err(e) => {
                    warn!(error = %e, "input lost, ending session");
                    self.ctx.running = false;
                }
            }
        }
        info!("session end");
        Ok(())
    }

    /// Dispatch one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> io::Result<()> {
        self.ctx.status = None;
        let result = match self.global_key(&key) {
            Some(result) => result,
            None => (views::entry(self.ctx.current()).handle)(&mut self.ctx, key),
        };
        self.report(result)
    }

    /// Menu bar and global shortcuts. `None` when the key belongs to the view.
    fn global_key(&mut self, key: &KeyEvent) -> Option<Result<(), ViewError>> {
        if self.menu.is_open() || self.menu.is_activation_key(key) {
            return Some(match self.menu.handle_key(key) {
                Some(action) => self.ctx.apply(action),
                None => Ok(()),
            });
        }
        if is_ctrl(key, 'c') {
            info!("interrupted");
            self.ctx.running = false;
            return Some(Ok(()));
        }
        if is_ctrl(key, 'n') && self.ctx.current() != ViewId::QuickAdd {
            return Some(self.ctx.open(ViewId::QuickAdd));
        }
        if is_ctrl(key, 'q') {
            return Some(self.ctx.open(ViewId::ExitConfirm));
        }
        if key.code == KeyCode::F(1) {
            return Some(self.ctx.open(ViewId::Help));
        }
        None
    }

    /// Rejected input goes to the status line. A store failure blocks on a
    /// modal and then leaves the view; without a terminal it only leaves.
    fn report(&mut self, result: Result<(), ViewError>) -> io::Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(ViewError::Invalid(msg)) => {
                self.ctx.set_status(msg);
                Ok(())
            }
            Err(ViewError::Store(e)) => {
                error!(view = self.ctx.current().slug(), error = %e, "operation failed");
                if !self.interactive {
                    self.ctx.fall_back();
                    self.ctx.set_status(format!("Error: {}", e));
                    return Ok(());
                }
                widgets::modal(&mut self.surface, "Error", &e.to_string())?;
                if let Err(e) = self.keys.read_event() {
                    warn!(error = %e, "input lost while showing error");
                    self.ctx.running = false;
                }
                self.ctx.fall_back();
                if self.ctx.status.is_none() {
                    self.ctx.set_status("Last change was not saved");
                }
                Ok(())
            }
        }
    }

    /// Rebuild the style cache for `ctx.theme`, keeping the config overrides.
    fn apply_theme(&mut self) {
        self.ctx.theme_changed = false;
        match Theme::load(&self.ctx.theme, &self.color_overrides) {
            Ok(theme) => {
                info!(theme = %theme.name, "theme changed");
                self.surface.rebuild_styles(theme);
            }
            Err(e) => {
                warn!(error = %e, "theme not applied");
                self.ctx.set_status(format!("Theme not applied: {}", e));
            }
        }
    }

    /// Draw one complete frame. A failing view is replaced by an error line.
    pub fn render(&mut self) -> io::Result<()> {
        if self.ctx.theme_changed {
            self.apply_theme();
        }
        self.menu.set_enabled(Action::FocusClear, self.ctx.query.project.is_some());

        let view = self.ctx.current();
        let layout = screen_layout(self.surface.width(), self.surface.height());
        self.surface.begin_frame();
        self.surface.clear()?;

        if let Err(e) = (views::entry(view).draw)(&self.ctx, &mut self.surface, layout.body) {
            warn!(view = view.slug(), error = %e, "render failed");
            let line = format!("Render error: {}", e);
            self.surface.write_at_styled(layout.body.x + 1, layout.body.y, &line, token::ERROR, None)?;
        }

        let (text, fg) = match &self.ctx.status {
            Some(status) => (status.clone(), token::ACCENT),
            None => (self.status_summary(view), token::MUTED),
        };
        let line = fit(&format!(" {}", text), usize::from(layout.status.width));
        self.surface.write_at_styled(layout.status.x, layout.status.y, &line, fg, None)?;
        self.surface.draw_footer(view.hint())?;
        self.menu.render(&mut self.surface)?;
        self.surface.end_frame()
    }

    /// Default status line: view title and task counts.
    fn status_summary(&self, view: ViewId) -> String {
        let stats = &self.ctx.stats;
        let focus = match &self.ctx.query.project {
            Some(p) => format!("  focus: {}", p),
            None => String::new(),
        };
        format!(
            "{}  |  {} active  {} overdue  {} done{}",
            view.title(),
            stats.active,
            stats.overdue,
            stats.completed,
            focus
        )
    }
}
