//! Key input source for the interactive loop.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Blocking source of input events. An error ends the interactive session.
pub trait KeySource {
    fn read_event(&mut self) -> io::Result<InputEvent>;
}

/// Reads from the real terminal, waiting indefinitely.
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn read_event(&mut self) -> io::Result<InputEvent> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(InputEvent::Key(key)),
                Event::Resize(w, h) => return Ok(InputEvent::Resize(w, h)),
                _ => {}
            }
        }
    }
}

pub fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char(k) if k.eq_ignore_ascii_case(&c))
}

/// Character of an Alt+<char> press, lowercased.
pub fn alt_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

/// Plain character press (no Ctrl/Alt), as typed.
pub fn plain_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => Some(c),
        _ => None,
    }
}
