//! Style token to escape sequence cache.

use std::collections::HashMap;

use crossterm::style::{Color as TermColor, SetBackgroundColor, SetForegroundColor};
use crossterm::Command;
use tracing::trace;

use crate::tui::colors::Theme;

pub const DEFAULT_CAPACITY: usize = 256;

/// Resolves `(token, is_background)` pairs to SGR escape sequences.
///
/// Entries are created on first use and live until the cache is rebuilt.
/// Once `capacity` entries exist, further distinct pairs are computed on
/// every call instead of being stored; nothing is ever evicted.
pub struct StyleCache {
    theme: Theme,
    entries: HashMap<String, [Option<String>; 2]>,
    len: usize,
    capacity: usize,
    uncached: u64,
}

impl StyleCache {
    pub fn new(theme: Theme, capacity: usize) -> Self {
        StyleCache {
            theme,
            entries: HashMap::new(),
            len: 0,
            capacity,
            uncached: 0,
        }
    }

    pub fn resolve(&mut self, token: &str, background: bool) -> String {
        let slot = usize::from(background);
        if let Some(seq) = self.entries.get(token).and_then(|pair| pair[slot].as_ref()) {
            return seq.clone();
        }

        let seq = self.compute(token, background);
        if self.len < self.capacity {
            self.entries.entry(token.to_string()).or_default()[slot] = Some(seq.clone());
            self.len += 1;
        } else {
            self.uncached += 1;
            if self.uncached == 1 {
                trace!(token, capacity = self.capacity, "style cache full");
            }
        }
        seq
    }

    fn compute(&self, token: &str, background: bool) -> String {
        let (r, g, b) = self.theme.rgb(token, background);
        let color = TermColor::Rgb { r, g, b };
        let mut seq = String::new();
        // Writing into a String cannot fail.
        let _ = if background {
            SetBackgroundColor(color).write_ansi(&mut seq)
        } else {
            SetForegroundColor(color).write_ansi(&mut seq)
        };
        seq
    }

    /// Swap in a new theme, discarding every cached entry at once.
    pub fn rebuild(&mut self, theme: Theme) {
        *self = StyleCache::new(theme, self.capacity);
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resolutions served without caching because the cache was full.
    pub fn uncached(&self) -> u64 {
        self.uncached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::colors::token;

    #[test]
    fn test_resolve_is_idempotent() {
        let mut cache = StyleCache::new(Theme::default(), 8);
        let first = cache.resolve(token::ACCENT, false);
        let second = cache.resolve(token::ACCENT, false);
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_foreground_and_background_are_separate_entries() {
        let mut cache = StyleCache::new(Theme::default(), 8);
        let fg = cache.resolve(token::ACCENT, false);
        let bg = cache.resolve(token::ACCENT, true);
        assert!(fg.starts_with("\x1b[38;2;"));
        assert!(bg.starts_with("\x1b[48;2;"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_capacity_refuses_new_entries_without_eviction() {
        let mut cache = StyleCache::new(Theme::default(), 2);
        let text = cache.resolve(token::TEXT, false);
        cache.resolve(token::MUTED, false);
        let over = cache.resolve(token::ERROR, false);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.uncached(), 1);
        // Still correct when served uncached, and earlier entries survive.
        assert_eq!(cache.resolve(token::ERROR, false), over);
        assert_eq!(cache.uncached(), 2);
        assert_eq!(cache.resolve(token::TEXT, false), text);
        assert_eq!(cache.uncached(), 2);
    }

    #[test]
    fn test_rebuild_clears_and_uses_new_theme() {
        let mut cache = StyleCache::new(Theme::default(), 8);
        let before = cache.resolve(token::ACCENT, false);
        cache.rebuild(Theme::builtin("ocean").unwrap());
        assert!(cache.is_empty());
        assert_eq!(cache.theme().name, "ocean");
        assert_ne!(cache.resolve(token::ACCENT, false), before);
    }

    #[test]
    fn test_rgb_sequence_format() {
        let mut cache = StyleCache::new(Theme::default(), 8);
        // default accent is Cyan = (0, 205, 205)
        assert_eq!(cache.resolve(token::ACCENT, false), "\x1b[38;2;0;205;205m");
    }
}
