//! Screen geometry helpers.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Regions of the full screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub menu_bar: Rect,
    pub body: Rect,
    pub status: Rect,
    pub footer: Rect,
}

pub fn screen_layout(width: u16, height: u16) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(Rect::new(0, 0, width, height));
    ScreenLayout {
        menu_bar: chunks[0],
        body: chunks[1],
        status: chunks[2],
        footer: chunks[3],
    }
}

/// A `width` x `height` rectangle centred in `r`, shrunk to fit.
pub fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    Rect::new(r.x + (r.width - w) / 2, r.y + (r.height - h) / 2, w, h)
}

/// First row to show so that `cursor` is visible in `rows` lines.
pub fn scroll_offset(cursor: usize, rows: usize) -> usize {
    if rows == 0 {
        0
    } else {
        (cursor + 1).saturating_sub(rows)
    }
}

/// Terminal columns taken by `text`.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` that fits in `width` columns.
///
/// A wide character that would straddle the limit is dropped rather than
/// split, so the result may be one column short.
pub fn clip(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (i, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            return &text[..i];
        }
        used += w;
    }
    text
}

/// Pad or truncate to exactly `width` terminal columns.
pub fn fit(text: &str, width: usize) -> String {
    let mut out = clip(text, width).to_string();
    let used = display_width(&out);
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_layout_rows() {
        let l = screen_layout(80, 24);
        assert_eq!(l.menu_bar, Rect::new(0, 0, 80, 1));
        assert_eq!(l.body, Rect::new(0, 1, 80, 21));
        assert_eq!(l.status.y, 22);
        assert_eq!(l.footer.y, 23);
    }

    #[test]
    fn test_centered_fixed_shrinks() {
        let r = Rect::new(0, 1, 20, 10);
        assert_eq!(centered_fixed(10, 4, r), Rect::new(5, 4, 10, 4));
        assert_eq!(centered_fixed(50, 50, r), r);
    }

    #[test]
    fn test_fit_and_scroll() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(scroll_offset(2, 5), 0);
        assert_eq!(scroll_offset(9, 5), 5);
    }

    #[test]
    fn test_fit_counts_wide_characters_as_two_columns() {
        assert_eq!(display_width("漢字"), 4);
        assert_eq!(fit("漢字", 6), "漢字  ");
        // Three columns only hold one ideograph; the gap is padded.
        assert_eq!(fit("漢字", 3), "漢 ");
        assert_eq!(display_width(&fit("日本語のタスク", 7)), 7);
        assert_eq!(clip("ab漢", 3), "ab");
        assert_eq!(clip("ab漢", 4), "ab漢");
    }
}
