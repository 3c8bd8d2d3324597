//! Character-grid drawing surface with an explicit buffered-frame mode.
//!
//! Outside a frame every primitive is written and flushed immediately
//! ("direct mode", used by blocking dialogs). Between [`TerminalSurface::begin_frame`]
//! and [`TerminalSurface::end_frame`] primitives are appended to an in-memory
//! buffer, each prefixed with a cursor move, and `end_frame` hands the whole
//! buffer to the terminal in a single write.
//!
//! All primitives clip silently: an origin outside the surface, or a box that
//! does not fit, draws nothing. Dimension reads can be stale during a resize,
//! so none of this is treated as an error.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::ResetColor;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, Command};
use tracing::{debug, trace};

use crate::tui::colors::{token, Theme};
use crate::tui::style_cache::StyleCache;
use crate::tui::utils::clip;

pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// Writes accumulated between `begin_frame` and `end_frame`.
#[derive(Default)]
struct Frame {
    buffer: String,
    /// Origins written this frame. Kept for diagnostics; flushes are always full.
    dirty: Vec<(u16, u16)>,
}

/// Fixed-size grid over any writer. Width and height are in terminal columns
/// and rows; text is clipped by display width, not by characters.
pub struct TerminalSurface {
    out: Box<dyn Write>,
    width: u16,
    height: u16,
    styles: StyleCache,
    frame: Option<Frame>,
}

fn ansi(command: impl Command) -> String {
    let mut s = String::new();
    let _ = command.write_ansi(&mut s);
    s
}

impl TerminalSurface {
    /// An 80x24 surface in direct mode. Call [`Self::initialize`] or
    /// [`Self::apply_dimensions`] to size it.
    pub fn new(out: Box<dyn Write>, styles: StyleCache) -> Self {
        TerminalSurface {
            out,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            styles,
            frame: None,
        }
    }

    /// Enter raw mode on the real terminal and size the surface to it.
    /// The returned guard restores the terminal when released or dropped.
    pub fn initialize(&mut self) -> io::Result<TerminalGuard> {
        let guard = TerminalGuard::enter()?;
        self.update_dimensions();
        self.clear()?;
        Ok(guard)
    }

    /// Re-read the terminal size. Never fails; falls back to 80x24.
    pub fn update_dimensions(&mut self) {
        self.apply_dimensions(terminal::size());
    }

    /// Adopt a size reading. Zero or failed readings fall back to 80x24.
    pub fn apply_dimensions(&mut self, size: io::Result<(u16, u16)>) {
        match size {
            Ok((w, h)) if w > 0 && h > 0 => {
                self.width = w;
                self.height = h;
            }
            Ok((w, h)) => {
                debug!(w, h, "terminal reported empty size, using default");
                self.width = DEFAULT_WIDTH;
                self.height = DEFAULT_HEIGHT;
            }
            Err(e) => {
                debug!(error = %e, "terminal size query failed, using default");
                self.width = DEFAULT_WIDTH;
                self.height = DEFAULT_HEIGHT;
            }
        }
    }

    /// Columns available for drawing.
    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Token-to-escape cache for the active theme.
    pub fn styles(&self) -> &StyleCache {
        &self.styles
    }

    /// Swap in a new theme; cached escapes are discarded.
    pub fn rebuild_styles(&mut self, theme: Theme) {
        self.styles.rebuild(theme);
    }

    /// Start buffering. Anything left from an unfinished frame is dropped.
    pub fn begin_frame(&mut self) {
        if let Some(stale) = self.frame.take() {
            trace!(bytes = stale.buffer.len(), "discarding unflushed frame");
        }
        self.frame = Some(Frame::default());
    }

    /// Flush the buffered frame with one write. Outside a frame this does nothing.
    pub fn end_frame(&mut self) -> io::Result<()> {
        let Some(frame) = self.frame.take() else {
            return Ok(());
        };
        trace!(bytes = frame.buffer.len(), writes = frame.dirty.len(), "flushing frame");
        self.out.write_all(frame.buffer.as_bytes())?;
        self.out.flush()
    }

    fn emit(&mut self, seq: &str) -> io::Result<()> {
        match self.frame.as_mut() {
            Some(frame) => {
                frame.buffer.push_str(seq);
                Ok(())
            }
            None => {
                self.out.write_all(seq.as_bytes())?;
                self.out.flush()
            }
        }
    }

    /// Paint the whole screen in the background colour and home the cursor.
    pub fn clear(&mut self) -> io::Result<()> {
        let bg = self.styles.resolve(token::BACKGROUND, true);
        let seq = format!(
            "{}{}{}{}{}",
            ansi(ResetColor),
            bg,
            ansi(Clear(ClearType::All)),
            ansi(ResetColor),
            ansi(MoveTo(0, 0))
        );
        self.emit(&seq)
    }

    /// Write unstyled `text` at (`x`, `y`), cut at the right edge. Control
    /// characters are shown as spaces.
    pub fn write_at(&mut self, x: u16, y: u16, text: &str) -> io::Result<()> {
        self.put(x, y, text, None, None)
    }

    /// Write `text` using the `fg` token and, when given, the `bg` token.
    /// The colours are reset after the text.
    pub fn write_at_styled(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: &str,
        bg: Option<&str>,
    ) -> io::Result<()> {
        self.put(x, y, text, Some(fg), bg)
    }

    fn put(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Option<&str>,
        bg: Option<&str>,
    ) -> io::Result<()> {
        if x >= self.width || y >= self.height {
            return Ok(());
        }
        let available = usize::from(self.width - x);
        let sanitized: String = text
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let visible = clip(&sanitized, available);
        if visible.is_empty() {
            return Ok(());
        }

        let mut seq = ansi(MoveTo(x, y));
        let styled = fg.is_some() || bg.is_some();
        if let Some(fg) = fg {
            seq.push_str(&self.styles.resolve(fg, false));
        }
        if let Some(bg) = bg {
            seq.push_str(&self.styles.resolve(bg, true));
        }
        seq.push_str(visible);
        if styled {
            seq.push_str(&ansi(ResetColor));
        }

        if let Some(frame) = self.frame.as_mut() {
            frame.dirty.push((x, y));
        }
        self.emit(&seq)
    }

    /// Fill a rectangle with `ch`, clipped to the surface.
    pub fn fill_area(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char) -> io::Result<()> {
        self.fill(x, y, w, h, ch, None)
    }

    /// Fill a rectangle with `ch` on the `bg` token colour, clipped to the surface.
    pub fn fill_area_styled(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        ch: char,
        bg: &str,
    ) -> io::Result<()> {
        self.fill(x, y, w, h, ch, Some(bg))
    }

    fn fill(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, bg: Option<&str>) -> io::Result<()> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let row: String = std::iter::repeat(ch).take(usize::from(w)).collect();
        let bottom = y.saturating_add(h).min(self.height);
        for row_y in y..bottom {
            match bg {
                Some(bg) => self.put(x, row_y, &row, Some(token::TEXT), Some(bg))?,
                None => self.put(x, row_y, &row, None, None)?,
            }
        }
        Ok(())
    }

    fn fits(&self, x: u16, y: u16, w: u16, h: u16) -> bool {
        w >= 2
            && h >= 2
            && u32::from(x) + u32::from(w) <= u32::from(self.width)
            && u32::from(y) + u32::from(h) <= u32::from(self.height)
    }

    /// Single-line border. A box that does not fit entirely draws nothing.
    pub fn draw_box(&mut self, x: u16, y: u16, w: u16, h: u16) -> io::Result<()> {
        self.draw_box_styled(x, y, w, h, token::BORDER, None)
    }

    fn draw_box_styled(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        fg: &str,
        bg: Option<&str>,
    ) -> io::Result<()> {
        if !self.fits(x, y, w, h) {
            return Ok(());
        }
        let inner = usize::from(w - 2);
        let horizontal = "─".repeat(inner);
        self.put(x, y, &format!("┌{}┐", horizontal), Some(fg), bg)?;
        for row in y + 1..y + h - 1 {
            self.put(x, row, "│", Some(fg), bg)?;
            self.put(x + w - 1, row, "│", Some(fg), bg)?;
        }
        self.put(x, y + h - 1, &format!("└{}┘", horizontal), Some(fg), bg)
    }

    /// Box with its interior cleared to the `bg` token colour.
    pub fn draw_filled_box(&mut self, x: u16, y: u16, w: u16, h: u16, bg: &str) -> io::Result<()> {
        if !self.fits(x, y, w, h) {
            return Ok(());
        }
        self.fill(x + 1, y + 1, w - 2, h - 2, ' ', Some(bg))?;
        self.draw_box_styled(x, y, w, h, token::BORDER, Some(bg))
    }

    /// `w` columns of `─` in the border colour.
    pub fn draw_horizontal_line(&mut self, x: u16, y: u16, w: u16) -> io::Result<()> {
        if w == 0 {
            return Ok(());
        }
        self.put(x, y, &"─".repeat(usize::from(w)), Some(token::BORDER), None)
    }

    /// Full-width status line on the last row.
    pub fn draw_footer(&mut self, text: &str) -> io::Result<()> {
        let y = self.height.saturating_sub(1);
        let line = format!(" {:<width$}", text, width = usize::from(self.width));
        self.put(0, y, &line, Some(token::FOOTER_FG), Some(token::FOOTER_BG))
    }
}

/// Raw mode, alternate screen and hidden cursor for as long as it lives.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// Enable raw mode and switch to the alternate screen.
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        // From here on Drop restores the terminal, even if the next call fails.
        let guard = TerminalGuard { active: true };
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn release(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let screen = execute!(io::stdout(), ResetColor, Show, LeaveAlternateScreen);
        terminal::disable_raw_mode()?;
        screen
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::testing::{row_text, SharedBuffer};

    fn surface(w: u16, h: u16) -> (TerminalSurface, SharedBuffer) {
        let buf = SharedBuffer::default();
        let mut s = TerminalSurface::new(
            Box::new(buf.clone()),
            StyleCache::new(Theme::default(), 64),
        );
        s.apply_dimensions(Ok((w, h)));
        (s, buf)
    }

    fn screen(buf: &SharedBuffer, w: u16, h: u16) -> vt100::Parser {
        let mut parser = vt100::Parser::new(h, w, 0);
        parser.process(&buf.contents());
        parser
    }

    #[test]
    fn test_write_truncates_to_remaining_width() {
        let (mut s, buf) = surface(10, 3);
        s.write_at(6, 1, "abcdefgh").unwrap();
        let parser = screen(&buf, 10, 3);
        assert_eq!(row_text(&parser, 1), "      abcd");
        // Nothing wrapped onto the next row.
        assert_eq!(row_text(&parser, 2), "");
    }

    #[test]
    fn test_wide_text_is_clipped_by_columns() {
        let (mut s, buf) = surface(10, 3);
        s.write_at(6, 0, "漢字漢字").unwrap();
        // Only the first ideograph fits in three columns.
        s.write_at(7, 1, "漢字").unwrap();
        let parser = screen(&buf, 10, 3);
        assert_eq!(row_text(&parser, 0), "      漢字");
        assert_eq!(row_text(&parser, 1), "       漢");
        assert_eq!(row_text(&parser, 2), "");
    }

    #[test]
    fn test_off_surface_writes_are_noops() {
        let (mut s, buf) = surface(10, 3);
        s.write_at(10, 0, "x").unwrap();
        s.write_at(0, 3, "x").unwrap();
        s.write_at_styled(50, 50, "x", token::ACCENT, None).unwrap();
        assert!(buf.contents().is_empty());
    }

    #[test]
    fn test_control_characters_cannot_move_the_cursor() {
        let (mut s, buf) = surface(10, 3);
        s.write_at(0, 0, "a\nb\rc").unwrap();
        let parser = screen(&buf, 10, 3);
        assert_eq!(row_text(&parser, 0), "a b c");
        assert_eq!(row_text(&parser, 1), "");
    }

    #[test]
    fn test_frame_is_flushed_in_one_write() {
        let (mut s, buf) = surface(20, 5);
        s.begin_frame();
        s.write_at(0, 0, "top").unwrap();
        s.write_at_styled(5, 2, "mid", token::ACCENT, Some(token::BACKGROUND)).unwrap();
        s.draw_footer("footer").unwrap();
        assert!(buf.contents().is_empty());
        assert_eq!(buf.writes(), 0);

        s.end_frame().unwrap();
        assert_eq!(buf.writes(), 1);
        let parser = screen(&buf, 20, 5);
        assert_eq!(parser.screen().cell(0, 0).unwrap().contents(), "t");
        assert_eq!(parser.screen().cell(2, 5).unwrap().contents(), "m");
        assert!(row_text(&parser, 4).starts_with(" footer"));
    }

    #[test]
    fn test_begin_frame_discards_unflushed_writes() {
        let (mut s, buf) = surface(20, 5);
        s.begin_frame();
        s.write_at(0, 0, "stale").unwrap();
        s.begin_frame();
        s.write_at(0, 1, "fresh").unwrap();
        s.end_frame().unwrap();
        let text = String::from_utf8(buf.contents()).unwrap();
        assert!(!text.contains("stale"));
        assert!(text.contains("fresh"));
    }

    #[test]
    fn test_styled_write_resets_colours() {
        let (mut s, buf) = surface(20, 5);
        s.write_at_styled(0, 0, "x", token::ERROR, Some(token::MODAL_BG)).unwrap();
        let text = String::from_utf8(buf.contents()).unwrap();
        assert!(text.ends_with(&ansi(ResetColor)));
        let mut parser = screen(&buf, 20, 5);
        assert!(matches!(parser.screen().cell(0, 0).unwrap().fgcolor(), vt100::Color::Rgb(..)));
        // Text after the styled run uses default colours.
        parser.process(b"y");
        assert_eq!(parser.screen().cell(0, 1).unwrap().fgcolor(), vt100::Color::Default);
    }

    #[test]
    fn test_box_that_does_not_fit_is_noop() {
        let (mut s, buf) = surface(10, 5);
        s.draw_box(5, 0, 6, 3).unwrap();
        s.draw_box(0, 3, 4, 3).unwrap();
        s.draw_filled_box(0, 0, 1, 1, token::MODAL_BG).unwrap();
        assert!(buf.contents().is_empty());

        s.draw_box(0, 0, 10, 5).unwrap();
        let parser = screen(&buf, 10, 5);
        assert_eq!(row_text(&parser, 0), "┌────────┐");
        assert_eq!(row_text(&parser, 2), "│        │");
        assert_eq!(row_text(&parser, 4), "└────────┘");
    }

    #[test]
    fn test_fill_area_is_clipped() {
        let (mut s, buf) = surface(6, 3);
        s.fill_area(4, 1, 10, 10, '#').unwrap();
        let parser = screen(&buf, 6, 3);
        assert_eq!(row_text(&parser, 0), "");
        assert_eq!(row_text(&parser, 1), "    ##");
        assert_eq!(row_text(&parser, 2), "    ##");
    }

    #[test]
    fn test_bad_size_reading_falls_back_to_default() {
        let (mut s, _) = surface(120, 40);
        assert_eq!((s.width(), s.height()), (120, 40));
        s.apply_dimensions(Err(io::Error::new(io::ErrorKind::Other, "not a tty")));
        assert_eq!((s.width(), s.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        s.apply_dimensions(Ok((0, 0)));
        assert_eq!((s.width(), s.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    }

    #[test]
    fn test_end_frame_outside_frame_is_noop() {
        let (mut s, buf) = surface(10, 3);
        s.end_frame().unwrap();
        assert_eq!(buf.writes(), 0);
    }
}
