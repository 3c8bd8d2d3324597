//! Colour palettes for the terminal user interface.
//!
//! Views never name colours directly; they name a style token (see [`token`])
//! and the active [`Theme`] maps it to a colour. The style cache turns that
//! colour into an escape sequence.

use std::collections::BTreeMap;
use std::str::FromStr;

use ratatui::style::Color;

use crate::error::ConfigError;

/// Gold accent (medium priority, active menu hotkeys).
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Errors and destructive confirmations.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Style token names.
pub mod token {
    pub const TEXT: &str = "text";
    pub const BACKGROUND: &str = "background";
    pub const MUTED: &str = "muted";
    pub const ACCENT: &str = "accent";
    pub const BORDER: &str = "border";
    pub const TITLE: &str = "title";
    pub const SELECTED_FG: &str = "selected.fg";
    pub const SELECTED_BG: &str = "selected.bg";
    pub const MENU_FG: &str = "menu.fg";
    pub const MENU_BG: &str = "menu.bg";
    pub const MENU_HOTKEY: &str = "menu.hotkey";
    pub const MENU_ACTIVE_FG: &str = "menu.active.fg";
    pub const MENU_ACTIVE_BG: &str = "menu.active.bg";
    pub const MENU_DISABLED: &str = "menu.disabled";
    pub const FOOTER_FG: &str = "footer.fg";
    pub const FOOTER_BG: &str = "footer.bg";
    pub const ERROR: &str = "error";
    pub const WARNING: &str = "warning";
    pub const SUCCESS: &str = "success";
    pub const PRIORITY_HIGH: &str = "priority.high";
    pub const PRIORITY_MEDIUM: &str = "priority.medium";
    pub const PRIORITY_LOW: &str = "priority.low";
    pub const OVERDUE: &str = "overdue";
    pub const DUE_TODAY: &str = "due.today";
    pub const PROJECT: &str = "project";
    pub const MODAL_BG: &str = "modal.bg";
}

/// Built-in theme names, in the order the theme picker lists them.
pub const THEME_NAMES: [&str; 3] = ["default", "ocean", "mono"];

/// A named mapping from style tokens to colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    colors: BTreeMap<String, Color>,
}

impl Theme {
    pub fn builtin(name: &str) -> Option<Theme> {
        let entries: Vec<(&str, Color)> = match name {
            "default" => vec![
                (token::TEXT, Color::Rgb(220, 220, 220)),
                (token::BACKGROUND, Color::Rgb(18, 18, 24)),
                (token::MUTED, Color::Rgb(120, 120, 130)),
                (token::ACCENT, Color::Cyan),
                (token::BORDER, Color::Rgb(90, 90, 110)),
                (token::TITLE, Color::White),
                (token::SELECTED_FG, Color::Black),
                (token::SELECTED_BG, Color::Gray),
                (token::MENU_FG, Color::Black),
                (token::MENU_BG, Color::Rgb(170, 170, 170)),
                (token::MENU_HOTKEY, DARK_RED),
                (token::MENU_ACTIVE_FG, Color::White),
                (token::MENU_ACTIVE_BG, Color::Blue),
                (token::MENU_DISABLED, Color::DarkGray),
                (token::FOOTER_FG, Color::White),
                (token::FOOTER_BG, Color::Blue),
                (token::ERROR, Color::LightRed),
                (token::WARNING, Color::Yellow),
                (token::SUCCESS, Color::LightGreen),
                (token::PRIORITY_HIGH, Color::LightRed),
                (token::PRIORITY_MEDIUM, GOLD),
                (token::PRIORITY_LOW, Color::Rgb(120, 170, 120)),
                (token::OVERDUE, Color::Red),
                (token::DUE_TODAY, Color::Yellow),
                (token::PROJECT, Color::Rgb(190, 140, 210)),
                (token::MODAL_BG, DARK_RED),
            ],
            "ocean" => vec![
                (token::TEXT, Color::Rgb(200, 225, 240)),
                (token::BACKGROUND, Color::Rgb(8, 24, 40)),
                (token::MUTED, Color::Rgb(90, 120, 140)),
                (token::ACCENT, Color::Rgb(80, 200, 220)),
                (token::BORDER, Color::Rgb(40, 90, 120)),
                (token::TITLE, Color::Rgb(150, 220, 255)),
                (token::SELECTED_FG, Color::Rgb(8, 24, 40)),
                (token::SELECTED_BG, Color::Rgb(80, 200, 220)),
                (token::MENU_FG, Color::Rgb(200, 225, 240)),
                (token::MENU_BG, Color::Rgb(20, 60, 90)),
                (token::MENU_HOTKEY, GOLD),
                (token::MENU_ACTIVE_FG, Color::Rgb(8, 24, 40)),
                (token::MENU_ACTIVE_BG, Color::Rgb(80, 200, 220)),
                (token::MENU_DISABLED, Color::Rgb(70, 95, 110)),
                (token::FOOTER_FG, Color::Rgb(200, 225, 240)),
                (token::FOOTER_BG, Color::Rgb(20, 60, 90)),
                (token::ERROR, Color::Rgb(255, 110, 110)),
                (token::WARNING, GOLD),
                (token::SUCCESS, Color::Rgb(110, 220, 160)),
                (token::PRIORITY_HIGH, Color::Rgb(255, 110, 110)),
                (token::PRIORITY_MEDIUM, GOLD),
                (token::PRIORITY_LOW, Color::Rgb(110, 220, 160)),
                (token::OVERDUE, Color::Rgb(255, 80, 80)),
                (token::DUE_TODAY, GOLD),
                (token::PROJECT, Color::Rgb(150, 180, 255)),
                (token::MODAL_BG, Color::Rgb(20, 60, 90)),
            ],
            "mono" => vec![
                (token::TEXT, Color::Gray),
                (token::BACKGROUND, Color::Black),
                (token::MUTED, Color::DarkGray),
                (token::ACCENT, Color::White),
                (token::BORDER, Color::DarkGray),
                (token::TITLE, Color::White),
                (token::SELECTED_FG, Color::Black),
                (token::SELECTED_BG, Color::White),
                (token::MENU_FG, Color::Black),
                (token::MENU_BG, Color::Gray),
                (token::MENU_HOTKEY, Color::White),
                (token::MENU_ACTIVE_FG, Color::Black),
                (token::MENU_ACTIVE_BG, Color::White),
                (token::MENU_DISABLED, Color::DarkGray),
                (token::FOOTER_FG, Color::Black),
                (token::FOOTER_BG, Color::Gray),
                (token::ERROR, Color::White),
                (token::WARNING, Color::White),
                (token::SUCCESS, Color::Gray),
                (token::PRIORITY_HIGH, Color::White),
                (token::PRIORITY_MEDIUM, Color::Gray),
                (token::PRIORITY_LOW, Color::DarkGray),
                (token::OVERDUE, Color::White),
                (token::DUE_TODAY, Color::White),
                (token::PROJECT, Color::Gray),
                (token::MODAL_BG, Color::DarkGray),
            ],
            _ => return None,
        };
        Some(Theme {
            name: name.to_string(),
            colors: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        })
    }

    /// Built-in theme with config overrides applied on top.
    pub fn load(name: &str, overrides: &BTreeMap<String, String>) -> Result<Theme, ConfigError> {
        let mut theme = Theme::builtin(name).ok_or_else(|| ConfigError::Theme(name.to_string()))?;
        for (token, value) in overrides {
            let color = Color::from_str(value.trim()).map_err(|_| ConfigError::Color {
                token: token.clone(),
                value: value.clone(),
            })?;
            theme.colors.insert(token.clone(), color);
        }
        Ok(theme)
    }

    pub fn lookup(&self, token: &str) -> Option<Color> {
        self.colors.get(token).copied()
    }

    /// RGB for a token. Unknown tokens fall back to the text or background colour.
    pub fn rgb(&self, token: &str, background: bool) -> (u8, u8, u8) {
        let fallback = if background { token::BACKGROUND } else { token::TEXT };
        let color = self
            .lookup(token)
            .or_else(|| self.lookup(fallback))
            .unwrap_or(if background { Color::Black } else { Color::White });
        color_to_rgb(color)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::builtin("default").unwrap_or(Theme {
            name: "default".to_string(),
            colors: BTreeMap::new(),
        })
    }
}

/// Resolve any palette colour to an RGB triple using xterm's standard values.
pub fn color_to_rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Indexed(i) => indexed_to_rgb(i),
        Color::Reset | Color::Black => (0, 0, 0),
        Color::Red => (205, 0, 0),
        Color::Green => (0, 205, 0),
        Color::Yellow => (205, 205, 0),
        Color::Blue => (0, 0, 238),
        Color::Magenta => (205, 0, 205),
        Color::Cyan => (0, 205, 205),
        Color::Gray => (229, 229, 229),
        Color::DarkGray => (127, 127, 127),
        Color::LightRed => (255, 0, 0),
        Color::LightGreen => (0, 255, 0),
        Color::LightYellow => (255, 255, 0),
        Color::LightBlue => (92, 92, 255),
        Color::LightMagenta => (255, 0, 255),
        Color::LightCyan => (0, 255, 255),
        Color::White => (255, 255, 255),
    }
}

fn indexed_to_rgb(i: u8) -> (u8, u8, u8) {
    const BASE: [Color; 16] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::Gray,
        Color::DarkGray,
        Color::LightRed,
        Color::LightGreen,
        Color::LightYellow,
        Color::LightBlue,
        Color::LightMagenta,
        Color::LightCyan,
        Color::White,
    ];
    match i {
        0..=15 => color_to_rgb(BASE[i as usize]),
        16..=231 => {
            let n = i - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (level(n / 36), level((n / 6) % 6), level(n % 6))
        }
        _ => {
            let v = 8 + (i - 232) * 10;
            (v, v, v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_theme_defines_every_token() {
        let default = Theme::default();
        for name in THEME_NAMES {
            let theme = Theme::builtin(name).unwrap();
            for key in default.colors.keys() {
                assert!(theme.lookup(key).is_some(), "{} missing {}", name, key);
            }
        }
    }

    #[test]
    fn test_overrides_parse_names_hex_and_indices() {
        let mut overrides = BTreeMap::new();
        overrides.insert("accent".to_string(), "#ffd700".to_string());
        overrides.insert("muted".to_string(), "8".to_string());
        let theme = Theme::load("default", &overrides).unwrap();
        assert_eq!(theme.rgb("accent", false), (255, 215, 0));
        assert_eq!(theme.rgb("muted", false), (127, 127, 127));
    }

    #[test]
    fn test_bad_override_and_unknown_theme_are_errors() {
        let mut overrides = BTreeMap::new();
        overrides.insert("accent".to_string(), "not-a-colour".to_string());
        assert!(matches!(Theme::load("default", &overrides), Err(ConfigError::Color { .. })));
        assert!(matches!(Theme::load("neon", &BTreeMap::new()), Err(ConfigError::Theme(_))));
    }

    #[test]
    fn test_unknown_token_falls_back() {
        let theme = Theme::default();
        assert_eq!(theme.rgb("no.such.token", false), theme.rgb(token::TEXT, false));
        assert_eq!(theme.rgb("no.such.token", true), theme.rgb(token::BACKGROUND, true));
    }

    #[test]
    fn test_indexed_cube_and_grays() {
        assert_eq!(indexed_to_rgb(16), (0, 0, 0));
        assert_eq!(indexed_to_rgb(231), (255, 255, 255));
        assert_eq!(indexed_to_rgb(232), (8, 8, 8));
    }
}
