//! Optional `config.toml` settings.
//!
//! Every key has a default, so a missing file or a partial one is fine.
//! Command-line flags override whatever is read here.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::tui::action::Action;
use crate::tui::colors::Theme;
use crate::tui::style_cache::DEFAULT_CAPACITY;

pub const CONFIG_FILE: &str = "config.toml";
pub const DATA_FILE: &str = "tasks.json";
pub const LOG_FILE: &str = "taskdeck.log";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    pub theme: String,
    /// Action id run when the interface opens, e.g. `view:dashboard`.
    pub start: String,
    pub style_cache_capacity: usize,
    pub backup_count: usize,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Per-token colour overrides applied on top of the theme.
    pub colors: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: None,
            theme: "default".to_string(),
            start: "view:dashboard".to_string(),
            style_cache_capacity: DEFAULT_CAPACITY,
            backup_count: 3,
            log_level: "info".to_string(),
            log_file: None,
            colors: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Read `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Config::parse(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject theme names, colours and start actions that would only fail
    /// once the interface is up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Theme::load(&self.theme, &self.colors)?;
        self.start_action()?;
        Ok(())
    }

    pub fn start_action(&self) -> Result<Action, ConfigError> {
        self.start
            .parse()
            .map_err(|_| ConfigError::Action(self.start.clone()))
    }

    /// Data file, relative paths taken from the app directory.
    pub fn data_path(&self, app_dir: &Path) -> PathBuf {
        match &self.data_file {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => app_dir.join(p),
            None => app_dir.join(DATA_FILE),
        }
    }

    pub fn log_path(&self, app_dir: &Path) -> PathBuf {
        match &self.log_file {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => app_dir.join(p),
            None => app_dir.join(LOG_FILE),
        }
    }
}

/// `~/.taskdeck`, or `./.taskdeck` when there is no home directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".taskdeck")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::enums::ViewId;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.start_action().unwrap(), Action::Show(ViewId::Dashboard));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r##"
            theme = "ocean"
            start = "view:agenda"
            backup_count = 5

            [colors]
            accent = "#ffd700"
            "priority.high" = "light-red"
            "##,
        )
        .unwrap();
        assert_eq!(config.theme, "ocean");
        assert_eq!(config.backup_count, 5);
        assert_eq!(config.style_cache_capacity, DEFAULT_CAPACITY);
        assert_eq!(config.start_action().unwrap(), Action::Show(ViewId::Agenda));
        assert_eq!(config.colors.len(), 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(Config::parse("theme = \"neon\""), Err(ConfigError::Theme(_))));
        assert!(matches!(
            Config::parse("[colors]\naccent = \"not-a-colour\""),
            Err(ConfigError::Color { .. })
        ));
        assert!(matches!(Config::parse("start = \"view:nowhere\""), Err(ConfigError::Action(_))));
        assert!(matches!(Config::parse("backup_count = \"three\""), Err(ConfigError::Parse(_))));
        assert!(matches!(Config::parse("colour = 1"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_paths_relative_to_app_dir() {
        let dir = Path::new("/home/me/.taskdeck");
        let mut config = Config::default();
        assert_eq!(config.data_path(dir), dir.join("tasks.json"));
        assert_eq!(config.log_path(dir), dir.join("taskdeck.log"));

        config.data_file = Some(PathBuf::from("work.json"));
        assert_eq!(config.data_path(dir), dir.join("work.json"));
        config.data_file = Some(PathBuf::from("/tmp/other.json"));
        assert_eq!(config.data_path(dir), PathBuf::from("/tmp/other.json"));
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be read as a file.
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::Io { .. })));
    }
}
