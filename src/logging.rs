//! File logging. The interface owns the terminal, so nothing is logged to
//! stdout or stderr while it runs.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` when set, otherwise `level`.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn build_subscriber(log_file: File, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer().with_writer(Arc::new(log_file)).with_ansi(false);

    tracing_subscriber::registry().with(fmt_layer).with(filter)
}

/// Install the global subscriber, appending to `path`.
pub fn init(path: &Path, level: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    build_subscriber(file, filter(level))
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_writes_plain_lines_at_level() {
        let log = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log.reopen().unwrap(), EnvFilter::new("info"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(action = "add task 6", "saved");
            tracing::debug!("hidden");
        });

        let contents = fs::read_to_string(log.path()).unwrap();
        assert!(contents.contains("INFO"));
        assert!(contents.contains("saved"));
        assert!(contents.contains("add task 6"));
        assert!(!contents.contains("hidden"));
        assert!(!contents.contains('\x1b'));
    }
}
