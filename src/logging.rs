use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing_subscriber::EnvFilter;

use crate::paths;

/// Timestamp format for per-run log directories; sorts chronologically.
const RUN_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Log directories older than this many days are removed at startup.
const MAX_LOG_AGE_DAYS: i64 = 7;

/// Install the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise `--verbose` selects debug level.
pub fn init(verbose: bool) {
    let default = if verbose { "luminol=debug" } else { "luminol=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Create the timestamped log directory for this run. Failure is advisory:
/// the run proceeds without subprocess logs.
pub fn create_run_log_dir() -> Option<PathBuf> {
    let dir = paths::log_root().join(Local::now().format(RUN_DIR_FORMAT).to_string());
    match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            tracing::debug!(dir = %dir.display(), "using log directory");
            Some(dir)
        }
        Err(e) => {
            tracing::warn!("cannot create log directory {}: {e}", dir.display());
            None
        }
    }
}

/// Remove per-run log directories older than seven days. Advisory cleanup:
/// errors are logged and ignored.
pub fn clear_old_logs() {
    clear_old_logs_in(&paths::log_root(), MAX_LOG_AGE_DAYS);
}

fn clear_old_logs_in(root: &Path, max_age_days: i64) {
    let Ok(entries) = std::fs::read_dir(root) else {
        return;
    };
    let cutoff = chrono::Duration::days(max_age_days);
    let now = Local::now().naive_local();

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        // Directories not matching the run timestamp format are not ours.
        let Ok(stamp) = NaiveDateTime::parse_from_str(&name.to_string_lossy(), RUN_DIR_FORMAT)
        else {
            continue;
        };
        if now - stamp > cutoff {
            tracing::debug!(dir = %path.display(), "removing stale log directory");
            if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::warn!("cannot remove stale logs {}: {e}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("luminol-logging-tests").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn stale_directories_are_removed_and_fresh_kept() {
        let root = scratch("cleanup");
        let old = root.join("2020-01-01_10-00-00");
        let fresh = root.join(Local::now().format(RUN_DIR_FORMAT).to_string());
        std::fs::create_dir_all(&old).unwrap();
        std::fs::create_dir_all(&fresh).unwrap();

        clear_old_logs_in(&root, 7);

        assert!(!old.exists(), "stale directory should be gone");
        assert!(fresh.exists(), "fresh directory should survive");
    }

    #[test]
    fn non_timestamp_directories_are_ignored() {
        let root = scratch("foreign");
        let foreign = root.join("keep-me");
        std::fs::create_dir_all(&foreign).unwrap();

        clear_old_logs_in(&root, 7);

        assert!(foreign.exists(), "non-timestamped directories are not ours to delete");
    }

    #[test]
    fn missing_root_is_a_no_op() {
        let root = scratch("missing").join("never-created");
        clear_old_logs_in(&root, 7);
    }
}
