//! Working tree cleanup before a fresh packaging run.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{info, warn};

/// Log files written by the bundled services
pub const LOG_FILES: [&str; 3] = ["camunda.log", "connectors.log", "elasticsearch.log"];

/// Remove the version-tagged extraction directories and stale log files.
///
/// Missing targets are expected and silently skipped. Any other failure is
/// logged and ignored so that cleanup never aborts a packaging run.
pub fn clean(base_dir: &Path, camunda_version: &str, elasticsearch_version: &str) {
    for dir in [
        format!("elasticsearch-{elasticsearch_version}"),
        format!("camunda-zeebe-{camunda_version}"),
    ] {
        let path = base_dir.join(dir);
        match fs::remove_dir_all(&path) {
            Ok(()) => info!("Removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    let log_dir = base_dir.join("log");
    for log_file in LOG_FILES {
        let path = log_dir.join(log_file);
        if !path.exists() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => info!("Removed {}", path.display()),
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}
