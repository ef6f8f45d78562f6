//! Desktop-shell boundary: open a file or URL with the OS default
//! handler, and reveal a file in the OS file browser.
//!
//! Both operations return a [`ShellOutcome`] and never propagate an
//! error across the boundary; a failure is a `success: false` outcome
//! with a message.

use std::path::Path;
use std::process::Command;

use serde::Serialize;
use tracing::{debug, warn};

/// Result of a shell operation, mirrored to the content view.
#[derive(Debug, Clone, Serialize)]
pub struct ShellOutcome {
    pub success: bool,
    pub message: String,
}

impl ShellOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Open a URL externally or an OS path via the platform's default
/// handler.
pub fn open_path(path_or_url: &str) -> ShellOutcome {
    debug!(target = %path_or_url, "opening via system handler");

    if path_or_url.trim().is_empty() {
        return ShellOutcome::failed("Nothing to open");
    }

    match spawn_opener(path_or_url) {
        Ok(()) => {
            if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
                ShellOutcome::ok("URL opened successfully")
            } else {
                ShellOutcome::ok("File opened successfully")
            }
        }
        Err(message) => {
            warn!(target = %path_or_url, %message, "open failed");
            ShellOutcome::failed(format!("Error opening file: {}", message))
        }
    }
}

/// Reveal a path in the OS file browser.
pub fn show_in_folder(path: &str) -> ShellOutcome {
    debug!(target = %path, "revealing in file browser");

    let parent = Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .filter(|p| !p.is_empty());

    let target = match parent {
        Some(dir) => dir,
        None => return ShellOutcome::failed(format!("No containing folder for: {}", path)),
    };

    match spawn_opener(&target) {
        Ok(()) => ShellOutcome::ok("File shown in folder"),
        Err(message) => {
            warn!(target = %path, %message, "reveal failed");
            ShellOutcome::failed(format!("Error showing file in folder: {}", message))
        }
    }
}

/// Launch the platform opener for a path or URL. Errors are returned as
/// strings so callers can fold them into a [`ShellOutcome`].
fn spawn_opener(target: &str) -> Result<(), String> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(target);
        c
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", target]);
        c
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(target);
        c
    };

    command.spawn().map(|_| ()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_target_fails_without_panicking() {
        let outcome = open_path("");
        assert!(!outcome.success);
        assert!(!outcome.message.is_empty());
    }

    #[test]
    fn test_rootless_path_has_no_folder() {
        let outcome = show_in_folder("/");
        assert!(!outcome.success);
    }

    #[test]
    fn test_outcome_serializes_with_expected_fields() {
        let json = serde_json::to_value(ShellOutcome::ok("done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
    }
}
