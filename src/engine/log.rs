// Append-only debug log of launched commands

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEBUG_LOG_NAME: &str = "av1wrap.log";

/// Append a timestamped line to av1wrap.log inside `dir`, creating it if needed
pub fn write_debug_log(dir: &Path, message: &str) -> Result<PathBuf> {
    let log_path = dir.join(DEBUG_LOG_NAME);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open debug log: {}", log_path.display()))?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "[{}] {}", timestamp, message)?;
    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_lines() {
        let dir = TempDir::new().unwrap();
        write_debug_log(dir.path(), "first").unwrap();
        let path = write_debug_log(dir.path(), "second").unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] second"));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(write_debug_log(&dir.path().join("nope"), "x").is_err());
    }
}
