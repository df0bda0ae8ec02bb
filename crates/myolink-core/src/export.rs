//! Session export.
//!
//! A session is written as one UTF-8 text file named
//! `entropy_<epoch-ms>.txt`. Each line is one sample, `timestamp,value`,
//! in the order the log stores them (newest first). There is no header and
//! no trailing newline:
//!
//! ```text
//! 1771030203000,33
//! 1771030202000,22
//! 1771030201000,11
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::collector::SessionLog;
use crate::error::ExportError;

const FILE_PREFIX: &str = "entropy_";
const FILE_SUFFIX: &str = ".txt";

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    /// Number of samples written.
    pub count: usize,
}

impl std::fmt::Display for ExportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Saved {} values to:\n{}", self.count, self.path.display())
    }
}

/// Serialize a log to the export text format.
pub fn render_session(log: &SessionLog) -> String {
    log.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// File name for an export created at `epoch_ms`.
pub fn export_file_name(epoch_ms: u64) -> String {
    format!("{FILE_PREFIX}{epoch_ms}{FILE_SUFFIX}")
}

/// Write `log` to `dir/entropy_<now>.txt`.
///
/// An empty log still produces a (empty) file. The log itself is never
/// modified, whether or not the write succeeds.
pub fn save_to_file(log: &SessionLog, dir: &Path) -> Result<ExportReport, ExportError> {
    save_to_file_at(log, dir, crate::epoch_millis())
}

/// [`save_to_file`] with an explicit timestamp for the file name.
pub fn save_to_file_at(
    log: &SessionLog,
    dir: &Path,
    epoch_ms: u64,
) -> Result<ExportReport, ExportError> {
    let path = dir.join(export_file_name(epoch_ms));
    let result = fs::create_dir_all(dir).and_then(|()| fs::write(&path, render_session(log)));

    match result {
        Ok(()) => {
            info!("saved {} values to {}", log.len(), path.display());
            Ok(ExportReport {
                path,
                count: log.len(),
            })
        }
        Err(source) => {
            error!("save error: {source}");
            Err(ExportError::Io { path, source })
        }
    }
}

// ---------------------------------------------------------------------------
// Listing previous exports
// ---------------------------------------------------------------------------

/// One export file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Epoch millis parsed from the file name.
    pub created_ms: u64,
    /// Number of non-empty lines.
    pub samples: usize,
}

/// List `entropy_<epoch-ms>.txt` files in `dir`, newest first.
pub fn list_exports(dir: &Path) -> std::io::Result<Vec<ExportSummary>> {
    let mut exports = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(created_ms) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_export_name)
        else {
            continue;
        };
        let samples = fs::read_to_string(&path)?
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count();
        exports.push(ExportSummary {
            path,
            created_ms,
            samples,
        });
    }
    exports.sort_by(|a, b| b.created_ms.cmp(&a.created_ms));
    Ok(exports)
}

fn parse_export_name(name: &str) -> Option<u64> {
    name.strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::EntropySample;

    fn log_of(samples: &[(u64, f64)]) -> SessionLog {
        let mut log = SessionLog::new();
        for &(t, v) in samples {
            log.record(EntropySample::new(t, v));
        }
        log
    }

    #[test]
    fn file_name_format() {
        assert_eq!(export_file_name(1771030200123), "entropy_1771030200123.txt");
    }

    #[test]
    fn render_is_newest_first_without_trailing_newline() {
        let log = log_of(&[(1, 11.0), (2, 22.0), (3, 33.0)]);
        assert_eq!(render_session(&log), "3,33\n2,22\n1,11");
    }

    #[test]
    fn render_empty_log() {
        assert_eq!(render_session(&SessionLog::new()), "");
    }

    #[test]
    fn save_writes_file_and_reports_count() {
        let tmp = tempfile::tempdir().unwrap();
        let log = log_of(&[(100, 11.0), (200, 22.0), (300, 33.0)]);

        let report = save_to_file_at(&log, tmp.path(), 42).unwrap();
        assert_eq!(report.count, 3);
        assert_eq!(report.path, tmp.path().join("entropy_42.txt"));

        let content = fs::read_to_string(&report.path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["300,33", "200,22", "100,11"]);
        assert!(!content.ends_with('\n'));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn save_empty_log_writes_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let report = save_to_file(&SessionLog::new(), tmp.path()).unwrap();
        assert_eq!(report.count, 0);
        assert_eq!(fs::read_to_string(&report.path).unwrap(), "");
    }

    #[test]
    fn save_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Downloads");
        let report = save_to_file(&log_of(&[(1, 5.0)]), &dir).unwrap();
        assert!(report.path.starts_with(&dir));
        assert!(report.path.exists());
    }

    #[test]
    fn save_failure_is_reported_and_log_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        let blocker = tmp.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();

        let log = log_of(&[(1, 5.0)]);
        let err = save_to_file(&log, &blocker).unwrap_err();
        let ExportError::Io { path, .. } = err;
        assert!(path.starts_with(&blocker));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn report_display() {
        let report = ExportReport {
            path: PathBuf::from("/sdcard/Download/entropy_1.txt"),
            count: 3,
        };
        assert_eq!(
            report.to_string(),
            "Saved 3 values to:\n/sdcard/Download/entropy_1.txt"
        );
    }

    #[test]
    fn list_exports_newest_first_and_ignores_others() {
        let tmp = tempfile::tempdir().unwrap();
        save_to_file_at(&log_of(&[(1, 1.0)]), tmp.path(), 1000).unwrap();
        save_to_file_at(&log_of(&[(1, 1.0), (2, 2.0)]), tmp.path(), 2000).unwrap();
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        fs::write(tmp.path().join("entropy_abc.txt"), "1,1").unwrap();

        let found = list_exports(tmp.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].created_ms, 2000);
        assert_eq!(found[0].samples, 2);
        assert_eq!(found[1].created_ms, 1000);
        assert_eq!(found[1].samples, 1);
    }

    #[test]
    fn parse_export_name_cases() {
        assert_eq!(parse_export_name("entropy_123.txt"), Some(123));
        assert_eq!(parse_export_name("entropy_.txt"), None);
        assert_eq!(parse_export_name("entropy_123.csv"), None);
        assert_eq!(parse_export_name("session_123.txt"), None);
    }
}
