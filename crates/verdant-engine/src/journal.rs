//! Durable journal of important garden events.
//!
//! Appends one line per important event or alert, flushed immediately, and
//! brackets each run with session banners. Write failures are logged and
//! never stop the simulation.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use verdant_sim::{Alert, AlertSink, EventSink, GardenEvent};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
struct JournalFile {
    path: PathBuf,
    file: File,
    lines: usize,
}

impl JournalFile {
    fn write_line(&mut self, line: &str) {
        let result = writeln!(self.file, "{line}").and_then(|()| self.file.flush());
        match result {
            Ok(()) => self.lines += 1,
            Err(e) => warn!("Failed to write journal {}: {e}", self.path.display()),
        }
    }
}

impl Drop for JournalFile {
    fn drop(&mut self) {
        let banner = format!(
            "=== Garden Simulation Ended at {} ===",
            Local::now().format(TIMESTAMP_FORMAT)
        );
        self.write_line(&banner);
    }
}

/// Append-only text journal.
///
/// Clones share one file, so the same journal can be registered as both an
/// event sink and an alert sink. The end banner is written when the last
/// clone is dropped.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
    inner: Arc<Mutex<JournalFile>>,
}

impl Journal {
    /// Opens (or creates) the journal and writes the session start banner.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut inner = JournalFile {
            path: path.clone(),
            file,
            lines: 0,
        };
        inner.write_line(&format!(
            "=== New Garden Simulation Started at {} ===",
            Local::now().format(TIMESTAMP_FORMAT)
        ));
        debug!("Journal opened at {}", path.display());
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// Journal file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines written this session, banners included.
    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.inner.lock().lines
    }

    fn write_line(&self, line: &str) {
        self.inner.lock().write_line(line);
    }
}

impl EventSink for Journal {
    fn record(&mut self, event: &GardenEvent) {
        if !event.is_important() {
            return;
        }
        let line = format!(
            "[{}] {} {}",
            event.timestamp.format(TIMESTAMP_FORMAT),
            event.category.icon(),
            event.message
        );
        self.write_line(&line);
    }

    fn flush(&mut self) {
        if let Err(e) = self.inner.lock().file.flush() {
            warn!("Failed to flush journal: {e}");
        }
    }
}

impl AlertSink for Journal {
    fn alert(&mut self, alert: &Alert) {
        let line = format!(
            "[{}] ALERT {}\n{}",
            Local::now().format(TIMESTAMP_FORMAT),
            alert.title,
            alert.body
        );
        self.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_sim::EventCategory;

    #[test]
    fn test_only_important_events_are_recorded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("garden_log.txt");
        {
            let mut journal = Journal::open(&path).expect("open");
            journal.record(&GardenEvent::ordinary(EventCategory::Day, "Day 2 begins"));
            journal.record(&GardenEvent::important(
                EventCategory::Death,
                "Apple 0 at (0, 0) has died",
            ));
            let mut alerts = journal.clone();
            alerts.alert(&Alert::new("Critical", "1 plants are dying"));
            drop(alerts);
            assert_eq!(journal.lines_written(), 3);
        }

        let contents = std::fs::read_to_string(&path).expect("read journal");
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].starts_with("=== New Garden Simulation Started at "));
        assert!(lines[1].ends_with("Apple 0 at (0, 0) has died"));
        assert!(!contents.contains("Day 2 begins"));
        assert!(contents.contains("ALERT Critical"));
        assert!(lines
            .last()
            .is_some_and(|l| l.starts_with("=== Garden Simulation Ended at ")));
    }

    #[test]
    fn test_sessions_append() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("journal.txt");
        drop(Journal::open(&path).expect("first session"));
        drop(Journal::open(&path).expect("second session"));

        let contents = std::fs::read_to_string(&path).expect("read journal");
        assert_eq!(contents.matches("Started at").count(), 2);
        assert_eq!(contents.matches("Ended at").count(), 2);
    }
}
