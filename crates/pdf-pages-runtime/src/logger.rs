use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// In-memory log collector; the host reads its status line from here
#[derive(Clone)]
pub struct AppLogger {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
    level: LevelFilter,
    echo: bool,
}

impl AppLogger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(max_entries))),
            max_entries,
            level: LevelFilter::Info,
            echo: false,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Also print every entry to stderr
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest_message(&self) -> Option<String> {
        self.lock().back().map(|entry| entry.message.clone())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: format!("{}", record.args()),
        };

        if self.echo {
            eprintln!(
                "{} {:<5} {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.level,
                entry.message
            );
        }

        let mut entries = self.lock();
        entries.push_back(entry);
        // Keep only the most recent entries
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }

    fn flush(&self) {}
}
