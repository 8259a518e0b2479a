//! Rolling room log.

use std::collections::VecDeque;

use crate::domain::Timestamp;

/// Number of entries kept.
pub const LOG_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: Timestamp,
    pub content: String,
}

/// Keeps the latest [`LOG_CAPACITY`] lines. Ids keep increasing across
/// evictions.
#[derive(Debug, Default)]
pub struct RollingLog {
    entries: VecDeque<LogEntry>,
    next_id: u64,
}

impl RollingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` one line per entry and return the appended entries
    /// that are still retained.
    pub fn append(&mut self, text: &str, timestamp: Timestamp) -> Vec<LogEntry> {
        let mut appended = 0;
        for line in text.split('\n') {
            if self.entries.len() == LOG_CAPACITY {
                self.entries.pop_front();
            }
            self.entries.push_back(LogEntry {
                id: self.next_id,
                timestamp,
                content: line.to_string(),
            });
            self.next_id += 1;
            appended += 1;
        }
        let retained = appended.min(self.entries.len());
        self.entries
            .iter()
            .skip(self.entries.len() - retained)
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
