//! One flush cycle's output record and its text-line encoding.

use std::fmt;

use chrono::{DateTime, Local};

/// Timestamp layout used at the start of every line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Drained metrics of a single flush, in output order.
#[derive(Debug, Clone)]
pub struct FlushRecord {
    pub timestamp: DateTime<Local>,
    pub entries: Vec<(String, String)>,
}

impl FlushRecord {
    pub fn new(timestamp: DateTime<Local>, entries: Vec<(String, String)>) -> Self {
        Self { timestamp, entries }
    }

    /// Formatted value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `[YYYY-MM-DD HH:MM:SS] "name" value ...` followed by a newline.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for FlushRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.timestamp.format(TIMESTAMP_FORMAT))?;
        for (name, value) in &self.entries {
            write!(f, " \"{name}\" {value}")?;
        }
        Ok(())
    }
}
