use chrono::{DateTime, Utc};
use std::fmt;

/// Severity of a [`LogEntry`]. Ordered so a configured threshold admits
/// itself and every more severe level; `Off` admits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Off => "OFF",
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        };
        write!(f, "{s}")
    }
}

/// A single diagnostic record: when it happened, how severe it is, which
/// module raised it, which BUFR envelope (if any) it concerns, and the
/// message text.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: DateTime<Utc>,
    pub level: LogLevel,
    pub module: String,
    pub bufr_id: Option<String>,
    pub message: String,
}

impl LogEntry {
    pub fn new(time: DateTime<Utc>, level: LogLevel, module: impl Into<String>, bufr_id: Option<String>, message: impl Into<String>) -> Self {
        LogEntry { time, level, module: module.into(), bufr_id, message: message.into() }
    }

    pub fn to_csv(&self, delimiter: char) -> String {
        let bufr_id = self.bufr_id.as_deref().unwrap_or("");
        format!(
            "{}{d}{}{d}{}{d}{}{d}{}",
            self.time.to_rfc3339(),
            self.level,
            self.module,
            bufr_id,
            self.message,
            d = delimiter,
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "time": self.time.to_rfc3339(),
            "level": self.level.to_string(),
            "module": self.module,
            "bufr_id": self.bufr_id,
            "message": self.message,
        })
    }
}

/// A bounded, in-memory, append-only diagnostic log. Entries below the
/// configured level are dropped at insertion time rather than filtered at
/// render time, so the buffer's occupancy reflects only entries a caller
/// actually wants to see.
///
/// When the buffer fills to `max_size - 1`, a synthetic `Fatal` "LogBuffer is
/// full" entry is appended and further `add` calls are silently dropped —
/// this mirrors the source's own behavior of making the overflow itself a
/// visible, permanent log line rather than truncating without a trace.
pub struct LogBuffer {
    entries: Vec<LogEntry>,
    max_size: usize,
    level: LogLevel,
    full_notice_emitted: bool,
}

impl LogBuffer {
    pub fn new(max_size: usize, level: LogLevel) -> Self {
        LogBuffer { entries: Vec::new(), max_size, level, full_notice_emitted: false }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Changes the active level. When `purge` is true, existing entries below
    /// the new level are dropped immediately.
    pub fn set_level(&mut self, level: LogLevel, purge: bool) {
        self.level = level;
        if purge {
            self.entries.retain(|e| e.level >= level);
        }
    }

    pub fn add(&mut self, time: DateTime<Utc>, level: LogLevel, module: impl Into<String>, bufr_id: Option<String>, message: impl Into<String>) {
        if level < self.level || self.level == LogLevel::Off {
            return;
        }
        if self.full_notice_emitted {
            return;
        }
        if self.max_size > 0 && self.entries.len() + 1 >= self.max_size {
            self.entries.push(LogEntry::new(time, LogLevel::Fatal, "LogBuffer", None, "LogBuffer is full"));
            self.full_notice_emitted = true;
            return;
        }
        self.entries.push(LogEntry::new(time, level, module, bufr_id, message));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_csv(&self, delimiter: char) -> String {
        self.entries.iter().map(|e| e.to_csv(delimiter)).collect::<Vec<_>>().join("\n")
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.entries.iter().map(|e| e.to_json()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn level_filters_at_insertion() {
        let mut buf = LogBuffer::new(100, LogLevel::Warn);
        buf.add(t(), LogLevel::Info, "test", None, "should be dropped");
        buf.add(t(), LogLevel::Error, "test", None, "should be kept");
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.entries()[0].message, "should be kept");
    }

    #[test]
    fn overflow_emits_synthetic_fatal_once() {
        let mut buf = LogBuffer::new(3, LogLevel::Trace);
        buf.add(t(), LogLevel::Info, "a", None, "one");
        buf.add(t(), LogLevel::Info, "a", None, "two");
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.entries().last().unwrap().level, LogLevel::Fatal);
        buf.add(t(), LogLevel::Info, "a", None, "dropped");
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn set_level_can_purge() {
        let mut buf = LogBuffer::new(100, LogLevel::Trace);
        buf.add(t(), LogLevel::Info, "a", None, "info");
        buf.add(t(), LogLevel::Error, "a", None, "error");
        buf.set_level(LogLevel::Error, true);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.entries()[0].message, "error");
    }

    #[test]
    fn csv_rendering_uses_configured_delimiter() {
        let mut buf = LogBuffer::new(100, LogLevel::Trace);
        buf.add(t(), LogLevel::Warn, "mod", Some("123".to_string()), "oops");
        let csv = buf.to_csv(';');
        assert!(csv.contains("WARN;mod;123;oops"));
    }
}
