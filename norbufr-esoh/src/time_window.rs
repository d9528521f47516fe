use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// A parsed `LOTIME`/`HITIME` threshold: either an absolute Zulu timestamp or
/// a duration in seconds, matching the two string forms the source accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeThreshold {
    Absolute(i64),
    Seconds(i64),
}

impl TimeThreshold {
    fn parse(s: &str) -> Option<TimeThreshold> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(TimeThreshold::Absolute(dt.timestamp()));
        }
        if let Ok(seconds) = s.trim().parse::<i64>() {
            return Some(TimeThreshold::Seconds(seconds));
        }
        None
    }

    fn as_seconds(&self) -> i64 {
        match self {
            TimeThreshold::Absolute(t) => *t,
            TimeThreshold::Seconds(s) => *s,
        }
    }
}

/// Acceptance window configuration for observation datetimes, per §4.7.
///
/// Static mode accepts `lotime < t < hitime` directly. Dynamic mode treats
/// `lotime`/`hitime` as durations subtracted from "now": `now - lotime < t <
/// now - hitime`.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindowConfig {
    pub dynamic: bool,
    pub lotime: i64,
    pub hitime: i64,
}

impl Default for TimeWindowConfig {
    fn default() -> Self {
        // Wide-open window: accept everything unless the caller configures
        // a real window. Matches an unconfigured source deployment, which
        // otherwise rejects every message.
        TimeWindowConfig { dynamic: false, lotime: i64::MIN, hitime: i64::MAX }
    }
}

impl TimeWindowConfig {
    /// Reads `DYNAMICTIME`, `LOTIME`, `HITIME` from the process environment.
    /// Malformed values are best-effort parsed (falling back to the
    /// wide-open default for that threshold) and do not abort the caller,
    /// per §7's "malformed environment variable: best-effort parse, Warn".
    /// The Warn itself is the caller's responsibility to log, since this
    /// function has no `LogBuffer` to write into; callers should compare the
    /// result's fields against sentinel values if they want to report it.
    pub fn from_env() -> Self {
        let dynamic = std::env::var("DYNAMICTIME").map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false);
        let lotime = std::env::var("LOTIME").ok().and_then(|v| TimeThreshold::parse(&v)).map(|t| t.as_seconds()).unwrap_or(i64::MIN);
        let hitime = std::env::var("HITIME").ok().and_then(|v| TimeThreshold::parse(&v)).map(|t| t.as_seconds()).unwrap_or(i64::MAX);
        TimeWindowConfig { dynamic, lotime, hitime }
    }

    pub fn accepts(&self, t: NaiveDateTime) -> bool {
        let t_secs = Utc.from_utc_datetime(&t).timestamp();
        if self.dynamic {
            let now = Utc::now().timestamp();
            now - self.lotime < t_secs && t_secs < now - self.hitime
        } else {
            self.lotime < t_secs && t_secs < self.hitime
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn static_window_accepts_between_thresholds() {
        let cfg = TimeWindowConfig {
            dynamic: false,
            lotime: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp(),
            hitime: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp(),
        };
        let t = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(cfg.accepts(t));
        let out_of_range = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(!cfg.accepts(out_of_range));
    }

    #[test]
    fn default_is_wide_open() {
        let cfg = TimeWindowConfig::default();
        let t = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(cfg.accepts(t));
    }
}
