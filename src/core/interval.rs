use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Local, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Local>,

    /// Exclusive.
    pub end: DateTime<Local>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self { start, end }
    }

    /// One-hour interval starting at the specified timestamp.
    pub fn hour_from(start: DateTime<Local>) -> Self {
        Self::new(start, start + TimeDelta::hours(1))
    }

    pub const fn with_start(mut self, start: DateTime<Local>) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn duration(self) -> TimeDelta {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(self, other: DateTime<Local>) -> bool {
        (self.start <= other) && (other < self.end)
    }
}

/// Truncate the timestamp to the start of its local hour.
#[must_use]
pub fn start_of_hour(timestamp: DateTime<Local>) -> DateTime<Local> {
    timestamp
        .with_minute(0)
        .and_then(|timestamp| timestamp.with_second(0))
        .and_then(|timestamp| timestamp.with_nanosecond(0))
        .unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn truncates_to_hour() {
        let timestamp = Local.with_ymd_and_hms(2025, 6, 1, 14, 37, 12).unwrap();
        assert_eq!(start_of_hour(timestamp), Local.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap());
    }

    #[test]
    fn half_open() {
        let start = Local.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap();
        let interval = Interval::hour_from(start);
        assert!(interval.contains(start));
        assert!(!interval.contains(interval.end));
        assert_eq!(interval.duration(), TimeDelta::hours(1));
    }
}
