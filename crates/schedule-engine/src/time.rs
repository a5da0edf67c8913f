//! Wall-clock times and intervals.
//!
//! Provides the `HH:MM` time-of-day type and the half-open interval logic
//! everything else is built on. A [`TimeOfDay`] never carries a date or a
//! timezone — slots pair one with a calendar date, and all comparisons
//! reduce to minute offsets from midnight.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ScheduleError};

/// A wall-clock time with minute precision, parsed and displayed as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Construct from hour and minute components.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Format`] if `hour > 23` or `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::Format(format!(
                "time out of range: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Const constructor for compile-time-known values (operating window bounds).
    pub(crate) const fn from_hm_unchecked(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight. Total-ordering proxy for comparisons and
    /// slot-carving arithmetic.
    pub fn total_minutes(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Inverse of [`total_minutes`](Self::total_minutes).
    ///
    /// Returns `None` for offsets past 23:59.
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes >= 24 * 60 {
            return None;
        }
        Some(Self {
            hour: (minutes / 60) as u8,
            minute: (minutes % 60) as u8,
        })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    /// Parse a strict `HH:MM` string (two digits, two digits).
    fn from_str(s: &str) -> Result<Self> {
        let bad = || ScheduleError::Format(format!("expected HH:MM, got '{s}'"));

        let (h, m) = s.split_once(':').ok_or_else(bad)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(bad());
        }
        let hour: u8 = h.parse().map_err(|_| bad())?;
        let minute: u8 = m.parse().map_err(|_| bad())?;
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::Format(format!("time out of range: '{s}'")));
        }
        Ok(Self { hour, minute })
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Parse a `HH:MM` time string.
///
/// # Errors
///
/// Returns [`ScheduleError::Format`] if the string does not match `HH:MM`
/// with hour in `[0,23]` and minute in `[0,59]`.
///
/// # Examples
///
/// ```
/// use schedule_engine::time::parse_time;
///
/// let t = parse_time("08:30").unwrap();
/// assert_eq!(t.total_minutes(), 510);
/// assert!(parse_time("8:30").is_err());
/// assert!(parse_time("24:00").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<TimeOfDay> {
    s.parse()
}

// ── Intervals ───────────────────────────────────────────────────────────────

/// The permitted operating window for instructor working hours.
///
/// Business rule: no interval may start before 06:00 or end after 22:00.
pub const OPERATING_WINDOW: TimeInterval = TimeInterval {
    start: TimeOfDay::from_hm_unchecked(6, 0),
    end: TimeOfDay::from_hm_unchecked(22, 0),
};

/// A `[start, end)` time range within a single day. Invariant: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeInterval {
    /// Construct an interval, rejecting `start >= end`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidInterval`] if `start >= end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start >= end {
            return Err(ScheduleError::InvalidInterval(format!(
                "start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.total_minutes() - self.start.total_minutes()
    }

    /// Half-open overlap test: `a.start < b.end && b.start < a.end`.
    ///
    /// Intervals that merely touch at an endpoint do NOT overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Validate this interval against an operating window.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidInterval`] if `start >= end` or either
    /// endpoint falls outside `bounds`.
    pub fn validate_within(&self, bounds: &TimeInterval) -> Result<()> {
        if self.start >= self.end {
            return Err(ScheduleError::InvalidInterval(format!(
                "start {} must be before end {}",
                self.start, self.end
            )));
        }
        if self.start < bounds.start || self.end > bounds.end {
            return Err(ScheduleError::InvalidInterval(format!(
                "{self} outside operating window {bounds}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for TimeInterval {
    type Err = ScheduleError;

    /// Parse `HH:MM-HH:MM`.
    fn from_str(s: &str) -> Result<Self> {
        let (a, b) = s
            .split_once('-')
            .ok_or_else(|| ScheduleError::Format(format!("expected HH:MM-HH:MM, got '{s}'")))?;
        TimeInterval::new(a.trim().parse()?, b.trim().parse()?)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
