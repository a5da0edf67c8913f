//! The recurring weekly availability template instructors edit.
//!
//! A [`WeeklyAvailability`] maps each of the seven weekdays to a
//! [`DayAvailability`]: an enabled flag, a set of non-overlapping time
//! intervals within the operating window, and the slot/break lengths used
//! when carving bookable slots. Mutations are atomic — a configuration that
//! fails validation leaves the previous one untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::time::{TimeInterval, OPERATING_WINDOW};

/// Slot lengths below this floor are rejected at the validation gate.
pub const MIN_SLOT_MINUTES: u16 = 15;

/// Recommended slot lengths offered by the editing UI, in minutes.
///
/// Advisory, not an invariant: the model accepts any length of at least
/// [`MIN_SLOT_MINUTES`].
pub const SLOT_MINUTES_CHOICES: [u16; 5] = [60, 90, 120, 150, 180];

/// Recommended break lengths offered by the editing UI, in minutes.
pub const BREAK_MINUTES_CHOICES: [u16; 5] = [0, 15, 30, 45, 60];

// ── Weekday ─────────────────────────────────────────────────────────────────

/// The closed set of weekday keys used throughout the engine.
///
/// Display labels may be localized by the caller; these internal keys never
/// vary by locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// The canonical lowercase key for this weekday.
    pub fn key(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(wd: chrono::Weekday) -> Self {
        match wd {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

// ── DayAvailability ─────────────────────────────────────────────────────────

/// One weekday's recurring configuration.
///
/// Intervals are held start-ascending; [`WeeklyAvailability::set_day`] and
/// [`WeeklyAvailability::add_interval`] normalize on accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub enabled: bool,
    pub intervals: Vec<TimeInterval>,
    pub slot_minutes: u16,
    pub break_minutes: u16,
}

impl Default for DayAvailability {
    fn default() -> Self {
        Self {
            enabled: false,
            intervals: Vec::new(),
            slot_minutes: 90,
            break_minutes: 15,
        }
    }
}

impl DayAvailability {
    /// Validate this configuration: every interval within the operating
    /// window, pairwise non-overlapping, and a slot length above the floor.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidInterval`], [`ScheduleError::Overlap`],
    /// or [`ScheduleError::InvalidDuration`] on the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes < MIN_SLOT_MINUTES {
            return Err(ScheduleError::InvalidDuration(format!(
                "slot length {} is below the {MIN_SLOT_MINUTES}-minute minimum",
                self.slot_minutes
            )));
        }
        for interval in &self.intervals {
            interval.validate_within(&OPERATING_WINDOW)?;
        }
        for (i, a) in self.intervals.iter().enumerate() {
            for b in &self.intervals[i + 1..] {
                if a.overlaps(b) {
                    return Err(ScheduleError::Overlap(format!("{a} intersects {b}")));
                }
            }
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.intervals.sort_by_key(|iv| iv.start);
    }
}

// ── WeeklyAvailability ──────────────────────────────────────────────────────

/// The authoritative weekly template: one [`DayAvailability`] per weekday.
///
/// The default is a typical driving-school week: weekdays enabled
/// 09:00–17:00 with 90-minute lessons and a 15-minute break, weekend off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub monday: DayAvailability,
    pub tuesday: DayAvailability,
    pub wednesday: DayAvailability,
    pub thursday: DayAvailability,
    pub friday: DayAvailability,
    pub saturday: DayAvailability,
    pub sunday: DayAvailability,
}

impl Default for WeeklyAvailability {
    fn default() -> Self {
        let workday = DayAvailability {
            enabled: true,
            intervals: vec![TimeInterval {
                start: crate::time::TimeOfDay::from_hm_unchecked(9, 0),
                end: crate::time::TimeOfDay::from_hm_unchecked(17, 0),
            }],
            slot_minutes: 90,
            break_minutes: 15,
        };
        Self {
            monday: workday.clone(),
            tuesday: workday.clone(),
            wednesday: workday.clone(),
            thursday: workday.clone(),
            friday: workday,
            saturday: DayAvailability::default(),
            sunday: DayAvailability::default(),
        }
    }
}

impl WeeklyAvailability {
    pub fn day(&self, weekday: Weekday) -> &DayAvailability {
        match weekday {
            Weekday::Monday => &self.monday,
            Weekday::Tuesday => &self.tuesday,
            Weekday::Wednesday => &self.wednesday,
            Weekday::Thursday => &self.thursday,
            Weekday::Friday => &self.friday,
            Weekday::Saturday => &self.saturday,
            Weekday::Sunday => &self.sunday,
        }
    }

    fn day_mut(&mut self, weekday: Weekday) -> &mut DayAvailability {
        match weekday {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
            Weekday::Saturday => &mut self.saturday,
            Weekday::Sunday => &mut self.sunday,
        }
    }

    /// Replace one weekday's configuration wholesale.
    ///
    /// Atomic: the new configuration is validated in full before it is
    /// installed, so any failure leaves the previous configuration unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the first validation failure from
    /// [`DayAvailability::validate`].
    pub fn set_day(&mut self, weekday: Weekday, mut config: DayAvailability) -> Result<()> {
        config.validate()?;
        config.normalize();
        *self.day_mut(weekday) = config;
        Ok(())
    }

    /// Append one interval to a weekday after validating it against the
    /// operating window and the day's existing intervals.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidInterval`] for an out-of-window
    /// interval or [`ScheduleError::Overlap`] on conflict with an existing
    /// interval; the day is not mutated on failure.
    pub fn add_interval(&mut self, weekday: Weekday, interval: TimeInterval) -> Result<()> {
        interval.validate_within(&OPERATING_WINDOW)?;
        let day = self.day_mut(weekday);
        if let Some(existing) = day.intervals.iter().find(|iv| iv.overlaps(&interval)) {
            return Err(ScheduleError::Overlap(format!(
                "{interval} intersects existing {existing} on {weekday}"
            )));
        }
        day.intervals.push(interval);
        day.normalize();
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
