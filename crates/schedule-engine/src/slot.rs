//! The slot entity: one concrete, dated, timed unit of instructor
//! availability or booking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{TimeInterval, TimeOfDay};

/// Opaque, stable slot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(Uuid);

impl SlotId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Slot lifecycle status.
///
/// The "live" statuses — the ones that occupy time on the calendar and are
/// subject to the no-overlap invariant — are Available, Booked, and
/// InProgress. Everything else is history or an intentional hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotStatus {
    Available,
    Booked,
    Blocked,
    Completed,
    Cancelled,
    NoShow,
    InProgress,
}

impl SlotStatus {
    /// Does this status occupy calendar time (no-overlap invariant applies)?
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            SlotStatus::Available | SlotStatus::Booked | SlotStatus::InProgress
        )
    }

    /// Does this status protect its date from destructive regeneration?
    pub fn is_protected(&self) -> bool {
        matches!(self, SlotStatus::Booked | SlotStatus::InProgress)
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SlotStatus::Available => "available",
            SlotStatus::Booked => "booked",
            SlotStatus::Blocked => "blocked",
            SlotStatus::Completed => "completed",
            SlotStatus::Cancelled => "cancelled",
            SlotStatus::NoShow => "noShow",
            SlotStatus::InProgress => "inProgress",
        };
        f.write_str(s)
    }
}

/// Reference to the student holding a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    pub id: Uuid,
    pub name: String,
}

impl StudentRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Payment details attached to a booked or completed lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub amount_cents: i64,
    pub settled: bool,
}

/// One concrete bookable (or booked) unit of instructor time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: SlotId,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub status: SlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentInfo>,
}

impl Slot {
    /// A freshly generated Available slot: no student, no location.
    pub fn generated(date: NaiveDate, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            id: SlotId::new(),
            date,
            start_time,
            end_time,
            status: SlotStatus::Available,
            student: None,
            location: None,
            notes: None,
            payment: None,
        }
    }

    /// The slot's time range as an interval.
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn is_protected(&self) -> bool {
        self.status.is_protected()
    }
}
