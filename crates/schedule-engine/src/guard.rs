//! The reservation guard: decides which dates are protected from
//! destructive regeneration.
//!
//! A date is protected while any of its slots is Booked or InProgress.
//! Both checks run against the slot collection the caller holds *now* —
//! never a snapshot captured at the start of an edit — because student
//! bookings can interleave with a working-hours edit.

use chrono::NaiveDate;
use serde::Serialize;

use crate::slot::Slot;

/// Per-date booking counts for the itemized protected-day warning the UI
/// must surface before an instructor's edit is applied elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedDay {
    pub date: NaiveDate,
    pub booked_count: usize,
    pub in_progress_count: usize,
}

/// True iff any slot on `date` has a protecting status (Booked, InProgress).
pub fn has_protected_bookings(slots: &[Slot], date: NaiveDate) -> bool {
    slots.iter().any(|s| s.date == date && s.is_protected())
}

/// Booking counts for every protected date in `dates`, date-ascending.
pub fn protected_day_details(
    slots: &[Slot],
    dates: impl IntoIterator<Item = NaiveDate>,
) -> Vec<ProtectedDay> {
    let mut details = Vec::new();
    for date in dates {
        let mut booked = 0;
        let mut in_progress = 0;
        for slot in slots.iter().filter(|s| s.date == date) {
            match slot.status {
                crate::slot::SlotStatus::Booked => booked += 1,
                crate::slot::SlotStatus::InProgress => in_progress += 1,
                _ => {}
            }
        }
        if booked + in_progress > 0 {
            details.push(ProtectedDay {
                date,
                booked_count: booked,
                in_progress_count: in_progress,
            });
        }
    }
    details
}
