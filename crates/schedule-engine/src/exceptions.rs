//! Date-range overrides: vacation, illness, holidays, training.
//!
//! An exception suppresses slot generation across its date range and can
//! cascade-block the Available slots already sitting inside it. Booked slots
//! are never silently cancelled — they are reported back for an explicit
//! confirmation step, the same policy the reconciler applies to protected
//! days.
//!
//! Recurring exceptions (a yearly holiday, a monthly obligation) expand to
//! concrete occurrences within a hard one-year lookahead from the anchor the
//! caller supplies; open-ended expansion is deliberately not supported.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ScheduleContext;
use crate::error::{Result, ScheduleError};
use crate::slot::{SlotId, SlotStatus};

/// Maximum recurrence lookahead from the expansion anchor, in months.
pub const RECURRENCE_LOOKAHEAD_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExceptionKind {
    Vacation,
    Illness,
    Holiday,
    Training,
    Other,
}

/// How a recurring exception repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecurringPattern {
    Yearly,
    Monthly,
}

impl RecurringPattern {
    fn months_per_period(&self) -> u32 {
        match self {
            RecurringPattern::Yearly => 12,
            RecurringPattern::Monthly => 1,
        }
    }
}

/// A date-range override on an instructor's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleException {
    pub id: Uuid,
    pub kind: ExceptionKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<RecurringPattern>,
    #[serde(default)]
    pub affected_slot_ids: Vec<SlotId>,
}

impl ScheduleException {
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidDateRange`] if `end_date < start_date`.
    pub fn new(
        kind: ExceptionKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        recurring: Option<RecurringPattern>,
    ) -> Result<Self> {
        if end_date < start_date {
            return Err(ScheduleError::InvalidDateRange(format!(
                "{end_date} is before {start_date}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            start_date,
            end_date,
            recurring,
            affected_slot_ids: Vec::new(),
        })
    }

    /// Does any occurrence of this exception cover `date`?
    ///
    /// Recurrence here is unbounded in the past-to-`date` direction — a
    /// yearly holiday created in 2024 still covers its 2030 occurrence when
    /// asked — but each call only walks occurrences up to `date`, so the
    /// check stays bounded.
    pub fn covers(&self, date: NaiveDate) -> bool {
        if self.start_date <= date && date <= self.end_date {
            return true;
        }
        let Some(pattern) = self.recurring else {
            return false;
        };
        if date <= self.end_date {
            return false;
        }
        let step = pattern.months_per_period();
        let mut k = step;
        while let (Some(start), Some(end)) = (
            self.start_date.checked_add_months(Months::new(k)),
            self.end_date.checked_add_months(Months::new(k)),
        ) {
            if start > date {
                return false;
            }
            if date <= end {
                return true;
            }
            k += step;
        }
        false
    }

    /// Expand to the concrete set of dates the exception affects, bounded to
    /// occurrences starting within [`RECURRENCE_LOOKAHEAD_MONTHS`] of
    /// `anchor`. The base range is always included, even when it lies before
    /// the anchor.
    pub fn expand_dates(&self, anchor: NaiveDate) -> Vec<NaiveDate> {
        let cap = anchor
            .checked_add_months(Months::new(RECURRENCE_LOOKAHEAD_MONTHS))
            .unwrap_or(anchor);

        let mut dates = Vec::new();
        push_range(&mut dates, self.start_date, self.end_date);

        if let Some(pattern) = self.recurring {
            let step = pattern.months_per_period();
            let mut k = step;
            while let (Some(start), Some(end)) = (
                self.start_date.checked_add_months(Months::new(k)),
                self.end_date.checked_add_months(Months::new(k)),
            ) {
                if start > cap {
                    break;
                }
                push_range(&mut dates, start, end);
                k += step;
            }
        }

        dates.sort();
        dates.dedup();
        dates
    }

    /// Record slots this exception has blocked.
    pub fn record_affected(&mut self, ids: &[SlotId]) {
        for id in ids {
            if !self.affected_slot_ids.contains(id) {
                self.affected_slot_ids.push(*id);
            }
        }
    }
}

fn push_range(dates: &mut Vec<NaiveDate>, start: NaiveDate, end: NaiveDate) {
    let mut d = start;
    while d <= end {
        dates.push(d);
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
}

/// What applying an exception did — and what it refused to do.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionOutcome {
    /// Available slots transitioned to Blocked by this application.
    pub blocked_slot_ids: Vec<SlotId>,
    /// Booked slots inside the range. Left untouched: cancelling a student's
    /// confirmed lesson requires the explicit confirmation step.
    pub warned_booked_slot_ids: Vec<SlotId>,
}

/// Apply an exception to the schedule: cascade-block Available slots in its
/// expanded date set and report (without touching) the Booked ones.
///
/// Idempotent — re-applying over the same range finds nothing left to block
/// and produces no further state change.
///
/// `today` anchors recurrence expansion; the core never reads a clock.
pub fn apply_exception(
    ctx: &mut ScheduleContext,
    exception: &ScheduleException,
    today: NaiveDate,
) -> ExceptionOutcome {
    let dates = exception.expand_dates(today);
    let mut outcome = ExceptionOutcome::default();

    for slot in ctx
        .slots
        .iter_mut()
        .filter(|s| dates.binary_search(&s.date).is_ok())
    {
        match slot.status {
            SlotStatus::Available => {
                slot.status = SlotStatus::Blocked;
                outcome.blocked_slot_ids.push(slot.id);
            }
            SlotStatus::Booked => outcome.warned_booked_slot_ids.push(slot.id),
            _ => {}
        }
    }

    outcome
}

/// The explicit second step for Booked slots inside an exception range:
/// cancel the lessons the instructor has acknowledged.
///
/// All-or-nothing: every id is checked before any slot is touched, so a
/// stale id leaves the schedule unchanged.
///
/// # Errors
///
/// Returns [`ScheduleError::UnknownSlot`] for an unknown id or
/// [`ScheduleError::InvalidTransition`] if a referenced slot is no longer
/// Booked.
pub fn confirm_booked_cancellations(
    ctx: &mut ScheduleContext,
    slot_ids: &[SlotId],
) -> Result<()> {
    for id in slot_ids {
        let slot = ctx
            .slot(*id)
            .ok_or_else(|| ScheduleError::UnknownSlot(id.to_string()))?;
        if slot.status != SlotStatus::Booked {
            return Err(ScheduleError::InvalidTransition {
                from: slot.status.to_string(),
                to: SlotStatus::Cancelled.to_string(),
            });
        }
    }
    for slot in ctx.slots.iter_mut().filter(|s| slot_ids.contains(&s.id)) {
        slot.status = SlotStatus::Cancelled;
    }
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────────────
