//! Working-hours reconciliation: regenerate slots from a (possibly changed)
//! weekly template without destroying booking history.
//!
//! `reconcile` walks a date range in ascending order and decides per date
//! whether to regenerate, skip (protected), or leave untouched. Days holding
//! a Booked or InProgress slot are fully immune to regeneration — an
//! instructor's edit must never silently invalidate a student's confirmed
//! lesson. Removal of stale Available slots strictly precedes insertion of
//! fresh ones, so no intermediate state ever shows duplicate overlapping
//! Available slots.
//!
//! Per-date problems (a malformed day configuration, a protected-day
//! conflict) are aggregated into the returned report rather than thrown: a
//! multi-day batch must not fail wholesale because of one bad day.
//!
//! `reconcile` is synchronous and safe to call repeatedly; coalescing rapid
//! successive edits into one pass (debouncing) is the calling layer's
//! strategy, not a correctness requirement here.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::ScheduleContext;
use crate::error::{Result, ScheduleError};
use crate::generator::generate;
use crate::guard::{has_protected_bookings, protected_day_details, ProtectedDay};
use crate::slot::{Slot, SlotStatus};
use crate::working_hours::Weekday;

// ── Date ranges ─────────────────────────────────────────────────────────────

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidDateRange`] if `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ScheduleError::InvalidDateRange(format!(
                "{end} is before {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A rolling generation horizon: `days` dates starting at `start`.
    /// Used by the nightly trigger that keeps the bookable window extended.
    pub fn horizon(start: NaiveDate, days: u32) -> Self {
        let days = days.max(1);
        Self {
            start,
            end: start + chrono::Duration::days(i64::from(days) - 1),
        }
    }

    /// Iterate the range's dates in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.succ_opt().filter(|next| *next <= end)
        })
    }
}

// ── Report ──────────────────────────────────────────────────────────────────

/// A non-fatal problem encountered while reconciling one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedConfigWarning {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub reason: String,
}

/// What a reconcile pass did, date by date.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Slots appended during this pass (status Available).
    pub generated: Vec<Slot>,
    /// Protected dates whose new configuration differed from what is live;
    /// every slot on these dates was left untouched.
    pub skipped_dates: Vec<NaiveDate>,
    /// Dates whose Available slots were replaced with fresh generator output.
    pub regenerated_dates: Vec<NaiveDate>,
    /// Booking counts behind each entry in `skipped_dates`.
    pub protected_days: Vec<ProtectedDay>,
    /// Dates left untouched because their weekday configuration failed
    /// validation.
    pub warnings: Vec<MalformedConfigWarning>,
}

impl ReconcileReport {
    /// The payload handed to the notification collaborator after a pass.
    /// Rendering is the caller's concern.
    pub fn notification(&self) -> ReconcileNotification {
        ReconcileNotification {
            generated_count: self.generated.len(),
            skipped_dates: self.skipped_dates.clone(),
            protected_day_details: self.protected_days.clone(),
        }
    }
}

/// Informational payload for the UI layer after a reconcile pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileNotification {
    pub generated_count: usize,
    pub skipped_dates: Vec<NaiveDate>,
    pub protected_day_details: Vec<ProtectedDay>,
}

// ── Reconcile ───────────────────────────────────────────────────────────────

/// Reconcile the context's slot collection with its weekly availability over
/// `range`.
///
/// For each date, ascending:
///
/// 1. Resolve the weekday's [`DayAvailability`](crate::working_hours::DayAvailability).
///    A configuration that fails validation leaves the date untouched and is
///    recorded as a [`MalformedConfigWarning`] — never a hard error.
/// 2. If the date holds a Booked or InProgress slot, it is protected: when
///    the configured layout differs from what is live, the date lands in
///    `skipped_dates` and nothing on it changes; when the layout is already
///    in effect, the date is a no-op.
/// 3. Otherwise the date's Available slots are removed (Blocked and history
///    slots always survive), and — if the day is enabled — fresh generator
///    output is appended and the date lands in `regenerated_dates`.
///
/// The protection check reads the slot collection as it is *now*, so
/// bookings interleaved between edit and reconcile are honored.
pub fn reconcile(ctx: &mut ScheduleContext, range: DateRange) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for date in range.days() {
        let weekday = Weekday::from(date.weekday());
        let day = ctx.working_hours.day(weekday).clone();

        if let Err(err) = day.validate() {
            warn!(%date, %weekday, error = %err, "malformed day configuration, date left untouched");
            report.warnings.push(MalformedConfigWarning {
                date,
                weekday,
                reason: err.to_string(),
            });
            continue;
        }

        // An exception covering the date suppresses generation outright.
        let suppressed = ctx.exceptions.iter().any(|e| e.covers(date));
        let mut candidates = if suppressed {
            Vec::new()
        } else {
            generate(date, &day)
        };

        // Blocked slots are intentional holds: their time is not re-offered.
        let holds: Vec<_> = ctx
            .slots_on(date)
            .filter(|s| s.status == SlotStatus::Blocked)
            .map(|s| s.interval())
            .collect();
        if !holds.is_empty() {
            candidates.retain(|c| !holds.iter().any(|h| h.overlaps(&c.interval())));
        }

        if has_protected_bookings(&ctx.slots, date) {
            if layout_in_effect(&ctx.slots, date, &candidates) {
                continue;
            }
            debug!(%date, "protected date skipped, bookings present");
            report.skipped_dates.push(date);
            continue;
        }

        // Remove-then-insert, in that order, per date.
        ctx.slots
            .retain(|s| s.date != date || s.status != SlotStatus::Available);
        if day.enabled && !suppressed {
            report.generated.extend(candidates.iter().cloned());
            ctx.slots.extend(candidates);
            report.regenerated_dates.push(date);
        }
    }

    report.protected_days =
        protected_day_details(&ctx.slots, report.skipped_dates.iter().copied());
    report
}

/// Is the configured layout already live on `date`?
///
/// Compares the `(start, end)` pairs of the date's live slots (Available,
/// Booked, InProgress) against the generator's candidate output. Blocked and
/// history slots are holds, not generator output, and are ignored.
fn layout_in_effect(slots: &[Slot], date: NaiveDate, candidates: &[Slot]) -> bool {
    let mut live: Vec<_> = slots
        .iter()
        .filter(|s| s.date == date && s.is_live())
        .map(|s| (s.start_time, s.end_time))
        .collect();
    let mut expected: Vec<_> = candidates
        .iter()
        .map(|s| (s.start_time, s.end_time))
        .collect();
    live.sort();
    expected.sort();
    live == expected
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::StudentRef;
    use crate::time::TimeInterval;
    use crate::working_hours::DayAvailability;

    fn iv(s: &str) -> TimeInterval {
        s.parse().unwrap()
    }

    fn day(intervals: &[&str], slot_minutes: u16, break_minutes: u16) -> DayAvailability {
        DayAvailability {
            enabled: true,
            intervals: intervals.iter().map(|s| s.parse().unwrap()).collect(),
            slot_minutes,
            break_minutes,
        }
    }

    /// Monday March 2, 2026.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn monday_range() -> DateRange {
        DateRange::new(monday(), monday()).unwrap()
    }

    fn available_times(ctx: &ScheduleContext, date: NaiveDate) -> Vec<String> {
        let mut times: Vec<String> = ctx
            .slots_on(date)
            .filter(|s| s.status == SlotStatus::Available)
            .map(|s| format!("{}-{}", s.start_time, s.end_time))
            .collect();
        times.sort();
        times
    }

    fn ctx_with_monday(cfg: DayAvailability) -> ScheduleContext {
        let mut ctx = ScheduleContext::new();
        ctx.working_hours.set_day(Weekday::Monday, cfg).unwrap();
        ctx
    }

    #[test]
    fn test_generates_for_enabled_unprotected_day() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        let report = reconcile(&mut ctx, monday_range());

        assert_eq!(report.regenerated_dates, vec![monday()]);
        assert!(report.skipped_dates.is_empty());
        assert_eq!(available_times(&ctx, monday()), vec!["08:00-10:00", "10:00-12:00"]);
    }

    #[test]
    fn test_reconcile_idempotent_without_bookings() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 90, 15));
        reconcile(&mut ctx, monday_range());
        let first = available_times(&ctx, monday());

        let report = reconcile(&mut ctx, monday_range());
        assert_eq!(available_times(&ctx, monday()), first);
        assert_eq!(report.regenerated_dates, vec![monday()]);
        // No duplication: remove-then-insert replaced, not appended.
        assert_eq!(ctx.slots_on(monday()).count(), first.len());
    }

    #[test]
    fn test_protected_day_left_byte_for_byte_unchanged() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());

        let booked_id = ctx.slots_on(monday()).next().unwrap().id;
        ctx.book(booked_id, StudentRef::named("Dana")).unwrap();
        let before: Vec<Slot> = ctx.slots_on(monday()).cloned().collect();

        // A different layout for Monday.
        ctx.working_hours
            .set_day(Weekday::Monday, day(&["09:00-13:00"], 60, 0))
            .unwrap();
        let report = reconcile(&mut ctx, monday_range());

        assert_eq!(report.skipped_dates, vec![monday()]);
        assert!(report.regenerated_dates.is_empty());
        let after: Vec<Slot> = ctx.slots_on(monday()).cloned().collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_protected_day_with_unchanged_config_is_noop_not_skipped() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());
        let booked_id = ctx.slots_on(monday()).next().unwrap().id;
        ctx.book(booked_id, StudentRef::named("Dana")).unwrap();

        let report = reconcile(&mut ctx, monday_range());
        assert!(report.skipped_dates.is_empty());
        assert!(report.regenerated_dates.is_empty());
    }

    #[test]
    fn test_protected_day_reports_booking_counts() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());
        let ids: Vec<_> = ctx.slots_on(monday()).map(|s| s.id).collect();
        ctx.book(ids[0], StudentRef::named("Dana")).unwrap();
        ctx.book(ids[1], StudentRef::named("Riley")).unwrap();

        ctx.working_hours
            .set_day(Weekday::Monday, day(&["09:00-13:00"], 60, 0))
            .unwrap();
        let report = reconcile(&mut ctx, monday_range());
        let notification = report.notification();

        assert_eq!(notification.skipped_dates, vec![monday()]);
        assert_eq!(notification.protected_day_details.len(), 1);
        assert_eq!(notification.protected_day_details[0].booked_count, 2);
        assert_eq!(notification.generated_count, 0);
    }

    #[test]
    fn test_disabling_protected_day_is_skipped() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());
        let booked_id = ctx.slots_on(monday()).next().unwrap().id;
        ctx.book(booked_id, StudentRef::named("Dana")).unwrap();

        let mut off = day(&["08:00-12:00"], 120, 0);
        off.enabled = false;
        ctx.working_hours.set_day(Weekday::Monday, off).unwrap();

        let report = reconcile(&mut ctx, monday_range());
        assert_eq!(report.skipped_dates, vec![monday()]);
        assert_eq!(ctx.slots_on(monday()).count(), 2);
    }

    #[test]
    fn test_disabled_unprotected_day_drops_available_keeps_history() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());

        // One slot completes (history), the other stays Available.
        let ids: Vec<_> = ctx.slots_on(monday()).map(|s| s.id).collect();
        ctx.book(ids[0], StudentRef::named("Dana")).unwrap();
        ctx.complete(ids[0]).unwrap();

        let mut off = day(&["08:00-12:00"], 120, 0);
        off.enabled = false;
        ctx.working_hours.set_day(Weekday::Monday, off).unwrap();
        reconcile(&mut ctx, monday_range());

        let remaining: Vec<_> = ctx.slots_on(monday()).collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].status, SlotStatus::Completed);
    }

    #[test]
    fn test_blocked_slots_survive_and_hold_their_time() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());
        let blocked_id = ctx.slots_on(monday()).next().unwrap().id;
        ctx.block(blocked_id).unwrap();

        reconcile(&mut ctx, monday_range());
        let hold = ctx.slot(blocked_id).unwrap().clone();
        assert_eq!(hold.status, SlotStatus::Blocked);
        // The held time is not re-offered as Available.
        assert!(!ctx
            .slots_on(monday())
            .any(|s| s.status == SlotStatus::Available
                && s.interval().overlaps(&hold.interval())));
        assert_eq!(available_times(&ctx, monday()), vec!["10:00-12:00"]);
    }

    #[test]
    fn test_malformed_config_warns_and_leaves_date_untouched() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());
        let before: Vec<Slot> = ctx.slots_on(monday()).cloned().collect();

        // Bypass the validation gate: inverted interval straight into state.
        ctx.working_hours.monday.intervals = vec![TimeInterval {
            start: "12:00".parse().unwrap(),
            end: "08:00".parse().unwrap(),
        }];

        let report = reconcile(&mut ctx, monday_range());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].date, monday());
        assert!(report.skipped_dates.is_empty());
        let after: Vec<Slot> = ctx.slots_on(monday()).cloned().collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_malformed_weekday_does_not_abort_other_days() {
        // Week of Monday March 2 .. Sunday March 8, 2026.
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        ctx.working_hours
            .set_day(Weekday::Tuesday, day(&["08:00-12:00"], 120, 0))
            .unwrap();
        // Corrupt only Monday.
        ctx.working_hours.monday.slot_minutes = 0;

        let range =
            DateRange::new(monday(), NaiveDate::from_ymd_opt(2026, 3, 8).unwrap()).unwrap();
        let report = reconcile(&mut ctx, range);

        assert_eq!(report.warnings.len(), 1);
        let tuesday = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        assert!(report.regenerated_dates.contains(&tuesday));
        assert_eq!(available_times(&ctx, tuesday).len(), 2);
    }

    #[test]
    fn test_dates_processed_ascending() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        ctx.working_hours
            .set_day(Weekday::Tuesday, day(&["08:00-12:00"], 120, 0))
            .unwrap();
        let range =
            DateRange::new(monday(), NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()).unwrap();
        let report = reconcile(&mut ctx, range);
        assert_eq!(
            report.regenerated_dates,
            vec![monday(), NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()]
        );
    }

    #[test]
    fn test_horizon_range() {
        let range = DateRange::horizon(monday(), 30);
        assert_eq!(range.days().count(), 30);
        assert_eq!(range.start, monday());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        let result = DateRange::new(monday(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(matches!(result, Err(ScheduleError::InvalidDateRange(_))));
    }

    #[test]
    fn test_protected_day_with_hold_and_unchanged_config_is_noop() {
        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());
        let ids: Vec<_> = ctx.slots_on(monday()).map(|s| s.id).collect();
        ctx.book(ids[0], StudentRef::named("Dana")).unwrap();
        ctx.block(ids[1]).unwrap();

        // The hold removes 10:00-12:00 from the expected layout; what is
        // live (the booked 08:00-10:00) matches what the unchanged config
        // would produce, so nothing is skipped and nothing changes.
        let report = reconcile(&mut ctx, monday_range());
        assert!(report.skipped_dates.is_empty());
        assert!(report.regenerated_dates.is_empty());
        assert_eq!(ctx.slots_on(monday()).count(), 2);
    }

    #[test]
    fn test_exception_suppresses_generation() {
        use crate::exceptions::{ExceptionKind, ScheduleException};

        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());
        assert_eq!(available_times(&ctx, monday()).len(), 2);

        ctx.exceptions.push(
            ScheduleException::new(ExceptionKind::Vacation, monday(), monday(), None).unwrap(),
        );
        let report = reconcile(&mut ctx, monday_range());

        // Stale Available slots drop, nothing is generated in their place.
        assert!(report.regenerated_dates.is_empty());
        assert!(available_times(&ctx, monday()).is_empty());
    }

    #[test]
    fn test_exception_over_booked_date_reports_skip() {
        use crate::exceptions::{ExceptionKind, ScheduleException};

        let mut ctx = ctx_with_monday(day(&["08:00-12:00"], 120, 0));
        reconcile(&mut ctx, monday_range());
        let booked_id = ctx.slots_on(monday()).next().unwrap().id;
        ctx.book(booked_id, StudentRef::named("Dana")).unwrap();

        ctx.exceptions.push(
            ScheduleException::new(ExceptionKind::Illness, monday(), monday(), None).unwrap(),
        );
        let report = reconcile(&mut ctx, monday_range());

        // The booking keeps the date immune; the conflict is reported, not
        // resolved silently.
        assert_eq!(report.skipped_dates, vec![monday()]);
        assert_eq!(ctx.slot(booked_id).unwrap().status, SlotStatus::Booked);
    }
}
