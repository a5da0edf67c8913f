//! Deterministic slot generation from one day's working hours.
//!
//! `generate` is a pure function of its inputs: identical `(date, config)`
//! always yields the same `(start, end, status)` tuples. Slot ids are fresh
//! on every call — the reconciler, not the generator, owns identity and
//! deduplication.

use chrono::NaiveDate;

use crate::slot::Slot;
use crate::time::TimeOfDay;
use crate::working_hours::{DayAvailability, MIN_SLOT_MINUTES};

/// Carve bookable slots out of one day's availability intervals.
///
/// For each interval (start-ascending), slots of `slot_minutes` are carved
/// from `interval.start`; after each slot the cursor advances by
/// `slot_minutes + break_minutes`. A candidate whose end would exceed the
/// interval's declared end is discarded — slots never cross interval
/// boundaries, and a trailing gap shorter than one slot stays unused rather
/// than becoming a partial slot.
///
/// A disabled day or an empty interval list yields no slots. Slot lengths
/// below the 15-minute floor are clamped to it; the validation gate in
/// [`crate::working_hours`] rejects such configurations before they reach
/// storage, so the clamp only matters for configs that bypassed the gate.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use schedule_engine::generator::generate;
/// use schedule_engine::working_hours::DayAvailability;
///
/// let day = DayAvailability {
///     enabled: true,
///     intervals: vec!["08:00-12:00".parse().unwrap()],
///     slot_minutes: 120,
///     break_minutes: 15,
/// };
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let slots = generate(date, &day);
///
/// // The second candidate (10:15-12:15) exceeds 12:00 and is discarded.
/// assert_eq!(slots.len(), 1);
/// assert_eq!(slots[0].start_time.to_string(), "08:00");
/// assert_eq!(slots[0].end_time.to_string(), "10:00");
/// ```
pub fn generate(date: NaiveDate, day: &DayAvailability) -> Vec<Slot> {
    if !day.enabled || day.intervals.is_empty() {
        return Vec::new();
    }

    let slot_minutes = day.slot_minutes.max(MIN_SLOT_MINUTES);
    let step = slot_minutes + day.break_minutes;

    let mut slots = Vec::new();
    let mut intervals = day.intervals.clone();
    intervals.sort_by_key(|iv| iv.start);

    for interval in &intervals {
        let interval_end = interval.end.total_minutes();
        let mut cursor = interval.start.total_minutes();

        loop {
            let slot_end = cursor + slot_minutes;
            if slot_end > interval_end {
                break;
            }
            let (Some(start), Some(end)) = (
                TimeOfDay::from_minutes(cursor),
                TimeOfDay::from_minutes(slot_end),
            ) else {
                break;
            };
            slots.push(Slot::generated(date, start, end));
            cursor += step;
        }
    }

    slots
}

// ── Tests ───────────────────────────────────────────────────────────────────
