//! Named, reusable snapshots of a weekly availability configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ScheduleContext;
use crate::error::{Result, ScheduleError};
use crate::reconciler::{reconcile, DateRange, ReconcileReport};
use crate::working_hours::WeeklyAvailability;

/// A saved weekly template. At most one template is the default at a time,
/// enforced by [`set_default_template`] rather than by the data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTemplate {
    pub id: Uuid,
    pub name: String,
    pub hours: WeeklyAvailability,
    pub is_default: bool,
}

impl ScheduleTemplate {
    pub fn new(name: impl Into<String>, hours: WeeklyAvailability) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            hours,
            is_default: false,
        }
    }
}

/// Snapshot the context's current weekly hours as a named template.
pub fn save_template(ctx: &mut ScheduleContext, name: impl Into<String>) -> Uuid {
    let template = ScheduleTemplate::new(name, ctx.working_hours.clone());
    let id = template.id;
    ctx.templates.push(template);
    id
}

/// Mark one template as the default, clearing the flag on every other.
///
/// # Errors
///
/// Returns [`ScheduleError::UnknownTemplate`] if `id` does not exist; no
/// flags change in that case.
pub fn set_default_template(ctx: &mut ScheduleContext, id: Uuid) -> Result<()> {
    if !ctx.templates.iter().any(|t| t.id == id) {
        return Err(ScheduleError::UnknownTemplate(id.to_string()));
    }
    for template in &mut ctx.templates {
        template.is_default = template.id == id;
    }
    Ok(())
}

/// Install a template's hours as the live weekly availability, then
/// reconcile `range` against them.
///
/// Protected-day rules apply exactly as for a direct edit: dates with
/// bookings land in the report's `skipped_dates` untouched.
///
/// # Errors
///
/// Returns [`ScheduleError::UnknownTemplate`] if `id` does not exist; the
/// live configuration is unchanged in that case.
pub fn apply_template(
    ctx: &mut ScheduleContext,
    id: Uuid,
    range: DateRange,
) -> Result<ReconcileReport> {
    let hours = ctx
        .templates
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.hours.clone())
        .ok_or_else(|| ScheduleError::UnknownTemplate(id.to_string()))?;

    ctx.working_hours = hours;
    Ok(reconcile(ctx, range))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::StudentRef;
    use crate::working_hours::{DayAvailability, Weekday};
    use chrono::NaiveDate;

    fn sparse_week() -> WeeklyAvailability {
        let mut hours = WeeklyAvailability::default();
        hours
            .set_day(
                Weekday::Monday,
                DayAvailability {
                    enabled: true,
                    intervals: vec!["08:00-12:00".parse().unwrap()],
                    slot_minutes: 120,
                    break_minutes: 0,
                },
            )
            .unwrap();
        hours
    }

    #[test]
    fn test_single_default_invariant() {
        let mut ctx = ScheduleContext::new();
        let a = save_template(&mut ctx, "summer");
        let b = save_template(&mut ctx, "winter");

        set_default_template(&mut ctx, a).unwrap();
        set_default_template(&mut ctx, b).unwrap();

        let defaults: Vec<_> = ctx.templates.iter().filter(|t| t.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, b);
    }

    #[test]
    fn test_set_default_unknown_template() {
        let mut ctx = ScheduleContext::new();
        save_template(&mut ctx, "summer");
        let result = set_default_template(&mut ctx, Uuid::new_v4());
        assert!(matches!(result, Err(ScheduleError::UnknownTemplate(_))));
        assert!(ctx.templates.iter().all(|t| !t.is_default));
    }

    #[test]
    fn test_apply_template_installs_hours_and_reconciles() {
        let mut ctx = ScheduleContext::new();
        ctx.working_hours = sparse_week();
        let id = save_template(&mut ctx, "exam season");

        // Diverge the live config, then re-apply the saved template.
        ctx.working_hours
            .set_day(
                Weekday::Monday,
                DayAvailability {
                    enabled: true,
                    intervals: vec!["09:00-11:00".parse().unwrap()],
                    slot_minutes: 60,
                    break_minutes: 0,
                },
            )
            .unwrap();

        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let report =
            apply_template(&mut ctx, id, DateRange::new(monday, monday).unwrap()).unwrap();

        assert_eq!(report.regenerated_dates, vec![monday]);
        assert_eq!(ctx.working_hours, sparse_week());
        assert_eq!(ctx.slots_on(monday).count(), 2);
    }

    #[test]
    fn test_apply_template_respects_protected_days() {
        let mut ctx = ScheduleContext::new();
        ctx.working_hours = sparse_week();
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let range = DateRange::new(monday, monday).unwrap();
        reconcile(&mut ctx, range);

        let booked = ctx.slots_on(monday).next().unwrap().id;
        ctx.book(booked, StudentRef::named("Dana")).unwrap();

        let mut other = WeeklyAvailability::default();
        other
            .set_day(
                Weekday::Monday,
                DayAvailability {
                    enabled: true,
                    intervals: vec!["14:00-18:00".parse().unwrap()],
                    slot_minutes: 60,
                    break_minutes: 0,
                },
            )
            .unwrap();
        ctx.templates.push(ScheduleTemplate::new("afternoons", other));
        let id = ctx.templates.last().unwrap().id;

        let report = apply_template(&mut ctx, id, range).unwrap();
        assert_eq!(report.skipped_dates, vec![monday]);
        assert_eq!(ctx.slot(booked).unwrap().status, crate::slot::SlotStatus::Booked);
    }
}
