//! The schedule context: one instructor's authoritative scheduling state.
//!
//! All core operations are transformations over an explicit
//! [`ScheduleContext`] value — there is no global state and no clock access.
//! The caller owns the context, hands it to each operation, and persists it
//! through whatever storage layer the surrounding application uses.
//!
//! Every mutation of the slot collection goes through the narrow set of
//! operations here (add an Available-compatible slot, remove an Available
//! slot, transition one slot's status). Nothing bulk-overwrites slots, which
//! is what preserves booking history across reconcile passes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::exceptions::ScheduleException;
use crate::slot::{Slot, SlotId, SlotStatus, StudentRef};
use crate::template::ScheduleTemplate;
use crate::working_hours::WeeklyAvailability;

/// One instructor's complete scheduling state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleContext {
    pub working_hours: WeeklyAvailability,
    pub slots: Vec<Slot>,
    pub exceptions: Vec<ScheduleException>,
    pub templates: Vec<ScheduleTemplate>,
}

impl ScheduleContext {
    /// A context with the default weekly template and nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// All slots on a calendar date, in collection order.
    pub fn slots_on(&self, date: NaiveDate) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(move |s| s.date == date)
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: SlotId) -> Result<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ScheduleError::UnknownSlot(id.to_string()))
    }

    /// Add a manually created slot (any status).
    ///
    /// Enforces `start < end` and, for live statuses, the no-overlap
    /// invariant against the date's other live slots.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidInterval`] for an inverted range or
    /// [`ScheduleError::Overlap`] if a live slot would collide with another
    /// live slot on the same date.
    pub fn add_slot(&mut self, slot: Slot) -> Result<SlotId> {
        if slot.start_time >= slot.end_time {
            return Err(ScheduleError::InvalidInterval(format!(
                "slot start {} must be before end {}",
                slot.start_time, slot.end_time
            )));
        }
        if slot.is_live() {
            let interval = slot.interval();
            if let Some(existing) = self
                .slots_on(slot.date)
                .find(|s| s.is_live() && s.interval().overlaps(&interval))
            {
                return Err(ScheduleError::Overlap(format!(
                    "{} on {} collides with existing {} slot {}",
                    interval,
                    slot.date,
                    existing.status,
                    existing.interval()
                )));
            }
        }
        let id = slot.id;
        self.slots.push(slot);
        Ok(id)
    }

    /// Delete a slot. Only Available slots may be deleted — anything that
    /// carries booking history transitions status instead.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::SlotRetained`] for non-Available slots and
    /// [`ScheduleError::UnknownSlot`] for unknown ids.
    pub fn remove_slot(&mut self, id: SlotId) -> Result<()> {
        let slot = self.slot_mut(id)?;
        if slot.status != SlotStatus::Available {
            return Err(ScheduleError::SlotRetained(slot.status));
        }
        self.slots.retain(|s| s.id != id);
        Ok(())
    }

    // ── Status transitions ──────────────────────────────────────────────

    fn transition(&mut self, id: SlotId, from: &[SlotStatus], to: SlotStatus) -> Result<()> {
        let slot = self.slot_mut(id)?;
        if !from.contains(&slot.status) {
            return Err(ScheduleError::InvalidTransition {
                from: slot.status.to_string(),
                to: to.to_string(),
            });
        }
        slot.status = to;
        Ok(())
    }

    /// Book an Available slot for a student.
    pub fn book(&mut self, id: SlotId, student: StudentRef) -> Result<()> {
        self.transition(id, &[SlotStatus::Available], SlotStatus::Booked)?;
        // Infallible after the transition check above.
        if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
            slot.student = Some(student);
        }
        Ok(())
    }

    /// Mark a booked lesson as underway.
    pub fn start_lesson(&mut self, id: SlotId) -> Result<()> {
        self.transition(id, &[SlotStatus::Booked], SlotStatus::InProgress)
    }

    /// Mark a booked or in-progress lesson as completed.
    pub fn complete(&mut self, id: SlotId) -> Result<()> {
        self.transition(
            id,
            &[SlotStatus::Booked, SlotStatus::InProgress],
            SlotStatus::Completed,
        )
    }

    /// Record a no-show against a booked lesson.
    pub fn mark_no_show(&mut self, id: SlotId) -> Result<()> {
        self.transition(id, &[SlotStatus::Booked], SlotStatus::NoShow)
    }

    /// Place a manual hold on an Available slot.
    pub fn block(&mut self, id: SlotId) -> Result<()> {
        self.transition(id, &[SlotStatus::Available], SlotStatus::Blocked)
    }

    /// Release a hold back to Available.
    pub fn unblock(&mut self, id: SlotId) -> Result<()> {
        self.transition(id, &[SlotStatus::Blocked], SlotStatus::Available)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
