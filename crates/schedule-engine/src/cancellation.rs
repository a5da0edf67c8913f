//! Cancellation request processing.
//!
//! A student files a request against a booked slot (outside this core); the
//! instructor approves or rejects it. `Pending` is the only non-terminal
//! state. Approval cancels the referenced lesson and may record a refund;
//! whether the freed time reopens for booking is an explicit policy the
//! caller supplies, never an implicit default. Rejection requires an admin
//! comment and leaves the booking untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ScheduleContext;
use crate::error::{Result, ScheduleError};
use crate::slot::{SlotId, SlotStatus, StudentRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancellationStatus {
    Pending,
    Approved,
    Rejected,
}

/// What happens to the slot's time once a cancellation is approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReopenPolicy {
    /// The slot stays Cancelled; the time is not offered again.
    #[default]
    KeepCancelled,
    /// The slot reopens as Available for other students.
    ReopenAvailable,
}

/// A student's request to cancel a booked lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub id: Uuid,
    pub slot_id: SlotId,
    pub student: StudentRef,
    pub request_date: NaiveDate,
    pub reason: String,
    pub status: CancellationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_amount_cents: Option<i64>,
}

impl CancellationRequest {
    pub fn new(
        slot_id: SlotId,
        student: StudentRef,
        request_date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            slot_id,
            student,
            request_date,
            reason: reason.into(),
            status: CancellationStatus::Pending,
            processed_at: None,
            processed_by: None,
            admin_comment: None,
            refund_amount_cents: None,
        }
    }
}

/// Approve a pending request: the referenced slot transitions from Booked to
/// Cancelled (or back to Available, per `policy`), and an optional refund is
/// recorded on the request.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidTransition`] if the request is not
/// Pending or the slot is not Booked, and [`ScheduleError::UnknownSlot`] if
/// the slot is gone.
pub fn approve(
    ctx: &mut ScheduleContext,
    request: &mut CancellationRequest,
    processed_by: &str,
    processed_at: NaiveDate,
    refund_amount_cents: Option<i64>,
    policy: ReopenPolicy,
) -> Result<()> {
    ensure_pending(request, CancellationStatus::Approved)?;

    let slot = ctx
        .slot(request.slot_id)
        .ok_or_else(|| ScheduleError::UnknownSlot(request.slot_id.to_string()))?;
    if slot.status != SlotStatus::Booked {
        return Err(ScheduleError::InvalidTransition {
            from: slot.status.to_string(),
            to: SlotStatus::Cancelled.to_string(),
        });
    }

    if let Some(slot) = ctx.slots.iter_mut().find(|s| s.id == request.slot_id) {
        match policy {
            ReopenPolicy::KeepCancelled => slot.status = SlotStatus::Cancelled,
            ReopenPolicy::ReopenAvailable => {
                slot.status = SlotStatus::Available;
                slot.student = None;
            }
        }
    }

    request.status = CancellationStatus::Approved;
    request.processed_at = Some(processed_at);
    request.processed_by = Some(processed_by.to_string());
    request.refund_amount_cents = refund_amount_cents;
    Ok(())
}

/// Reject a pending request. The booking stays exactly as it was; the
/// mandatory comment tells the student why.
///
/// # Errors
///
/// Returns [`ScheduleError::CommentRequired`] for an empty comment and
/// [`ScheduleError::InvalidTransition`] if the request is not Pending.
pub fn reject(
    request: &mut CancellationRequest,
    processed_by: &str,
    processed_at: NaiveDate,
    comment: &str,
) -> Result<()> {
    if comment.trim().is_empty() {
        return Err(ScheduleError::CommentRequired);
    }
    ensure_pending(request, CancellationStatus::Rejected)?;

    request.status = CancellationStatus::Rejected;
    request.processed_at = Some(processed_at);
    request.processed_by = Some(processed_by.to_string());
    request.admin_comment = Some(comment.to_string());
    Ok(())
}

fn ensure_pending(request: &CancellationRequest, to: CancellationStatus) -> Result<()> {
    if request.status != CancellationStatus::Pending {
        return Err(ScheduleError::InvalidTransition {
            from: format!("{:?}", request.status),
            to: format!("{to:?}"),
        });
    }
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Slot;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn booked_request(ctx: &mut ScheduleContext) -> CancellationRequest {
        let slot = Slot::generated(d(9), "08:00".parse().unwrap(), "09:30".parse().unwrap());
        let id = ctx.add_slot(slot).unwrap();
        let student = StudentRef::named("Dana");
        ctx.book(id, student.clone()).unwrap();
        CancellationRequest::new(id, student, d(2), "moving away")
    }

    #[test]
    fn test_approve_cancels_slot_and_records_refund() {
        let mut ctx = ScheduleContext::new();
        let mut request = booked_request(&mut ctx);

        approve(&mut ctx, &mut request, "admin", d(3), Some(4500), ReopenPolicy::KeepCancelled)
            .unwrap();

        assert_eq!(request.status, CancellationStatus::Approved);
        assert_eq!(request.processed_at, Some(d(3)));
        assert_eq!(request.processed_by.as_deref(), Some("admin"));
        assert_eq!(request.refund_amount_cents, Some(4500));
        assert_eq!(
            ctx.slot(request.slot_id).unwrap().status,
            SlotStatus::Cancelled
        );
    }

    #[test]
    fn test_approve_with_reopen_policy_frees_the_time() {
        let mut ctx = ScheduleContext::new();
        let mut request = booked_request(&mut ctx);

        approve(&mut ctx, &mut request, "admin", d(3), None, ReopenPolicy::ReopenAvailable)
            .unwrap();

        let slot = ctx.slot(request.slot_id).unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        assert!(slot.student.is_none());
    }

    #[test]
    fn test_reject_requires_comment_and_keeps_booking() {
        let mut ctx = ScheduleContext::new();
        let mut request = booked_request(&mut ctx);

        let result = reject(&mut request, "admin", d(3), "  ");
        assert!(matches!(result, Err(ScheduleError::CommentRequired)));
        assert_eq!(request.status, CancellationStatus::Pending);

        reject(&mut request, "admin", d(3), "too close to the exam date").unwrap();
        assert_eq!(request.status, CancellationStatus::Rejected);
        assert_eq!(
            ctx.slot(request.slot_id).unwrap().status,
            SlotStatus::Booked
        );
    }

    #[test]
    fn test_terminal_states_cannot_be_reprocessed() {
        let mut ctx = ScheduleContext::new();
        let mut request = booked_request(&mut ctx);
        approve(&mut ctx, &mut request, "admin", d(3), None, ReopenPolicy::KeepCancelled)
            .unwrap();

        let again = approve(
            &mut ctx,
            &mut request,
            "admin",
            d(4),
            None,
            ReopenPolicy::KeepCancelled,
        );
        assert!(matches!(again, Err(ScheduleError::InvalidTransition { .. })));

        let rejected = reject(&mut request, "admin", d(4), "already handled");
        assert!(matches!(
            rejected,
            Err(ScheduleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_requires_booked_slot() {
        let mut ctx = ScheduleContext::new();
        let mut request = booked_request(&mut ctx);
        // The lesson already happened.
        ctx.complete(request.slot_id).unwrap();

        let result = approve(
            &mut ctx,
            &mut request,
            "admin",
            d(3),
            None,
            ReopenPolicy::KeepCancelled,
        );
        assert!(matches!(result, Err(ScheduleError::InvalidTransition { .. })));
        assert_eq!(request.status, CancellationStatus::Pending);
    }
}
