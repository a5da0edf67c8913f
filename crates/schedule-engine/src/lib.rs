//! # schedule-engine
//!
//! Deterministic instructor scheduling for driving schools.
//!
//! The engine turns a recurring weekly availability template into concrete
//! bookable slots, regenerates them safely when the template changes
//! without destroying existing reservations, keeps days with confirmed
//! bookings immune to destructive edits, and handles vacation/illness
//! overrides and cancellation requests.
//!
//! All operations are pure transformations over an explicit
//! [`ScheduleContext`] — no global state, no clock access. The caller owns
//! the context and persists it.
//!
//! ## Modules
//!
//! - [`time`] — `HH:MM` wall-clock times, half-open intervals, overlap tests
//! - [`working_hours`] — the per-weekday availability template and its validation gate
//! - [`slot`] — the slot entity and its status lifecycle
//! - [`generator`] — date + day configuration → ordered Available slots
//! - [`guard`] — which dates are protected by confirmed bookings
//! - [`reconciler`] — regenerate a date range non-destructively, reporting skips
//! - [`exceptions`] — vacation/holiday overrides with bounded recurrence
//! - [`cancellation`] — the cancellation-request state machine
//! - [`template`] — named, reusable weekly templates
//! - [`export`] — JSON snapshot export/import
//! - [`context`] — the schedule context all operations transform
//! - [`error`] — Error types

pub mod cancellation;
pub mod context;
pub mod error;
pub mod exceptions;
pub mod export;
pub mod generator;
pub mod guard;
pub mod reconciler;
pub mod slot;
pub mod template;
pub mod time;
pub mod working_hours;

pub use cancellation::{approve, reject, CancellationRequest, CancellationStatus, ReopenPolicy};
pub use context::ScheduleContext;
pub use error::ScheduleError;
pub use exceptions::{
    apply_exception, confirm_booked_cancellations, ExceptionKind, ExceptionOutcome,
    RecurringPattern, ScheduleException,
};
pub use export::{
    export_snapshot, import_snapshot, snapshot_from_json, snapshot_to_json, ScheduleSnapshot,
};
pub use generator::generate;
pub use guard::{has_protected_bookings, protected_day_details, ProtectedDay};
pub use reconciler::{
    reconcile, DateRange, MalformedConfigWarning, ReconcileNotification, ReconcileReport,
};
pub use slot::{PaymentInfo, Slot, SlotId, SlotStatus, StudentRef};
pub use template::{
    apply_template, save_template, set_default_template, ScheduleTemplate,
};
pub use time::{parse_time, TimeInterval, TimeOfDay, OPERATING_WINDOW};
pub use working_hours::{DayAvailability, Weekday, WeeklyAvailability};
