//! Full-schedule snapshot export and import.
//!
//! The snapshot is the engine's single interchange format: a JSON document
//! with top-level keys `slots`, `workingHours`, `templates`, `exceptions`,
//! and `exportDate`. Import replaces in-memory state wholesale — no merging.
//! A round trip reproduces an equivalent slot collection; slot ids survive
//! as written, and freshly generated ids on either side are not part of the
//! equivalence.

use serde::{Deserialize, Serialize};

use crate::context::ScheduleContext;
use crate::error::Result;
use crate::exceptions::ScheduleException;
use crate::slot::Slot;
use crate::template::ScheduleTemplate;
use crate::working_hours::WeeklyAvailability;

/// A complete, self-contained schedule snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSnapshot {
    pub slots: Vec<Slot>,
    pub working_hours: WeeklyAvailability,
    pub templates: Vec<ScheduleTemplate>,
    pub exceptions: Vec<ScheduleException>,
    /// ISO-8601 timestamp supplied by the caller; the engine never reads a
    /// clock.
    pub export_date: String,
}

/// Snapshot the context as-is.
pub fn export_snapshot(ctx: &ScheduleContext, export_date: impl Into<String>) -> ScheduleSnapshot {
    ScheduleSnapshot {
        slots: ctx.slots.clone(),
        working_hours: ctx.working_hours.clone(),
        templates: ctx.templates.clone(),
        exceptions: ctx.exceptions.clone(),
        export_date: export_date.into(),
    }
}

/// Build a context from a snapshot, replacing any previous state wholesale.
pub fn import_snapshot(snapshot: ScheduleSnapshot) -> ScheduleContext {
    ScheduleContext {
        working_hours: snapshot.working_hours,
        slots: snapshot.slots,
        exceptions: snapshot.exceptions,
        templates: snapshot.templates,
    }
}

/// Serialize a snapshot to pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ScheduleError::Serialization`](crate::error::ScheduleError::Serialization)
/// if serde_json fails.
pub fn snapshot_to_json(snapshot: &ScheduleSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parse a snapshot from JSON.
///
/// # Errors
///
/// Returns [`ScheduleError::Serialization`](crate::error::ScheduleError::Serialization)
/// for malformed or mis-shaped input.
pub fn snapshot_from_json(json: &str) -> Result<ScheduleSnapshot> {
    Ok(serde_json::from_str(json)?)
}

// ── Tests ───────────────────────────────────────────────────────────────────
