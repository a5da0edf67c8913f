//! Error types for scheduling operations.

use thiserror::Error;

use crate::slot::SlotStatus;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid time format: {0}")]
    Format(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Overlapping intervals: {0}")]
    Overlap(String),

    #[error("Invalid slot duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Slot carries booking history and cannot be deleted (status: {0:?})")]
    SlotRetained(SlotStatus),

    #[error("An admin comment is required to reject a cancellation request")]
    CommentRequired,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
