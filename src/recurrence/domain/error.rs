//! Error types for recurrence domain validation and parsing.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::Cadence;

/// Errors returned while constructing domain recurrence values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecurrenceDomainError {
    /// The owner identifier is empty after trimming.
    #[error("owner id must not be empty")]
    EmptyOwnerId,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,
}

/// Error returned while parsing cadences from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown cadence: {0}")]
pub struct ParseCadenceError(pub String);

/// Violations of the recurrence eligibility rules.
///
/// These are caller faults: the defining task is not in a shape that permits
/// occurrence generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecurrenceRuleError {
    /// A recurring task must carry a due date to anchor generation.
    #[error("recurring task must have a due date")]
    MissingDueDate,

    /// The due date is more than one day in the past.
    #[error("recurring task due date {0} is more than one day in the past")]
    StaleDueDate(DateTime<Utc>),

    /// Recurrence and the hierarchical subtask relation are mutually
    /// exclusive.
    #[error("subtask cannot carry a recurrence cadence")]
    RecurrenceOnSubtask,
}

/// Failures of the pure recurrence date arithmetic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The cadence does not define a recurrence interval.
    #[error("cadence '{0}' does not define a recurrence interval")]
    UnsupportedCadence(Cadence),

    /// The requested occurrence count is outside the supported range.
    #[error("occurrence count {0} outside supported range 1-100")]
    CountOutOfRange(usize),

    /// The enumeration period is empty or inverted.
    #[error("period end must be strictly after period start")]
    EmptyPeriod,

    /// Period enumeration hit the iteration ceiling.
    #[error("period enumeration exceeded {0} occurrences")]
    PeriodOverflow(usize),

    /// Date arithmetic left the representable range.
    #[error("date arithmetic overflowed the supported range")]
    DateOverflow,
}
