//! Domain model for recurring task lifecycle management.
//!
//! The recurrence domain models task records, their cadence, and the pure
//! date arithmetic behind occurrence generation while keeping all
//! infrastructure concerns outside of the domain boundary.

mod cadence;
mod error;
mod ids;
pub mod schedule;
mod task;

pub use cadence::Cadence;
pub use error::{ParseCadenceError, RecurrenceDomainError, RecurrenceRuleError, ScheduleError};
pub use ids::{OwnerId, RecordId, TaskId};
pub use task::{SharedAttributes, TaskDraft, TaskRecord};
