//! Port contracts for recurring task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by recurrence
//! services.

pub mod activity;
pub mod counter;
pub mod store;

pub use activity::{ActivityEntry, ActivityLog, ActivityLogError, ActivityLogResult};
pub use counter::{CounterStore, CounterStoreError, CounterStoreResult};
pub use store::{DueSort, TaskFilter, TaskQuery, TaskStore, TaskStoreError, TaskStoreResult};
