//! In-memory adapters for recurrence ports.
//!
//! Reference implementations backing tests and single-process deployments;
//! shared state lives behind `Arc` so clones observe the same documents.

mod activity;
mod counter;
mod store;

pub use activity::InMemoryActivityLog;
pub use counter::InMemoryCounterStore;
pub use store::{InMemoryTaskStore, TASK_ID_COUNTER};
