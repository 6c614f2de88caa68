//! Cadenza: recurring task lifecycle engine.
//!
//! Cadenza keeps recurring work items alive: a task marked to repeat on a
//! daily, weekly, or monthly cadence always has a bounded window of future
//! occurrences in storage, regenerated as occurrences are completed and
//! torn down consistently when the defining task is deleted.
//!
//! # Architecture
//!
//! Cadenza follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`recurrence`]: Date-recurrence math, occurrence orchestration, and
//!   the sequence identifier service
//! - [`maintenance`]: Periodic orphan-sweep worker

pub mod maintenance;
pub mod recurrence;
