//! Application services for recurring task lifecycle orchestration.

pub mod facade;
pub mod orchestrator;
mod sequence;

pub use facade::{
    DispatchError, DispatchOutcome, DispatchOutcomeResult, DispatchResult, HealthReport,
    LifecycleFacade, LifecycleOperation, MaintenanceReport, ParseOperationError,
};
pub use orchestrator::{
    ChainStats, CompletionOutcome, OccurrenceOrchestrator, OrchestrationError,
    OrchestrationResult, FORWARD_WINDOW,
};
pub use sequence::{AllocationError, AllocationResult, SequenceAllocator};
