//! Recurring task lifecycle management for Cadenza.
//!
//! This module keeps a bounded window of future occurrences alive for every
//! recurring task: three incomplete future instances per chain, regenerated
//! as occurrences are completed and torn down together when any task in the
//! chain is deleted. A periodic orphan sweep reconciles instances whose
//! defining task has disappeared, which the document store cannot prevent on
//! its own. The module follows hexagonal architecture:
//!
//! - Domain types and recurrence date math in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
