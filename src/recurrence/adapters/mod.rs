//! Adapter implementations of the recurrence ports.

pub mod memory;
