//! Unit tests for the recurrence module.

mod facade_tests;
