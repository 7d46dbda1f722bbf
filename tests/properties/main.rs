//! Property-based tests.

mod determinism_tests;
mod safety_tests;
