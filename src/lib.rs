//! sandcheck - conformance checking for MPEG-DASH SAND (ISO/IEC 23009-5).
//!
//! Validates SAND message envelopes and MPDs with SAND extensions against
//! the rules the XML schemas cannot express, checks SAND messages carried
//! as HTTP headers, and runs conformance test-vector trees.

pub mod app;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod header;
pub mod validation;
pub mod vectors;

pub use error::{Result, SandError};
