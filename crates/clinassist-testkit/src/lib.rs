//! clinassist-testkit
//!
//! In-memory stand-in for the ClinAssist backend, plugged in through the
//! `Transport` seam. Used by the integration tests of the service, view and
//! CLI crates.

pub mod backend;
pub mod fixtures;

pub use crate::backend::FakeBackend;
