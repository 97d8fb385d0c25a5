//! clinassist-core
//!
//! Pure domain types, the page envelope, risk bucketing, the Seance status
//! machine and REST path conventions. No HTTP dependency; this is the shared
//! vocabulary of the ClinAssist client.

pub mod api_paths;
pub mod error;
pub mod models;
pub mod page;
pub mod risk;

pub use crate::error::CoreError;
pub use crate::models::Entity;
pub use crate::page::Page;
pub use crate::risk::{RiskCategory, RiskThresholds};
