//! clinassist-cli library root.
//!
//! Re-exports the config, context and command modules so integration
//! tests can drive commands against an in-memory backend.

pub mod commands;
pub mod config;
pub mod state;

pub use crate::commands::{Cli, Command, run};
pub use crate::config::ClinassistConfig;
pub use crate::state::AppContext;
