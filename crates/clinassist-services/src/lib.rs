//! clinassist-services
//!
//! Entity services over the backend. Each service owns an observable
//! [`cache::Collection`] that views subscribe to; successful writes are
//! merged into it, reads refresh it.

pub mod cache;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod patients;
pub mod predictions;
pub mod registry;
pub mod seances;
pub mod therapeutes;

pub use crate::cache::{Collection, MergeMode};
pub use crate::context::ServiceContext;
pub use crate::dashboard::DashboardService;
pub use crate::error::ServiceError;
pub use crate::patients::PatientService;
pub use crate::predictions::PredictionService;
pub use crate::registry::Services;
pub use crate::seances::SeanceService;
pub use crate::therapeutes::TherapeuteService;
