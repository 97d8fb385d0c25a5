//! clinassist-views
//!
//! View models over the entity services: the local UI state a list, form or
//! dashboard screen keeps (page, search term, filter, pending actions) and
//! the values it derives from the shared collections. View models never
//! write to service caches; every change goes through a service call.

pub mod dashboard;
pub mod debounce;
pub mod labels;
pub mod login;
pub mod patients;
pub mod predictions;
pub mod seances;

pub use crate::dashboard::DashboardView;
pub use crate::debounce::{Debounced, SearchInput};
pub use crate::labels::Badge;
pub use crate::login::{LoginError, LoginForm};
pub use crate::patients::{FormError, PatientFilter, PatientForm, PatientListView, PatientStats};
pub use crate::predictions::{PredictionsView, RiskCounts};
pub use crate::seances::{PendingApprovalsView, SeanceListView};
