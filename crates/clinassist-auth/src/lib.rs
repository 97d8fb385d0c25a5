//! clinassist-auth
//!
//! Session and identity: login/refresh against the backend, durable
//! persistence of the resulting tokens and profile, and the role-derived
//! data scope every service consults.

pub mod error;
pub mod flows;
pub mod jwt;
pub mod session;

pub use crate::error::AuthError;
pub use crate::session::{DataScope, Session, SessionStore};
