//! clinassist-client
//!
//! Typed access to the ClinAssist REST backend. The [`Transport`] trait is
//! the seam between request construction and the wire; [`HttpTransport`]
//! is the reqwest-backed implementation.

pub mod api;
pub mod error;
pub mod http;
pub mod transport;

pub use crate::api::ApiClient;
pub use crate::error::ClientError;
pub use crate::http::HttpTransport;
pub use crate::transport::{ApiRequest, ApiResponse, BoxFuture, Method, Transport};
