use std::sync::Arc;

use clinassist_auth::{DataScope, SessionStore};
use clinassist_client::ApiClient;
use clinassist_core::{CoreError, RiskThresholds};

/// What every service needs: the shared client, the session (for scoping)
/// and the risk thresholds used to bucket scores the backend left
/// uncategorized.
#[derive(Clone)]
pub struct ServiceContext {
    pub api: ApiClient,
    pub session: Arc<SessionStore>,
    pub thresholds: RiskThresholds,
}

impl ServiceContext {
    pub fn new(session: Arc<SessionStore>, thresholds: RiskThresholds) -> Self {
        Self {
            api: session.api().clone(),
            session,
            thresholds,
        }
    }

    pub fn scope(&self) -> DataScope {
        self.session.scope()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("scope", &self.scope())
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

pub(crate) fn check_page_size(size: u32) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::InvalidPageSize(size));
    }
    Ok(())
}

pub(crate) fn page_query(page: u32, size: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("size", size.to_string())]
}
