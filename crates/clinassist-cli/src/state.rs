use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clinassist_auth::SessionStore;
use clinassist_client::{ApiClient, HttpTransport};
use clinassist_services::Services;
use clinassist_storage::{FileStore, KeyValueStore};

use crate::config::ClinassistConfig;

/// Everything a command needs, built once per process. The session is
/// hydrated from storage as part of construction.
pub struct AppContext {
    pub config: ClinassistConfig,
    pub services: Services,
}

impl AppContext {
    /// Wire the reqwest transport and the on-disk session store.
    pub fn open(config: ClinassistConfig, config_dir: &Path) -> eyre::Result<Self> {
        let transport = HttpTransport::new(
            &config.api_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        let session_file = config.session_file(config_dir);
        let storage = FileStore::open(&session_file)?;
        tracing::debug!(
            api_url = %config.api_url,
            session = %session_file.display(),
            "app context opened"
        );

        Ok(Self::from_parts(
            config,
            ApiClient::new(Arc::new(transport)),
            Arc::new(storage),
        ))
    }

    pub fn from_parts(
        config: ClinassistConfig,
        api: ApiClient,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(api, storage));
        let services = Services::new(session, config.risk_thresholds);
        Self { config, services }
    }

    /// How long search input must be quiet before it is applied.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.config.search_debounce_ms)
    }

    pub fn session(&self) -> &SessionStore {
        &self.services.session
    }
}
