use std::path::{Path, PathBuf};

use clinassist_core::RiskThresholds;
use clinassist_views::debounce::SEARCH_DEBOUNCE;
use serde::{Deserialize, Serialize};

/// Schema version written by this build. [`migrate`] upgrades older files.
const CURRENT_VERSION: u32 = 1;

const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinassistConfig {
    /// 0 when the file predates versioning.
    #[serde(default)]
    pub config_version: u32,
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default)]
    pub log_json: bool,
    /// Added in v1.
    #[serde(default)]
    pub risk_thresholds: RiskThresholds,
    /// Where the session (tokens, user, therapist record) is persisted.
    /// Defaults to `session.json` next to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_path: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    10
}

fn default_search_debounce_ms() -> u64 {
    SEARCH_DEBOUNCE.as_millis() as u64
}

impl Default for ClinassistConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            api_url: "http://localhost:8080/api".to_string(),
            timeout_secs: default_timeout_secs(),
            default_page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            log_json: false,
            risk_thresholds: RiskThresholds::default(),
            session_path: None,
        }
    }
}

impl ClinassistConfig {
    /// Session file location, falling back to `dir/session.json`.
    pub fn session_file(&self, dir: &Path) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| dir.join(SESSION_FILE))
    }

    /// Apply the `CLINASSIST_API_URL` override (or `--api-url`).
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().trim_end_matches('/').to_string();
        }
        self
    }
}

pub fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.clinassist.cli"))
}

pub fn has_config(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).exists()
}

/// Load the config from `dir`, or defaults when none has been saved yet.
pub fn load_or_default(dir: &Path) -> eyre::Result<ClinassistConfig> {
    if !has_config(dir) {
        tracing::debug!(dir = %dir.display(), "no config file, using defaults");
        return Ok(ClinassistConfig::default());
    }
    load_config(dir)
}

pub fn load_config(dir: &Path) -> eyre::Result<ClinassistConfig> {
    let path = dir.join(CONFIG_FILE);
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    let raw: serde_json::Value = serde_json::from_str(&contents)?;
    let version = raw
        .get("config_version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0) as u32;

    let config: ClinassistConfig = serde_json::from_value(migrate(raw, version)?)?;
    check_thresholds(&config.risk_thresholds)?;
    Ok(config)
}

/// Bucketing needs strictly increasing bounds.
fn check_thresholds(t: &RiskThresholds) -> eyre::Result<()> {
    if !t.is_valid() {
        eyre::bail!(
            "risk_thresholds must satisfy medium < high < critical (got {}/{}/{})",
            t.medium,
            t.high,
            t.critical
        );
    }
    Ok(())
}

/// Upgrade a raw config value from `version` to [`CURRENT_VERSION`], one
/// step per version.
fn migrate(mut raw: serde_json::Value, version: u32) -> eyre::Result<serde_json::Value> {
    if version > CURRENT_VERSION {
        eyre::bail!(
            "config_version {version} is newer than this build supports ({CURRENT_VERSION}); \
             upgrade clinassist"
        );
    }

    if version < 1 {
        let fields = raw
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        fields
            .entry("risk_thresholds")
            .or_insert(serde_json::to_value(RiskThresholds::default())?);
        fields.insert("config_version".to_string(), 1.into());
        tracing::info!(from = version, to = 1, "config migrated");
    }

    Ok(raw)
}

/// Write the config as `config.json`, stamped with the current version.
/// Goes through a tmp file and a rename; owner-only on Unix.
pub fn save_config(dir: &Path, config: &ClinassistConfig) -> eyre::Result<()> {
    check_thresholds(&config.risk_thresholds)?;
    std::fs::create_dir_all(dir)?;

    let stamped = ClinassistConfig {
        config_version: CURRENT_VERSION,
        ..config.clone()
    };
    let body = serde_json::to_vec_pretty(&stamped)?;

    let path = dir.join(CONFIG_FILE);
    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, &body)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o600))?;
    }
    std::fs::rename(&staging, &path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
