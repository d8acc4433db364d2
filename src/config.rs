use anyhow::{Context, Result};
use common::PlanningAssumptions;
use compute::overlay::{
    ConfidenceBand, PolicyShock, DEFAULT_RESIDUAL_STD, DEFAULT_SHOCK_START, DEFAULT_SHOCK_STRENGTH,
    Z_95,
};
use compute::Planner;
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::backend::BackendClient;
use crate::preferences::PreferenceStore;
use crate::schemas::{AppState, ChartDefaults};
use crate::store::ForecastStore;

/// Base name of the optional configuration file (`evplan.toml`, `evplan.json`, ...).
pub const CONFIG_FILE: &str = "evplan";
/// Prefix of environment overrides, e.g. `EVPLAN__BACKEND__BASE_URL`.
pub const ENV_PREFIX: &str = "EVPLAN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Format: IP:PORT
    pub bind_address: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// How long catalog, metrics and forecast answers are reused
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            cache_ttl_secs: 300,
            cache_capacity: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub residual_std: f64,
    pub z_score: f64,
    pub shock_start: usize,
    pub shock_strength: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            residual_std: DEFAULT_RESIDUAL_STD,
            z_score: Z_95,
            shock_start: DEFAULT_SHOCK_START,
            shock_strength: DEFAULT_SHOCK_STRENGTH,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreferenceSettings {
    pub path: String,
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            path: "evplan-preferences.json".to_string(),
        }
    }
}

/// Application settings, loaded once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub planning: PlanningAssumptions,
    pub chart: ChartSettings,
    pub preferences: PreferenceSettings,
}

impl Settings {
    /// Loads `.env`, then layers defaults, the optional config file and
    /// `EVPLAN__*` environment variables.
    ///
    /// `file` replaces the default `evplan` base name and must exist.
    pub fn load(file: Option<&str>) -> Result<Self> {
        trace!("Loading settings");
        dotenvy::dotenv().ok();

        let file_source = match file {
            Some(path) => {
                debug!("Using configuration file: {}", path);
                ::config::File::with_name(path).required(true)
            }
            None => ::config::File::with_name(CONFIG_FILE).required(false),
        };

        let settings: Settings = ::config::Config::builder()
            .add_source(file_source)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        debug!("Settings loaded: {:?}", settings);
        Ok(settings)
    }
}

/// Initialize application state from settings
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    trace!("Initializing application state");

    let planner = Planner::new(settings.planning.clone()).context("Invalid planning assumptions")?;
    let band = ConfidenceBand::new(settings.chart.residual_std, settings.chart.z_score)
        .context("Invalid confidence band settings")?;
    let shock = PolicyShock::new(settings.chart.shock_start, settings.chart.shock_strength)
        .context("Invalid policy shock settings")?;

    let backend = BackendClient::new(
        &settings.backend.base_url,
        Duration::from_secs(settings.backend.timeout_secs),
    )?;
    info!("Using forecasting backend at {}", backend.base_url());

    let preferences = PreferenceStore::load(&settings.preferences.path)
        .with_context(|| format!("Failed to load preferences from {}", settings.preferences.path))?;
    debug!("Preferences file: {}", preferences.path().display());

    // Initialize cache
    let cache = Cache::builder()
        .max_capacity(settings.backend.cache_capacity)
        .time_to_live(Duration::from_secs(settings.backend.cache_ttl_secs))
        .build();

    Ok(AppState {
        backend: Arc::new(backend),
        cache,
        store: ForecastStore::new(),
        planner: Arc::new(planner),
        chart: ChartDefaults { band, shock },
        preferences,
        request_timeout: Duration::from_secs(settings.server.request_timeout_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let settings = Settings::default();
        assert_eq!(settings.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(settings.backend.timeout_secs, 30);
        assert_eq!(settings.server.bind_address, "0.0.0.0:3000");
        assert_eq!(settings.planning, PlanningAssumptions::default());
        assert_eq!(settings.chart.shock_start, 6);
    }

    #[test]
    fn test_file_overrides_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[backend]\nbase_url = \"http://forecast:9000\"\n\n[planning]\nmedium_risk_threshold_mw = 8.0\n",
        )
        .unwrap();

        let settings = Settings::load(path.to_str()).unwrap();
        assert_eq!(settings.backend.base_url, "http://forecast:9000");
        assert_eq!(settings.backend.timeout_secs, 30);
        assert_eq!(settings.planning.medium_risk_threshold_mw, 8.0);
        assert_eq!(settings.planning.sessions_per_ev_per_month, 8.0);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some("/nonexistent/evplan-settings.toml")).is_err());
    }

    #[tokio::test]
    async fn test_invalid_assumptions_fail_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.preferences.path = dir.path().join("prefs.json").display().to_string();
        settings.planning.sessions_per_charger_per_month = 0.0;

        assert!(initialize_app_state(&settings).await.is_err());
    }
}
