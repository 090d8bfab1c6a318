/*
* InterestWatch Configuration
* ---------------------------
* Hierarchical settings, lowest to highest priority: hardcoded defaults,
* config/default.toml, config/local.toml, then APP_* environment variables
* for the people who deploy first and read documentation later.
*/

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::detection::{AnomalyDetector, EstimationPolicy, MAX_ANOMALIES};
use crate::errors::{InterestWatchResult, ScreeningError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub detection: DetectionSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectionSettings {
    /// Estimation method: "constant", "rolling" or "ewm".
    pub method: String,
    /// Sensitivity multiplier `k` on the dispersion term.
    pub sensitivity: f64,
    pub lookback_mean: usize,
    pub lookback_std: usize,
    pub halflife_mean: f64,
    pub halflife_std: f64,
    pub max_anomalies: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Collapse daily series to monthly means before screening.
    pub monthly_aggregation: bool,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            method: "ewm".to_string(),
            sensitivity: 1.0,
            lookback_mean: 1,
            lookback_std: 10,
            halflife_mean: 1.0,
            halflife_std: 10.0,
            max_anomalies: MAX_ANOMALIES,
        }
    }
}

impl DetectionSettings {
    /// The estimation policy these settings describe. Unknown method names
    /// are rejected here rather than silently falling back to a default.
    pub fn policy(&self) -> InterestWatchResult<EstimationPolicy> {
        let policy = match self.method.as_str() {
            "constant" => EstimationPolicy::Constant,
            "rolling" => EstimationPolicy::Rolling {
                lookback_mean: self.lookback_mean,
                lookback_std: self.lookback_std,
            },
            "ewm" => EstimationPolicy::ExponentialWeighted {
                halflife_mean: self.halflife_mean,
                halflife_std: self.halflife_std,
            },
            other => {
                return Err(ScreeningError::UnknownMethod {
                    method: other.to_string(),
                }
                .into())
            }
        };
        Ok(policy)
    }

    pub fn detector(&self) -> InterestWatchResult<AnomalyDetector> {
        let detector = AnomalyDetector::new(self.policy()?, self.sensitivity)?
            .with_max_anomalies(self.max_anomalies);
        Ok(detector)
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| "config".to_string());

        info!("Loading configuration from path: {}", config_path);

        let config = Config::builder()
            // Start with default settings
            .set_default("detection.method", "ewm")?
            .set_default("detection.sensitivity", 1.0)?
            .set_default("detection.lookback_mean", 1)?
            .set_default("detection.lookback_std", 10)?
            .set_default("detection.halflife_mean", 1.0)?
            .set_default("detection.halflife_std", 10.0)?
            .set_default("detection.max_anomalies", MAX_ANOMALIES as i64)?
            .set_default("report.monthly_aggregation", false)?
            // Add configuration from files
            .add_source(File::with_name(&format!("{}/default", config_path)).required(false))
            .add_source(File::with_name(&format!("{}/local", config_path)).required(false))
            // Add environment variables with prefix "APP_"
            .add_source(Environment::with_prefix("APP"))
            .build()?;

        config.try_deserialize()
    }

    pub fn new_from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from file: {}", path.display());

        let config = Config::builder()
            .add_source(File::from(path))
            .build()?;

        config.try_deserialize()
    }
}

pub fn generate_default_config() -> Settings {
    Settings {
        detection: DetectionSettings::default(),
        report: ReportSettings {
            monthly_aggregation: false,
        },
    }
}
