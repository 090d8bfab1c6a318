use tracing::info;

use crate::detection::{AnomalyDetector, AnomalySet, EstimationPolicy};
use crate::errors::{InterestWatchResult, ScreeningError};
use crate::series::TimeSeries;

/// Map a user-facing method name onto an estimation policy with its stock
/// parameters. `ewm` is the default method for screening work.
pub fn policy_for_method(method: &str) -> Result<EstimationPolicy, ScreeningError> {
    match method {
        "constant" => Ok(EstimationPolicy::Constant),
        "rolling" => Ok(EstimationPolicy::rolling_default()),
        "ewm" => Ok(EstimationPolicy::ewm_default()),
        other => Err(ScreeningError::UnknownMethod {
            method: other.to_string(),
        }),
    }
}

/// One entity under reputational screening: its name, its interest series,
/// and (after detection has run) the flagged dates. Acquiring the series is
/// the caller's problem; this type starts where the data ends.
#[derive(Debug, Clone)]
pub struct EntityScreening {
    name: String,
    interest: TimeSeries,
    anomalies: Option<AnomalySet>,
}

impl EntityScreening {
    pub fn new(name: impl Into<String>, interest: TimeSeries) -> Self {
        let name = name.into();
        info!(
            entity = %name,
            points = interest.len(),
            "Opened screening profile"
        );
        Self {
            name,
            interest,
            anomalies: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interest(&self) -> &TimeSeries {
        &self.interest
    }

    /// Run detection and remember the result for later reporting.
    pub fn detect(
        &mut self,
        detector: &AnomalyDetector,
    ) -> InterestWatchResult<&AnomalySet> {
        let anomalies = detector.detect(&self.interest)?;
        Ok(self.anomalies.insert(anomalies))
    }

    /// Convenience dispatch by method name with stock parameters, mirroring
    /// the `detect` CLI surface.
    pub fn detect_with_method(
        &mut self,
        method: &str,
        sensitivity: f64,
    ) -> InterestWatchResult<&AnomalySet> {
        let policy = policy_for_method(method)?;
        let detector = AnomalyDetector::new(policy, sensitivity)?;
        self.detect(&detector)
    }

    /// The flagged dates. Calling this before any detection run is a usage
    /// error, not an empty result.
    pub fn anomalies(&self) -> Result<&AnomalySet, ScreeningError> {
        self.anomalies
            .as_ref()
            .ok_or_else(|| ScreeningError::AnomaliesNotComputed {
                entity: self.name.clone(),
            })
    }

    /// Render the aggregate plain-text screening report: one line per flagged
    /// date with the interest value observed there.
    pub fn report(&self) -> Result<String, ScreeningError> {
        let anomalies = self.anomalies()?;

        let mut out = String::new();
        out.push_str(&format!("Interest screening for {}\n", self.name));
        match (self.interest.first(), self.interest.last()) {
            (Some(first), Some(last)) => {
                out.push_str(&format!(
                    "Series: {} to {} ({} points)\n",
                    first.date,
                    last.date,
                    self.interest.len()
                ));
            }
            _ => out.push_str("Series: empty\n"),
        }

        if anomalies.is_empty() {
            out.push_str("No anomalous dates detected\n");
            return Ok(out);
        }

        out.push_str(&format!("{} anomalous date(s):\n", anomalies.len()));
        for &date in anomalies {
            let value = self
                .interest
                .iter()
                .find(|p| p.date == date)
                .map(|p| p.value)
                .unwrap_or(f64::NAN);
            out.push_str(&format!("  - {} (interest {})\n", date, value));
        }

        Ok(out)
    }
}
