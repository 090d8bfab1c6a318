/*
* InterestWatch Anomaly Detection Engine
* --------------------------------------
* @author: virjilakrum
* @project: interest-watch
* @status: statistically-significant-at-last
*
* Welcome to the numerical heart of InterestWatch! This is where a boring
* column of interest values turns into the short list of dates your
* compliance analyst actually wants to read (all ten of them, tops).
*
* Key Components:
* -------------
* 1. EstimationPolicy: three ways to decide what "normal" looks like:
*    - Constant: one mean, one std, whole series (the intern's favorite)
*    - Rolling: trailing windows (memory like a goldfish, configurable)
*    - ExponentialWeighted: half-life decay (forgets old news faster than
*      the news cycle itself)
*
* 2. Scorer: score(t) = x(t) - mean(t) - k*std(t). If that's positive, the
*    internet cared about your entity way more than usual that day.
*
* 3. Selector: keeps the 10 loudest spikes, returns them in calendar order
*    (because analysts read reports top to bottom, not by z-score)
*
* Technical Implementation:
* ----------------------
* - Pure synchronous computation, no shared state (thread-safe by boredom)
* - Rolling/ewm estimates are shifted one step forward: a spike is never
*   allowed to vote on its own detection threshold
* - Parameters are validated eagerly (garbage in, error out, immediately)
* - Sample (n-1) standard deviation everywhere, consistently
*
* Happy screening! Remember: in a world of interest spikes, the one with
* the tightest threshold sees the most ghosts.
*/

pub mod estimator;

pub use estimator::{estimate, EstimatorOutput};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::errors::DetectionError;
use crate::invalid_param;
use crate::series::TimeSeries;

/// Hard default cap on the number of reported anomalies.
pub const MAX_ANOMALIES: usize = 10;

/// How the per-timestep expected value and dispersion are estimated. One
/// tagged policy covers all three estimator families; the rolling and
/// exponential variants share the same forward-shift semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EstimationPolicy {
    /// Whole-series mean and std, broadcast to every timestamp.
    Constant,
    /// Trailing-window mean and std ending strictly before each timestamp.
    Rolling {
        lookback_mean: usize,
        lookback_std: usize,
    },
    /// Decay-weighted mean and std; an observation `n` steps back weighs
    /// `0.5^(n / halflife)`.
    ExponentialWeighted {
        halflife_mean: f64,
        halflife_std: f64,
    },
}

impl EstimationPolicy {
    /// Rolling policy with the stock lookbacks (1 for the mean, 10 for the
    /// std).
    pub fn rolling_default() -> Self {
        Self::Rolling {
            lookback_mean: 1,
            lookback_std: 10,
        }
    }

    /// Exponentially-weighted policy with the stock half-lives (1 for the
    /// mean, 10 for the std).
    pub fn ewm_default() -> Self {
        Self::ExponentialWeighted {
            halflife_mean: 1.0,
            halflife_std: 10.0,
        }
    }

    pub fn validate(&self) -> Result<(), DetectionError> {
        match *self {
            Self::Constant => {}
            Self::Rolling {
                lookback_mean,
                lookback_std,
            } => {
                if lookback_mean == 0 {
                    invalid_param!("lookback_mean", "window must be at least 1");
                }
                if lookback_std == 0 {
                    invalid_param!("lookback_std", "window must be at least 1");
                }
            }
            Self::ExponentialWeighted {
                halflife_mean,
                halflife_std,
            } => {
                if !(halflife_mean.is_finite() && halflife_mean > 0.0) {
                    invalid_param!(
                        "halflife_mean",
                        "half-life must be a positive finite number, got {}",
                        halflife_mean
                    );
                }
                if !(halflife_std.is_finite() && halflife_std > 0.0) {
                    invalid_param!(
                        "halflife_std",
                        "half-life must be a positive finite number, got {}",
                        halflife_std
                    );
                }
            }
        }
        Ok(())
    }
}

impl Default for EstimationPolicy {
    fn default() -> Self {
        Self::ewm_default()
    }
}

/// A scored timestamp. Candidates only exist where the estimator produced a
/// defined mean and std.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyCandidate {
    pub index: usize,
    pub date: NaiveDate,
    pub score: f64,
}

/// The final detection output: unique dates, chronologically sorted, at most
/// the configured cap. Every member scored strictly positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnomalySet {
    dates: Vec<NaiveDate>,
}

impl AnomalySet {
    pub fn empty() -> Self {
        Self { dates: Vec::new() }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NaiveDate> {
        self.dates.iter()
    }
}

impl<'a> IntoIterator for &'a AnomalySet {
    type Item = &'a NaiveDate;
    type IntoIter = std::slice::Iter<'a, NaiveDate>;

    fn into_iter(self) -> Self::IntoIter {
        self.dates.iter()
    }
}

/// Score every timestamp with a defined estimate:
/// `score(t) = x(t) - mean(t) - k*std(t)`.
pub fn score_candidates(
    series: &TimeSeries,
    estimates: &EstimatorOutput,
    sensitivity: f64,
) -> Vec<AnomalyCandidate> {
    series
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            let mean = estimates.mean[index]?;
            let std = estimates.std[index]?;
            Some(AnomalyCandidate {
                index,
                date: point.date,
                score: point.value - mean - sensitivity * std,
            })
        })
        .collect()
}

/// Rank positive-scoring candidates, cap the count, return survivors in
/// chronological order. Exact score ties resolve to the earlier date, so the
/// ranking is reproducible run to run.
pub fn select(mut candidates: Vec<AnomalyCandidate>, max_anomalies: usize) -> AnomalySet {
    candidates.retain(|c| c.score > 0.0);
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.date.cmp(&b.date))
    });
    candidates.truncate(max_anomalies);

    let mut dates: Vec<NaiveDate> = candidates.into_iter().map(|c| c.date).collect();
    dates.sort_unstable();

    AnomalySet { dates }
}

/// Policy-parameterized anomaly detector. Parameters are validated when the
/// detector is built; `detect` is a pure function of the series after that.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    policy: EstimationPolicy,
    sensitivity: f64,
    max_anomalies: usize,
}

impl AnomalyDetector {
    pub fn new(policy: EstimationPolicy, sensitivity: f64) -> Result<Self, DetectionError> {
        policy.validate()?;
        if !(sensitivity.is_finite() && sensitivity >= 0.0) {
            invalid_param!(
                "sensitivity",
                "sensitivity must be a non-negative finite number, got {}",
                sensitivity
            );
        }

        Ok(Self {
            policy,
            sensitivity,
            max_anomalies: MAX_ANOMALIES,
        })
    }

    /// Override the anomaly cap. The stock cap of ten is what screening
    /// reports are sized for.
    pub fn with_max_anomalies(mut self, max_anomalies: usize) -> Self {
        self.max_anomalies = max_anomalies;
        self
    }

    pub fn policy(&self) -> &EstimationPolicy {
        &self.policy
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn detect(&self, series: &TimeSeries) -> Result<AnomalySet, DetectionError> {
        if series.is_empty() {
            return Ok(AnomalySet::empty());
        }

        let estimates = estimate(series, &self.policy)?;
        let candidates = score_candidates(series, &estimates, self.sensitivity);
        debug!(
            candidates = candidates.len(),
            series_len = series.len(),
            "Scored detection candidates"
        );

        let anomalies = select(candidates, self.max_anomalies);
        info!(
            anomalies = anomalies.len(),
            policy = ?self.policy,
            sensitivity = self.sensitivity,
            "Anomaly detection complete"
        );

        Ok(anomalies)
    }
}

/// The composed estimate -> score -> select pipeline behind one call.
pub fn detect_anomalies(
    series: &TimeSeries,
    policy: EstimationPolicy,
    sensitivity: f64,
) -> Result<AnomalySet, DetectionError> {
    AnomalyDetector::new(policy, sensitivity)?.detect(series)
}
