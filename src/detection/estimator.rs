use crate::errors::DetectionError;
use crate::series::TimeSeries;

use super::EstimationPolicy;

/// Per-timestep expected value and dispersion, aligned index-for-index with
/// the input series. `None` means the estimate is undefined at that index
/// (not enough history yet), which excludes the point from candidacy.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorOutput {
    pub mean: Vec<Option<f64>>,
    pub std: Vec<Option<f64>>,
}

impl EstimatorOutput {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Compute (mean, std) per timestamp under the given policy.
///
/// The rolling and exponential policies shift both outputs forward one step:
/// the estimate used at index `t` only reflects observations strictly before
/// `t`, so a spike can never raise its own detection threshold. The constant
/// policy is position-independent and takes no shift.
pub fn estimate(
    series: &TimeSeries,
    policy: &EstimationPolicy,
) -> Result<EstimatorOutput, DetectionError> {
    policy.validate()?;

    let values = series.values();
    let output = match *policy {
        EstimationPolicy::Constant => constant_estimate(&values),
        EstimationPolicy::Rolling {
            lookback_mean,
            lookback_std,
        } => EstimatorOutput {
            mean: shift_forward(rolling_mean(&values, lookback_mean)),
            std: shift_forward(rolling_std(&values, lookback_std)),
        },
        EstimationPolicy::ExponentialWeighted {
            halflife_mean,
            halflife_std,
        } => EstimatorOutput {
            mean: shift_forward(ewm_mean(&values, halflife_mean)),
            std: shift_forward(ewm_std(&values, halflife_std)),
        },
    };

    Ok(output)
}

fn constant_estimate(values: &[f64]) -> EstimatorOutput {
    let n = values.len();
    if n == 0 {
        return EstimatorOutput {
            mean: Vec::new(),
            std: Vec::new(),
        };
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let std = sample_std(values, mean);

    EstimatorOutput {
        mean: vec![Some(mean); n],
        std: vec![std; n],
    }
}

fn rolling_mean(values: &[f64], lookback: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            if t + 1 < lookback {
                return None;
            }
            let window = &values[t + 1 - lookback..=t];
            Some(window.iter().sum::<f64>() / lookback as f64)
        })
        .collect()
}

fn rolling_std(values: &[f64], lookback: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            if t + 1 < lookback {
                return None;
            }
            let window = &values[t + 1 - lookback..=t];
            let mean = window.iter().sum::<f64>() / lookback as f64;
            sample_std(window, mean)
        })
        .collect()
}

/// Exponentially-weighted mean: an observation `n` steps back weighs
/// `0.5^(n / halflife)`. Kept O(n) with decayed running sums.
fn ewm_mean(values: &[f64], halflife: f64) -> Vec<Option<f64>> {
    let decay = decay_factor(halflife);
    let mut sum_w = 0.0;
    let mut sum_wx = 0.0;

    values
        .iter()
        .map(|&x| {
            sum_w = 1.0 + decay * sum_w;
            sum_wx = x + decay * sum_wx;
            Some(sum_wx / sum_w)
        })
        .collect()
}

/// Exponentially-weighted standard deviation with the reliability-weight
/// correction, the weighted analogue of the n-1 sample std. The first
/// observation has no dispersion estimate.
fn ewm_std(values: &[f64], halflife: f64) -> Vec<Option<f64>> {
    let decay = decay_factor(halflife);
    let mut sum_w = 0.0;
    let mut sum_w2 = 0.0;
    let mut sum_wx = 0.0;
    let mut sum_wx2 = 0.0;

    values
        .iter()
        .map(|&x| {
            sum_w = 1.0 + decay * sum_w;
            sum_w2 = 1.0 + decay * decay * sum_w2;
            sum_wx = x + decay * sum_wx;
            sum_wx2 = x * x + decay * sum_wx2;

            let correction = sum_w * sum_w - sum_w2;
            if correction <= 0.0 {
                return None;
            }

            let mean = sum_wx / sum_w;
            // Rounding can push the biased variance a hair below zero.
            let biased_var = (sum_wx2 / sum_w - mean * mean).max(0.0);
            let var = biased_var * sum_w * sum_w / correction;
            Some(var.sqrt())
        })
        .collect()
}

fn decay_factor(halflife: f64) -> f64 {
    0.5_f64.powf(1.0 / halflife)
}

/// Shift estimates one step forward so index `t` holds the estimate computed
/// from data ending at `t - 1`. The last raw estimate drops off the end.
fn shift_forward(mut estimates: Vec<Option<f64>>) -> Vec<Option<f64>> {
    if estimates.is_empty() {
        return estimates;
    }
    estimates.pop();
    estimates.insert(0, None);
    estimates
}

/// Sample (n-1 denominator) standard deviation; undefined for fewer than 2
/// points.
fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sq_diff: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sq_diff / (values.len() - 1) as f64).sqrt())
}
