use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::SeriesError;

/// One observation of the interest signal: a calendar date and a numeric
/// interest value (normalized search/attention volume).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An ordered interest series. Timestamps are strictly increasing and every
/// value is finite; both invariants are checked at construction and never
/// revalidated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<DataPoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<DataPoint>) -> Result<Self, SeriesError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::UnorderedTimestamps {
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }
        for point in &points {
            if !point.value.is_finite() {
                return Err(SeriesError::NonFiniteValue { date: point.date });
            }
        }
        Ok(Self { points })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| DataPoint { date, value })
                .collect(),
        )
    }

    /// Parse a series from its JSON form: an array of
    /// `{"date": "YYYY-MM-DD", "value": n}` objects.
    pub fn from_json(json: &str) -> Result<Self, SeriesError> {
        let points: Vec<DataPoint> =
            serde_json::from_str(json).map_err(|e| SeriesError::Parse {
                message: e.to_string(),
            })?;
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn date(&self, index: usize) -> NaiveDate {
        self.points[index].date
    }

    pub fn value(&self, index: usize) -> f64 {
        self.points[index].value
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint> {
        self.points.iter()
    }

    /// Collapse the series to one point per calendar month: the first day of
    /// the month carries the arithmetic mean of that month's observations.
    /// Useful for smoothing daily trend data before screening.
    pub fn monthly_mean(&self) -> TimeSeries {
        let mut months: Vec<(NaiveDate, f64, u32)> = Vec::new();
        for point in &self.points {
            let month_start =
                NaiveDate::from_ymd_opt(point.date.year(), point.date.month(), 1)
                    .expect("first of month is always a valid date");
            match months.last_mut() {
                Some((start, sum, count)) if *start == month_start => {
                    *sum += point.value;
                    *count += 1;
                }
                _ => months.push((month_start, point.value, 1)),
            }
        }

        let points = months
            .into_iter()
            .map(|(date, sum, count)| DataPoint {
                date,
                value: sum / count as f64,
            })
            .collect();

        // Input order is strictly increasing, so month starts are too.
        Self { points }
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a DataPoint;
    type IntoIter = std::slice::Iter<'a, DataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
