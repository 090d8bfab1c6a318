use chrono::{Days, NaiveDate};

use interest_watch::config::{generate_default_config, DetectionSettings};
use interest_watch::detection::{AnomalyDetector, EstimationPolicy};
use interest_watch::errors::{InterestWatchError, ScreeningError, SeriesError};
use interest_watch::screening::{policy_for_method, EntityScreening};
use interest_watch::series::{DataPoint, TimeSeries};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn daily_series(values: &[f64]) -> TimeSeries {
    TimeSeries::from_pairs(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (date(2024, 1, 1) + Days::new(i as u64), v)),
    )
    .unwrap()
}

#[test]
fn test_series_rejects_unordered_timestamps() {
    let points = vec![
        DataPoint {
            date: date(2024, 1, 2),
            value: 1.0,
        },
        DataPoint {
            date: date(2024, 1, 1),
            value: 2.0,
        },
    ];
    assert!(matches!(
        TimeSeries::new(points),
        Err(SeriesError::UnorderedTimestamps { .. })
    ));
}

#[test]
fn test_series_rejects_duplicate_timestamps() {
    let points = vec![
        DataPoint {
            date: date(2024, 1, 1),
            value: 1.0,
        },
        DataPoint {
            date: date(2024, 1, 1),
            value: 2.0,
        },
    ];
    assert!(matches!(
        TimeSeries::new(points),
        Err(SeriesError::UnorderedTimestamps { .. })
    ));
}

#[test]
fn test_series_rejects_non_finite_values() {
    let points = vec![DataPoint {
        date: date(2024, 1, 1),
        value: f64::NAN,
    }];
    assert!(matches!(
        TimeSeries::new(points),
        Err(SeriesError::NonFiniteValue { .. })
    ));
}

#[test]
fn test_series_json_round_trip() {
    let json = r#"[
        {"date": "2024-01-01", "value": 10.0},
        {"date": "2024-01-02", "value": 12.5}
    ]"#;
    let series = TimeSeries::from_json(json).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.date(1), date(2024, 1, 2));
    assert_eq!(series.value(1), 12.5);

    assert!(matches!(
        TimeSeries::from_json("not json"),
        Err(SeriesError::Parse { .. })
    ));
}

#[test]
fn test_monthly_mean_aggregation() {
    // January twice, February once
    let series = TimeSeries::from_pairs([
        (date(2024, 1, 5), 10.0),
        (date(2024, 1, 20), 20.0),
        (date(2024, 2, 3), 40.0),
    ])
    .unwrap();

    let monthly = series.monthly_mean();
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly.date(0), date(2024, 1, 1));
    assert_eq!(monthly.value(0), 15.0);
    assert_eq!(monthly.date(1), date(2024, 2, 1));
    assert_eq!(monthly.value(1), 40.0);
}

#[test]
fn test_monthly_mean_of_empty_series() {
    let series = TimeSeries::from_pairs(std::iter::empty()).unwrap();
    assert!(series.monthly_mean().is_empty());
}

#[test]
fn test_anomalies_before_detection_is_an_error() {
    let screening = EntityScreening::new("ACME Corp", daily_series(&[1.0, 2.0, 3.0]));
    assert!(matches!(
        screening.anomalies(),
        Err(ScreeningError::AnomaliesNotComputed { .. })
    ));
    assert!(screening.report().is_err());
}

#[test]
fn test_screening_detect_and_report() {
    let mut values = vec![10.0; 40];
    values[25] = 95.0;
    let mut screening = EntityScreening::new("ACME Corp", daily_series(&values));

    let detector = AnomalyDetector::new(EstimationPolicy::Constant, 1.0).unwrap();
    let anomalies = screening.detect(&detector).unwrap();
    assert_eq!(anomalies.len(), 1);

    let spike_date = date(2024, 1, 26);
    let report = screening.report().unwrap();
    assert!(report.contains("ACME Corp"));
    assert!(report.contains("1 anomalous date(s)"));
    assert!(report.contains(&spike_date.to_string()));
}

#[test]
fn test_detect_with_method_dispatch() {
    let mut values = vec![10.0; 40];
    values[25] = 95.0;

    for method in ["constant", "rolling", "ewm"] {
        let mut screening = EntityScreening::new("ACME Corp", daily_series(&values));
        let anomalies = screening.detect_with_method(method, 1.0).unwrap();
        assert!(anomalies.contains(date(2024, 1, 26)));
    }

    let mut screening = EntityScreening::new("ACME Corp", daily_series(&values));
    assert!(matches!(
        screening.detect_with_method("psychic", 1.0),
        Err(InterestWatchError::ScreeningError(
            ScreeningError::UnknownMethod { .. }
        ))
    ));
}

#[test]
fn test_policy_for_method_defaults() {
    assert_eq!(
        policy_for_method("rolling").unwrap(),
        EstimationPolicy::Rolling {
            lookback_mean: 1,
            lookback_std: 10,
        }
    );
    assert_eq!(
        policy_for_method("ewm").unwrap(),
        EstimationPolicy::ExponentialWeighted {
            halflife_mean: 1.0,
            halflife_std: 10.0,
        }
    );
    assert!(policy_for_method("lda").is_err());
}

#[test]
fn test_default_settings_build_a_detector() {
    let settings = generate_default_config();
    assert_eq!(settings.detection.method, "ewm");
    assert_eq!(settings.detection.max_anomalies, 10);
    assert!(settings.detection.detector().is_ok());
}

#[test]
fn test_settings_reject_unknown_method() {
    let settings = DetectionSettings {
        method: "vibes".to_string(),
        ..DetectionSettings::default()
    };
    assert!(settings.policy().is_err());
}

#[test]
fn test_settings_surface_invalid_parameters() {
    let settings = DetectionSettings {
        sensitivity: -2.0,
        ..DetectionSettings::default()
    };
    assert!(matches!(
        settings.detector(),
        Err(InterestWatchError::DetectionError(_))
    ));
}
