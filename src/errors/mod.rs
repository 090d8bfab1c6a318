use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterestWatchError {
    #[error("Series Error: {0}")]
    SeriesError(#[from] SeriesError),

    #[error("Detection Error: {0}")]
    DetectionError(#[from] DetectionError),

    #[error("Screening Error: {0}")]
    ScreeningError(#[from] ScreeningError),

    #[error("Configuration Error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("timestamps must be strictly increasing: {date} does not follow {previous}")]
    UnorderedTimestamps {
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("non-finite interest value at {date}")]
    NonFiniteValue {
        date: NaiveDate,
    },

    #[error("failed to parse series: {message}")]
    Parse {
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("no anomalies computed for '{entity}' yet, run detection first")]
    AnomaliesNotComputed {
        entity: String,
    },

    #[error("unknown detection method '{method}', expected constant, rolling or ewm")]
    UnknownMethod {
        method: String,
    },
}

// Result type alias for convenience
pub type InterestWatchResult<T> = Result<T, InterestWatchError>;
