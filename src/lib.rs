pub mod series;
pub mod detection;
pub mod screening;
pub mod config;
pub mod cli;
pub mod errors;
pub mod utils;

mod macros;

// Re-exports
pub use detection::{detect_anomalies, AnomalyDetector, AnomalySet, EstimationPolicy};
pub use errors::{InterestWatchError, InterestWatchResult};
pub use screening::EntityScreening;
pub use series::{DataPoint, TimeSeries};
