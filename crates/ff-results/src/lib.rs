//! ff-results: measurement frames, utilization metrics and run manifests.

pub mod hash;
pub mod metrics;
pub mod summary;
pub mod types;

pub use hash::{compute_run_id, timestamp_now};
pub use metrics::{MetricError, MetricResult, apparent_power, daily_max, phase_average, utilization};
pub use summary::{AssetRating, DailyPeak, DailySummary, summarize_daily};
pub use types::*;
