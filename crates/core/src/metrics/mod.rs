//! Metrics module - trailing-window high/low and decrease thresholds.

mod metrics_calculator;
mod metrics_model;

pub use metrics_calculator::compute_trailing_metrics;
pub use metrics_model::{threshold_price, DecreaseThresholds, MetricsWindow, TrailingMetrics};
