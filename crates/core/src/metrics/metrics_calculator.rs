//! Trailing high/low computation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::metrics_model::{DecreaseThresholds, MetricsWindow, TrailingMetrics};
use crate::prices::DailyBar;

/// Computes trailing metrics from stored bars.
///
/// Bars outside `window` are ignored. The window is scanned newest-first and
/// only a strictly better value replaces the running extremum, so when several
/// bars share the extreme value the most recent date wins. Missing highs and
/// lows are skipped. Returns `None` when the window holds no usable high or low.
pub fn compute_trailing_metrics(
    instrument_id: &str,
    bars: &[DailyBar],
    window: &MetricsWindow,
) -> Option<TrailingMetrics> {
    let mut in_window: Vec<&DailyBar> = bars.iter().filter(|b| window.contains(b.date)).collect();
    in_window.sort_by(|a, b| b.date.cmp(&a.date));

    let mut high: Option<(Decimal, NaiveDate)> = None;
    let mut low: Option<(Decimal, NaiveDate)> = None;

    for bar in in_window {
        if let Some(value) = bar.high {
            if high.map_or(true, |(best, _)| value > best) {
                high = Some((value, bar.date));
            }
        }
        if let Some(value) = bar.low {
            if low.map_or(true, |(best, _)| value < best) {
                low = Some((value, bar.date));
            }
        }
    }

    let ((high, high_date), (low, low_date)) = (high?, low?);

    Some(TrailingMetrics {
        instrument_id: instrument_id.to_string(),
        calculation_date: window.end,
        window_start: window.start,
        high,
        high_date,
        low,
        low_date,
        thresholds: DecreaseThresholds::from_high(high),
    })
}
