//! Property-based tests for trailing metrics and settlement conversion.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use etfwatch_core::metrics::{compute_trailing_metrics, DecreaseThresholds, MetricsWindow};
use etfwatch_core::prices::{DailyBar, SettlementPrices};

// =============================================================================
// Generators
// =============================================================================

/// Prices with up to four decimal places between 0.0001 and 100000.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000).prop_map(|units| Decimal::new(units, 4))
}

fn arb_bar_series() -> impl Strategy<Value = Vec<(i64, Decimal, Decimal)>> {
    proptest::collection::vec((0i64..400, arb_price(), arb_price()), 1..60)
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
}

fn bar(offset: i64, high: Decimal, low: Decimal) -> DailyBar {
    DailyBar {
        instrument_id: "inst-1".to_string(),
        date: base_date() + Duration::days(offset),
        open: Some(low),
        high: Some(high),
        low: Some(low),
        close: Some(high),
        volume: Some(1_000),
        settlement: None,
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn thresholds_are_fixed_fractions_of_high(high in arb_price()) {
        let thresholds = DecreaseThresholds::from_high(high);
        prop_assert_eq!(thresholds.pct_10, high * Decimal::new(90, 2));
        prop_assert_eq!(thresholds.pct_15, high * Decimal::new(85, 2));
        prop_assert_eq!(thresholds.pct_20, high * Decimal::new(80, 2));
        prop_assert_eq!(thresholds.pct_25, high * Decimal::new(75, 2));
        prop_assert_eq!(thresholds.pct_30, high * Decimal::new(70, 2));
    }

    #[test]
    fn extremes_match_window_and_prefer_latest_date(series in arb_bar_series()) {
        let bars: Vec<DailyBar> = series
            .iter()
            .map(|(offset, high, low)| bar(*offset, *high, *low))
            .collect();
        let window = MetricsWindow::trailing(base_date() + Duration::days(400), 365);

        let in_window: Vec<&DailyBar> = bars.iter().filter(|b| window.contains(b.date)).collect();
        let metrics = compute_trailing_metrics("inst-1", &bars, &window);

        if in_window.is_empty() {
            prop_assert!(metrics.is_none());
            return Ok(());
        }
        let metrics = metrics.unwrap();

        let max_high = in_window.iter().filter_map(|b| b.high).max().unwrap();
        let min_low = in_window.iter().filter_map(|b| b.low).min().unwrap();
        prop_assert_eq!(metrics.high, max_high);
        prop_assert_eq!(metrics.low, min_low);

        let latest_high_date = in_window
            .iter()
            .filter(|b| b.high == Some(max_high))
            .map(|b| b.date)
            .max()
            .unwrap();
        let latest_low_date = in_window
            .iter()
            .filter(|b| b.low == Some(min_low))
            .map(|b| b.date)
            .max()
            .unwrap();
        prop_assert_eq!(metrics.high_date, latest_high_date);
        prop_assert_eq!(metrics.low_date, latest_low_date);
        prop_assert_eq!(metrics.thresholds, DecreaseThresholds::from_high(max_high));
    }

    #[test]
    fn identity_settlement_is_exact(high in arb_price(), low in arb_price()) {
        let bar = bar(0, high, low).with_identity_settlement();
        let settlement = bar.settlement.clone().unwrap();
        prop_assert_eq!(&settlement, &SettlementPrices::identity(&bar));
        prop_assert_eq!(settlement.high, Some(high));
        prop_assert_eq!(settlement.low, Some(low));
    }

    #[test]
    fn converted_prices_have_two_decimals(price in arb_price(), rate_units in 1i64..3_000_000) {
        let rate = Decimal::new(rate_units, 6);
        let settlement = SettlementPrices::converted(&bar(0, price, price), rate);
        let close = settlement.close.unwrap();
        prop_assert!(close.scale() <= 2);
        prop_assert!((close - price * rate).abs() <= Decimal::new(5, 3));
    }
}
