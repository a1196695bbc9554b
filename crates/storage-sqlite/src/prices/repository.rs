use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::{DailyBarDB, SettlementCoverageDB, TrailingMetricsDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::daily_bars::dsl as bars_dsl;
use crate::schema::trailing_metrics::dsl as metrics_dsl;
use crate::schema::{daily_bars, trailing_metrics};
use crate::utils::{chunk_rows, format_date, parse_date};
use etfwatch_core::metrics::{compute_trailing_metrics, MetricsWindow, TrailingMetrics};
use etfwatch_core::prices::{CommitSummary, DailyBar, PriceStoreTrait, SettlementCoverage};
use etfwatch_core::Result;

const SETTLEMENT_COVERAGE_SQL: &str = "
    SELECT i.id AS instrument_id,
           i.ticker AS ticker,
           COUNT(b.bar_date) AS total_bars,
           COALESCE(SUM(CASE WHEN b.is_normalized THEN 1 ELSE 0 END), 0) AS normalized_bars
    FROM instruments i
    LEFT JOIN daily_bars b ON b.instrument_id = i.id
    WHERE i.is_active = 1
    GROUP BY i.id, i.ticker
    ORDER BY i.ticker";

pub struct PriceRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_bars(
    conn: &mut SqliteConnection,
    instrument_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyBar>> {
    bars_dsl::daily_bars
        .filter(bars_dsl::instrument_id.eq(instrument_id))
        .filter(bars_dsl::bar_date.ge(format_date(start)))
        .filter(bars_dsl::bar_date.le(format_date(end)))
        .order(bars_dsl::bar_date.asc())
        .select(DailyBarDB::as_select())
        .load::<DailyBarDB>(conn)
        .into_core()?
        .into_iter()
        .map(DailyBar::try_from)
        .collect()
}

#[async_trait]
impl PriceStoreTrait for PriceRepository {
    fn latest_bar_date(&self, instrument_id: &str) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;
        let latest: Option<String> = bars_dsl::daily_bars
            .filter(bars_dsl::instrument_id.eq(instrument_id))
            .select(diesel::dsl::max(bars_dsl::bar_date))
            .first(&mut conn)
            .into_core()?;
        latest.as_deref().map(parse_date).transpose()
    }

    fn get_bars_in_range(
        &self,
        instrument_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        let mut conn = get_connection(&self.pool)?;
        load_bars(&mut conn, instrument_id, start, end)
    }

    fn get_bars_missing_settlement(&self, instrument_id: &str) -> Result<Vec<DailyBar>> {
        let mut conn = get_connection(&self.pool)?;
        bars_dsl::daily_bars
            .filter(bars_dsl::instrument_id.eq(instrument_id))
            .filter(bars_dsl::is_normalized.eq(false))
            .order(bars_dsl::bar_date.asc())
            .select(DailyBarDB::as_select())
            .load::<DailyBarDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(DailyBar::try_from)
            .collect()
    }

    fn get_latest_metrics(&self, instrument_id: &str) -> Result<Option<TrailingMetrics>> {
        let mut conn = get_connection(&self.pool)?;
        metrics_dsl::trailing_metrics
            .filter(metrics_dsl::instrument_id.eq(instrument_id))
            .order(metrics_dsl::calculation_date.desc())
            .select(TrailingMetricsDB::as_select())
            .first::<TrailingMetricsDB>(&mut conn)
            .optional()
            .into_core()?
            .map(TrailingMetrics::try_from)
            .transpose()
    }

    fn settlement_coverage(&self) -> Result<Vec<SettlementCoverage>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = diesel::sql_query(SETTLEMENT_COVERAGE_SQL)
            .load::<SettlementCoverageDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(SettlementCoverage::from).collect())
    }

    async fn commit_bars(
        &self,
        instrument_id: &str,
        bars: Vec<DailyBar>,
        window: MetricsWindow,
    ) -> Result<CommitSummary> {
        let instrument_id = instrument_id.to_string();
        let rows: Vec<DailyBarDB> = bars.iter().map(DailyBarDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CommitSummary> {
                for chunk in chunk_rows(&rows, DailyBarDB::COLUMNS) {
                    diesel::replace_into(daily_bars::table)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }

                let stored = load_bars(conn, &instrument_id, window.start, window.end)?;
                let metrics = compute_trailing_metrics(&instrument_id, &stored, &window);
                match &metrics {
                    Some(metrics) => {
                        let row =
                            TrailingMetricsDB::from_metrics(metrics, &Utc::now().to_rfc3339());
                        diesel::replace_into(trailing_metrics::table)
                            .values(&row)
                            .execute(conn)
                            .into_core()?;
                    }
                    None => debug!(
                        "No bars for {} between {} and {}; metrics not written",
                        instrument_id, window.start, window.end
                    ),
                }

                Ok(CommitSummary {
                    bars_written: rows.len(),
                    metrics,
                })
            })
            .await
    }

    async fn update_settlement_prices(&self, bars: Vec<DailyBar>) -> Result<usize> {
        let rows: Vec<DailyBarDB> = bars.iter().map(DailyBarDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut updated = 0;
                for row in rows {
                    let target = bars_dsl::daily_bars
                        .filter(bars_dsl::instrument_id.eq(row.instrument_id))
                        .filter(bars_dsl::bar_date.eq(row.bar_date));
                    updated += diesel::update(target)
                        .set((
                            bars_dsl::is_normalized.eq(row.is_normalized),
                            bars_dsl::settlement_open.eq(row.settlement_open),
                            bars_dsl::settlement_high.eq(row.settlement_high),
                            bars_dsl::settlement_low.eq(row.settlement_low),
                            bars_dsl::settlement_close.eq(row.settlement_close),
                        ))
                        .execute(conn)
                        .into_core()?;
                }
                Ok(updated)
            })
            .await
    }
}
