//! Route handlers for the monthly statistics and chart reports.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    db::run_blocking,
    month::{Month, month_or_default},
    product::get_sale_rows,
};

use super::aggregation::{
    ChartEntry, PriceBucket, Statistics, bucket_by_price, count_by_category, summarize_sales,
};

/// The state needed for the report handlers.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading product transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters shared by every monthly report.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The month name, e.g. "march". Defaults to March when absent.
    pub month: Option<String>,
}

impl MonthQuery {
    /// The month to report on. A query string that cannot be read, such as one with a
    /// repeated `month`, is treated as if no month was given.
    fn resolve(query: Result<Query<Self>, QueryRejection>) -> Option<Month> {
        let query = query.map(|Query(query)| query).unwrap_or_default();
        month_or_default(query.month.as_deref())
    }
}

/// The statistics and both charts for one month.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedData {
    /// Sale totals.
    pub statistics: Statistics,
    /// Product counts per price range.
    pub bar_chart_data: Vec<ChartEntry<PriceBucket>>,
    /// Product counts per category.
    pub pie_chart_data: Vec<ChartEntry<String>>,
}

async fn get_statistics(
    db_connection: Arc<Mutex<Connection>>,
    month: Option<Month>,
) -> Result<Statistics, Error> {
    run_blocking(db_connection, move |connection| {
        get_sale_rows(month, connection).map(|rows| summarize_sales(&rows))
    })
    .await
}

async fn get_price_buckets(
    db_connection: Arc<Mutex<Connection>>,
    month: Option<Month>,
) -> Result<Vec<ChartEntry<PriceBucket>>, Error> {
    run_blocking(db_connection, move |connection| {
        get_sale_rows(month, connection).map(|rows| bucket_by_price(&rows))
    })
    .await
}

async fn get_category_counts(
    db_connection: Arc<Mutex<Connection>>,
    month: Option<Month>,
) -> Result<Vec<ChartEntry<String>>, Error> {
    run_blocking(db_connection, move |connection| {
        get_sale_rows(month, connection).map(|rows| count_by_category(&rows))
    })
    .await
}

/// Route handler for the sale totals of a month.
pub async fn statistics_endpoint(
    State(state): State<ReportState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Statistics>, Error> {
    get_statistics(state.db_connection, MonthQuery::resolve(query))
        .await
        .map(Json)
}

/// Route handler for the price histogram of a month.
pub async fn bar_chart_endpoint(
    State(state): State<ReportState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<ChartEntry<PriceBucket>>>, Error> {
    get_price_buckets(state.db_connection, MonthQuery::resolve(query))
        .await
        .map(Json)
}

/// Route handler for the category breakdown of a month.
pub async fn pie_chart_endpoint(
    State(state): State<ReportState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<ChartEntry<String>>>, Error> {
    get_category_counts(state.db_connection, MonthQuery::resolve(query))
        .await
        .map(Json)
}

/// Route handler for the statistics, price histogram and category breakdown of a month.
///
/// The three reports are queried concurrently and the first failure fails the request.
pub async fn combined_data_endpoint(
    State(state): State<ReportState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<CombinedData>, Error> {
    let month = MonthQuery::resolve(query);

    let (statistics, bar_chart_data, pie_chart_data) = tokio::try_join!(
        get_statistics(state.db_connection.clone(), month),
        get_price_buckets(state.db_connection.clone(), month),
        get_category_counts(state.db_connection.clone(), month),
    )?;

    Ok(Json(CombinedData {
        statistics,
        bar_chart_data,
        pie_chart_data,
    }))
}
