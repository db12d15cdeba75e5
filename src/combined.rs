//! Combines the statistics and both histograms for a month into one response.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use time::Month;
use tokio::task::JoinSet;

use crate::{
    Error,
    histogram::{CategoryCount, PriceRangeCount, get_category_histogram, get_price_histogram},
    params::{MonthParams, parse_month},
    statistics::{Statistics, get_statistics},
    store::SharedStore,
};

/// Everything the dashboard shows for a month, in one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Combined {
    /// The sale totals for the month.
    pub statistics: Statistics,
    /// The price histogram for the month.
    pub bar_chart: Vec<PriceRangeCount>,
    /// The category histogram for the month.
    pub pie_chart: Vec<CategoryCount>,
}

enum Part {
    Statistics(Statistics),
    BarChart(Vec<PriceRangeCount>),
    PieChart(Vec<CategoryCount>),
}

/// Compute the statistics, price histogram and category histogram for
/// `month` concurrently.
///
/// The three queries run on the blocking thread pool. The first failure is
/// returned and the queries that have not started yet are cancelled. A query
/// that is already running finishes in the background and its result is dropped.
///
/// # Errors
/// Returns the error of the first query to fail, or [Error::TaskFailed] if a
/// query panicked.
pub async fn get_combined(month: Month, store: SharedStore) -> Result<Combined, Error> {
    let mut tasks = JoinSet::new();

    let statistics_store = store.clone();
    tasks.spawn_blocking(move || {
        get_statistics(month, statistics_store.as_ref()).map(Part::Statistics)
    });

    let bar_chart_store = store.clone();
    tasks.spawn_blocking(move || {
        get_price_histogram(month, bar_chart_store.as_ref()).map(Part::BarChart)
    });

    tasks.spawn_blocking(move || get_category_histogram(month, store.as_ref()).map(Part::PieChart));

    let mut statistics = None;
    let mut bar_chart = None;
    let mut pie_chart = None;

    while let Some(joined) = tasks.join_next().await {
        let part = joined.map_err(|error| {
            tracing::error!("combined query task failed: {error}");
            Error::TaskFailed(error.to_string())
        })??;

        match part {
            Part::Statistics(part) => statistics = Some(part),
            Part::BarChart(part) => bar_chart = Some(part),
            Part::PieChart(part) => pie_chart = Some(part),
        }
    }

    match (statistics, bar_chart, pie_chart) {
        (Some(statistics), Some(bar_chart), Some(pie_chart)) => Ok(Combined {
            statistics,
            bar_chart,
            pie_chart,
        }),
        _ => Err(Error::TaskFailed(
            "a combined query finished without a result".to_owned(),
        )),
    }
}

/// A route handler for `GET /api/v1/combined`.
pub async fn get_combined_endpoint(
    State(store): State<SharedStore>,
    Query(params): Query<MonthParams>,
) -> Result<Json<Combined>, Error> {
    let month = parse_month(params.month.as_deref())?;

    get_combined(month, store).await.map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use time::Month;

    use crate::{
        Error, endpoints,
        histogram::{get_category_histogram, get_price_histogram},
        statistics::get_statistics,
        store::SharedStore,
        test_utils::{FailingStore, sale, store_with, test_state, widget},
    };

    use super::{get_combined, get_combined_endpoint};

    #[tokio::test]
    async fn combines_the_individual_results() {
        let store = store_with(vec![
            widget(),
            sale("Ring", 168.0, Month::March).category("jewelery"),
            sale("SSD", 109.0, Month::July).category("electronics"),
        ]);

        let got = get_combined(Month::March, store.clone())
            .await
            .expect("Could not get combined results");

        assert_eq!(
            got.statistics,
            get_statistics(Month::March, store.as_ref()).expect("Could not get statistics")
        );
        assert_eq!(
            got.bar_chart,
            get_price_histogram(Month::March, store.as_ref()).expect("Could not get histogram")
        );
        let mut want_pie_chart =
            get_category_histogram(Month::March, store.as_ref()).expect("Could not get histogram");
        let mut got_pie_chart = got.pie_chart;
        want_pie_chart.sort_by(|a, b| a.category.cmp(&b.category));
        got_pie_chart.sort_by(|a, b| a.category.cmp(&b.category));
        assert_eq!(got_pie_chart, want_pie_chart);
    }

    #[tokio::test]
    async fn fails_when_any_query_fails() {
        let store: SharedStore = Arc::new(FailingStore);

        let got = get_combined(Month::March, store).await;

        assert_eq!(got, Err(Error::DatabaseLockError));
    }

    #[tokio::test]
    async fn endpoint_returns_all_three_parts() {
        let app = Router::new()
            .route(endpoints::COMBINED, get(get_combined_endpoint))
            .with_state(test_state(store_with(vec![widget()])));
        let server = TestServer::new(app);

        let response = server
            .get(endpoints::COMBINED)
            .add_query_param("month", "3")
            .await;

        response.assert_status_ok();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["statistics"]["totalSoldItems"], 1);
        assert_eq!(json["barChart"].as_array().map(Vec::len), Some(10));
        assert_eq!(json["pieChart"][0]["_id"], "Tools");
    }

    #[tokio::test]
    async fn endpoint_reports_store_failure_as_server_error() {
        let store: SharedStore = Arc::new(FailingStore);
        let app = Router::new()
            .route(endpoints::COMBINED, get(get_combined_endpoint))
            .with_state(test_state(store));
        let server = TestServer::new(app);

        let response = server
            .get(endpoints::COMBINED)
            .add_query_param("month", "3")
            .await;

        response.assert_status_internal_server_error();
    }
}
