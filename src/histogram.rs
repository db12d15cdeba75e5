//! Price and category breakdowns of the sales in a month.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use time::Month;

use crate::{
    Error,
    params::{MonthParams, parse_month},
    store::{Aggregation, GroupBy, GroupKey, SharedStore, TransactionFilter, TransactionStore},
};

/// The lower bound of each price range. The last range has no upper bound.
pub const PRICE_BOUNDARIES: [f64; 10] = [
    0.0, 101.0, 201.0, 301.0, 401.0, 501.0, 601.0, 701.0, 801.0, 901.0,
];

/// The label of each price range, in the same order as [PRICE_BOUNDARIES].
pub const PRICE_RANGE_LABELS: [&str; 10] = [
    "0-100",
    "101-200",
    "201-300",
    "301-400",
    "401-500",
    "501-600",
    "601-700",
    "701-800",
    "801-900",
    "901-above",
];

/// The number of sales in one price range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRangeCount {
    /// The label of the range, e.g. "101-200".
    pub range: &'static str,
    /// The number of transactions priced within the range.
    pub count: u64,
}

/// The number of sales in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category, `null` for transactions without one.
    #[serde(rename = "_id")]
    pub category: Option<String>,
    /// The number of transactions in the category.
    pub count: u64,
}

/// Count the sales in `month` per price range.
///
/// Always returns one entry per label in [PRICE_RANGE_LABELS], in order,
/// including ranges without any sales. Each range includes its lower bound
/// and excludes the next range's lower bound, so a price of 100.5 is counted
/// in "0-100". Missing and negative prices are counted in "901-above".
///
/// # Errors
/// Returns an error if the store cannot be queried.
pub fn get_price_histogram(
    month: Month,
    store: &dyn TransactionStore,
) -> Result<Vec<PriceRangeCount>, Error> {
    // The open-ended last range is the store's overflow group.
    let rows = store.aggregate(&Aggregation {
        filter: TransactionFilter::SoldIn(month),
        group_by: GroupBy::PriceBuckets {
            boundaries: PRICE_BOUNDARIES[..].to_vec(),
        },
    })?;

    let mut counts = [0u64; PRICE_RANGE_LABELS.len()];
    let last = counts.len() - 1;

    for row in rows {
        let index = match row.key {
            GroupKey::Bucket(index) if index < last => index,
            _ => last,
        };
        counts[index] += row.count;
    }

    Ok(PRICE_RANGE_LABELS
        .into_iter()
        .zip(counts)
        .map(|(range, count)| PriceRangeCount { range, count })
        .collect())
}

/// Count the sales in `month` per category.
///
/// Only categories with at least one sale are returned, in no particular order.
///
/// # Errors
/// Returns an error if the store cannot be queried.
pub fn get_category_histogram(
    month: Month,
    store: &dyn TransactionStore,
) -> Result<Vec<CategoryCount>, Error> {
    let rows = store.aggregate(&Aggregation {
        filter: TransactionFilter::SoldIn(month),
        group_by: GroupBy::Category,
    })?;

    Ok(rows
        .into_iter()
        .filter_map(|row| match row.key {
            GroupKey::Category(category) => Some(CategoryCount {
                category,
                count: row.count,
            }),
            other => {
                tracing::warn!("ignoring unexpected group {other:?} in category histogram");
                None
            }
        })
        .collect())
}

/// A route handler for `GET /api/v1/bar-chart`.
pub async fn get_bar_chart_endpoint(
    State(store): State<SharedStore>,
    Query(params): Query<MonthParams>,
) -> Result<Json<Vec<PriceRangeCount>>, Error> {
    let month = parse_month(params.month.as_deref())?;

    get_price_histogram(month, store.as_ref()).map(Json)
}

/// A route handler for `GET /api/v1/pie-chart`.
pub async fn get_pie_chart_endpoint(
    State(store): State<SharedStore>,
    Query(params): Query<MonthParams>,
) -> Result<Json<Vec<CategoryCount>>, Error> {
    let month = parse_month(params.month.as_deref())?;

    get_category_histogram(month, store.as_ref()).map(Json)
}
