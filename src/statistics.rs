//! Sale totals for a month.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use time::Month;

use crate::{
    Error,
    params::{MonthParams, parse_month},
    store::{Aggregation, GroupBy, SharedStore, TransactionFilter, TransactionStore},
};

/// Sale totals for a single calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of the transactions sold in the month.
    pub total_sale_amount: f64,
    /// The number of transactions sold in the month.
    pub total_sold_items: u64,
    /// The number of transactions *not* sold in the month, i.e. sold in any
    /// other month or without a date of sale. The `isSold` flag is not read.
    pub total_not_sold_items: u64,
}

/// Compute the sale totals for `month`.
///
/// # Errors
/// Returns an error if the store cannot be queried.
pub fn get_statistics(month: Month, store: &dyn TransactionStore) -> Result<Statistics, Error> {
    let sold = store.aggregate(&Aggregation {
        filter: TransactionFilter::SoldIn(month),
        group_by: GroupBy::Nothing,
    })?;
    let total_not_sold_items = store.count(&TransactionFilter::SoldOutside(month))?;

    let (total_sale_amount, total_sold_items) = sold
        .first()
        .map_or((0.0, 0), |row| (row.total_price, row.count));

    Ok(Statistics {
        total_sale_amount,
        total_sold_items,
        total_not_sold_items,
    })
}

/// A route handler for `GET /api/v1/statistics`.
pub async fn get_statistics_endpoint(
    State(store): State<SharedStore>,
    Query(params): Query<MonthParams>,
) -> Result<Json<Statistics>, Error> {
    let month = parse_month(params.month.as_deref())?;

    get_statistics(month, store.as_ref()).map(Json)
}
