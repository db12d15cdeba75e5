//! The paginated, searchable transaction listing.

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use serde::Serialize;
use time::Month;

use crate::{
    AppState, Error,
    pagination::PaginationConfig,
    params::{ListParams, parse_month, parse_page_param},
    store::{SharedStore, TransactionFilter, TransactionStore},
    transaction::Transaction,
};

/// How far either side of a numeric search term a price may be and still match.
const PRICE_SEARCH_TOLERANCE: f64 = 10.0;

/// Which slice of the matching transactions to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page_number: u64,
    /// The maximum number of rows per page.
    pub page_size: u64,
}

impl PageRequest {
    /// The number of matches that come before this page.
    pub fn offset(&self) -> u64 {
        self.page_number
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }
}

/// A validated request for a page of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// The page to return.
    pub page: PageRequest,
    /// Free text to search for. Blank text is the same as no search.
    pub search: Option<String>,
    /// The month of sale to list.
    ///
    /// Ignored when `search` is set, but always required.
    pub month: Month,
}

impl ListQuery {
    /// Validate the raw query string parameters, filling in the page defaults
    /// from `config`.
    ///
    /// # Errors
    /// Returns [Error::MissingParameter] if `month` is absent, or
    /// [Error::InvalidParameter] if any parameter is malformed.
    pub(crate) fn from_params(params: &ListParams, config: &PaginationConfig) -> Result<Self, Error> {
        let month = parse_month(params.month.as_deref())?;
        let page_number = parse_page_param(
            "pageNumber",
            params.page_number.as_deref(),
            config.default_page,
        )?;
        let page_size = parse_page_param(
            "pageSize",
            params.page_size.as_deref(),
            config.default_page_size,
        )?;

        Ok(Self {
            page: PageRequest {
                page_number,
                page_size,
            },
            search: params.search.clone(),
            month,
        })
    }

    /// The search text with surrounding whitespace removed, if there is any left.
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// The store filter for this query.
    ///
    /// A search replaces the month filter instead of narrowing it.
    pub fn filter(&self) -> TransactionFilter {
        match self.search_text() {
            Some(text) => search_filter(text),
            None => TransactionFilter::SoldIn(self.month),
        }
    }
}

/// Match `text` against the title or description, or a price within
/// [PRICE_SEARCH_TOLERANCE] of the number `text` starts with, if any.
fn search_filter(text: &str) -> TransactionFilter {
    let mut filters = vec![
        TransactionFilter::TitleContains(text.to_owned()),
        TransactionFilter::DescriptionContains(text.to_owned()),
    ];

    if let Some(price) = leading_number(text) {
        filters.push(TransactionFilter::PriceBetween {
            min: price - PRICE_SEARCH_TOLERANCE,
            max: price + PRICE_SEARCH_TOLERANCE,
        });
    }

    TransactionFilter::AnyOf(filters)
}

/// The finite number at the start of `text`, ignoring anything after it.
///
/// Accepts an optional sign, digits with an optional fraction and an optional
/// exponent, so "49 inch" is 49 and "1.5e2kg" is 150, while "inch 49" is not
/// a number.
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let count_digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_digits = count_digits(end);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(end + 1);
        if integer_digits + fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }

    if integer_digits + fraction_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = count_digits(exponent_end);
        if exponent_digits > 0 {
            end = exponent_end + exponent_digits;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// One page of transactions and the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPage {
    /// The transactions on the requested page, in store order.
    pub rows: Vec<Transaction>,
    /// The number of matching transactions across all pages.
    pub count: u64,
}

/// Get the page of transactions described by `query`.
///
/// # Errors
/// Returns an error if the store cannot be queried.
pub fn list_transactions(
    query: &ListQuery,
    store: &dyn TransactionStore,
) -> Result<TransactionPage, Error> {
    let filter = query.filter();
    let rows = store.find(&filter, query.page.offset(), query.page.page_size)?;
    let count = store.count(&filter)?;

    Ok(TransactionPage { rows, count })
}

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The store to query.
    pub store: SharedStore,
    /// Supplies the defaults for missing page parameters.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler for `GET /api/v1/transactions`.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    Query(params): Query<ListParams>,
) -> Result<Json<TransactionPage>, Error> {
    let query = ListQuery::from_params(&params, &state.pagination_config)?;

    list_transactions(&query, state.store.as_ref()).map(Json)
}
