//! Dashboard HTTP handler and view rendering.
//!
//! The dashboard shows one page of the transaction listing next to the
//! statistics and charts for the selected month.

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Month;

use crate::{
    AppState, Error,
    combined::{Combined, get_combined},
    dashboard::{
        charts::{DashboardChart, category_chart, charts_script, charts_view, price_range_chart},
        tables::{controls_form, pagination_view, statistics_card, transactions_table},
    },
    html::{PAGE_CONTAINER_STYLE, base},
    pagination::PaginationConfig,
    params::ListParams,
    store::SharedStore,
    transaction::{ListQuery, TransactionPage, list_transactions},
};

/// The month shown when the request does not pick one.
const DEFAULT_MONTH: Month = Month::March;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The store to read transactions from.
    pub store: SharedStore,
    /// Page defaults and the number of page links to show.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Display the transactions, statistics and charts for a month.
///
/// Takes the same query parameters as the transaction listing, except that
/// `month` defaults to March.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(mut params): Query<ListParams>,
) -> Result<Response, Error> {
    if params
        .month
        .as_deref()
        .map(str::trim)
        .is_none_or(str::is_empty)
    {
        params.month = Some(u8::from(DEFAULT_MONTH).to_string());
    }

    let query = ListQuery::from_params(&params, &state.pagination_config)?;
    let page = list_transactions(&query, state.store.as_ref())
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;
    let combined = get_combined(query.month, state.store.clone()).await?;

    let charts = build_dashboard_charts(&combined, query.month);

    Ok(dashboard_view(
        &query,
        &page,
        &combined,
        &charts,
        state.pagination_config.max_pages,
    )
    .into_response())
}

fn build_dashboard_charts(combined: &Combined, month: Month) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "price-range-chart",
            options: price_range_chart(&combined.bar_chart, month).to_string(),
        },
        DashboardChart {
            id: "category-chart",
            options: category_chart(&combined.pie_chart, month).to_string(),
        },
    ]
}

fn dashboard_view(
    query: &ListQuery,
    page: &TransactionPage,
    combined: &Combined,
    charts: &[DashboardChart],
    max_pages: u64,
) -> Markup {
    let content = html!(
        div
            id="dashboard-content"
            class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                h1 class="text-2xl font-bold mb-4" { "Transaction Dashboard" }

                (controls_form(query))
                (transactions_table(&page.rows))
                (pagination_view(query, page.count, max_pages))
                (statistics_card(&combined.statistics, query.month))
                (charts_view(charts))
            }
        }
    );

    base("Dashboard", &[charts_script(charts)], &content)
}
