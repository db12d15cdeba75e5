//! Application router configuration.

use axum::{Router, middleware, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    combined::get_combined_endpoint,
    dashboard::get_dashboard_page,
    endpoints,
    histogram::{get_bar_chart_endpoint, get_pie_chart_endpoint},
    logging::logging_middleware,
    not_found::get_404_not_found,
    seed::get_initialize_db,
    statistics::get_statistics_endpoint,
    transaction::get_transactions_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(endpoints::INITIALIZE_DB, get(get_initialize_db))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .route(endpoints::BAR_CHART, get(get_bar_chart_endpoint))
        .route(endpoints::PIE_CHART, get(get_pie_chart_endpoint))
        .route(endpoints::COMBINED, get(get_combined_endpoint));

    Router::new()
        .route(endpoints::DASHBOARD, get(get_dashboard_page))
        .merge(api_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        // The dashboard may be served from a different origin during development.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
