//! The API endpoints URIs.
//!
//! The JSON API lives under [API_V1]; the dashboard page is served from the root.

/// The prefix shared by every JSON API route.
pub const API_V1: &str = "/api/v1";
/// The server-rendered dashboard page.
pub const DASHBOARD: &str = "/";

/// The route that replaces the store's contents with the seed dataset.
pub const INITIALIZE_DB: &str = "/api/v1/initialize-db";
/// The route for the paginated, searchable transaction listing.
pub const TRANSACTIONS: &str = "/api/v1/transactions";
/// The route for a month's sale totals.
pub const STATISTICS: &str = "/api/v1/statistics";
/// The route for a month's price histogram.
pub const BAR_CHART: &str = "/api/v1/bar-chart";
/// The route for a month's category histogram.
pub const PIE_CHART: &str = "/api/v1/pie-chart";
/// The route for the statistics and both histograms in one response.
pub const COMBINED: &str = "/api/v1/combined";
