//! Dashboard module
//!
//! Provides a page showing a month of sales as a searchable table, summary
//! statistics and charts.

mod charts;
mod handlers;
mod page_links;
mod tables;

pub use handlers::{DashboardState, get_dashboard_page};
