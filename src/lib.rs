//! A small sales dashboard service.
//!
//! The library exposes transaction records over a REST/JSON API together with
//! statistics derived from them: sale totals for a month, a fixed-bucket price
//! histogram and a per-category breakdown. A server-rendered dashboard page
//! presents the same data as a table and charts.
//!
//! Persistence is abstracted behind [TransactionStore] so that the services
//! can run against SQLite, an in-memory store, or a test fake.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod combined;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod histogram;
mod html;
mod logging;
mod not_found;
mod pagination;
mod params;
mod routing;
mod seed;
mod statistics;
mod store;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use combined::{Combined, get_combined};
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use histogram::{CategoryCount, PriceRangeCount, get_category_histogram, get_price_histogram};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use seed::{DEFAULT_SEED_URL, SeedSource, load_seed_data, seed_store};
pub use statistics::{Statistics, get_statistics};
pub use store::{
    AggregateRow, Aggregation, GroupBy, GroupKey, InMemoryTransactionStore, SharedStore,
    SQLiteTransactionStore, TransactionFilter, TransactionStore,
};
pub use transaction::{
    ListQuery, PageRequest, Transaction, TransactionBuilder, TransactionPage, list_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required query parameter was absent or empty.
    ///
    /// The client should retry the request with the parameter set.
    #[error("{0} is required")]
    MissingParameter(&'static str),

    /// A query parameter could not be parsed or was out of range.
    #[error("invalid {name} \"{value}\": {reason}")]
    InvalidParameter {
        /// The name of the parameter as it appears on the wire.
        name: &'static str,
        /// The raw value sent by the client.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// An unhandled/unexpected SQL error while querying the store.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The store could not persist a write.
    ///
    /// Reseeding is not retried, the store may be left in whatever state the
    /// backing engine leaves it in.
    #[error("could not write to the transaction store: {0}")]
    StoreWrite(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The seed source was unreachable or returned a malformed payload.
    #[error("could not load seed data: {0}")]
    UpstreamFetch(String),

    /// A background query task panicked or was cancelled.
    #[error("a background query failed to complete: {0}")]
    TaskFailed(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

/// The JSON body sent to clients for error responses.
#[derive(Debug, Serialize)]
struct ErrorMessage {
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::MissingParameter(name) => (StatusCode::BAD_REQUEST, required_message(name)),
            error @ Error::InvalidParameter { .. } => (StatusCode::BAD_REQUEST, error.to_string()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, check the server logs for more details".to_owned(),
                )
            }
        };

        (status, Json(ErrorMessage { message })).into_response()
    }
}

/// Formats the message for a missing parameter, e.g. "Month is required".
fn required_message(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => format!("{}{} is required", first.to_uppercase(), chars.as_str()),
        None => "A parameter is required".to_owned(),
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[tokio::test]
    async fn missing_parameter_is_bad_request_with_message() {
        let response = Error::MissingParameter("month").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("Body is not JSON");
        assert_eq!(json["message"], "Month is required");
    }

    #[test]
    fn store_errors_are_internal_server_errors() {
        let cases = [
            Error::StoreWrite("disk full".to_owned()),
            Error::DatabaseLockError,
            Error::UpstreamFetch("connection refused".to_owned()),
            Error::TaskFailed("panicked".to_owned()),
        ];

        for error in cases {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
