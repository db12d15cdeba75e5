//! Loads the product transaction dataset and replaces the store's contents with it.

use std::{convert::Infallible, fmt::Display, path::PathBuf, str::FromStr};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{AppState, Error, store::SharedStore, transaction::TransactionBuilder};

/// Where the dataset is published.
pub const DEFAULT_SEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// Where to load seed data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// Fetch the JSON array over HTTP(S).
    Url(String),
    /// Read the JSON array from a local file.
    File(PathBuf),
}

impl FromStr for SeedSource {
    type Err = Infallible;

    /// Values starting with `http://` or `https://` are URLs, anything else is a file path.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(Self::Url(value.to_owned()))
        } else {
            Ok(Self::File(PathBuf::from(value)))
        }
    }
}

impl Display for SeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedSource::Url(url) => write!(f, "{url}"),
            SeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A record as it appears in the seed dataset. Every field may be missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedTransaction {
    title: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    category: Option<String>,
    image: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    date_of_sale: Option<OffsetDateTime>,
    #[serde(alias = "sold")]
    is_sold: Option<bool>,
}

impl From<SeedTransaction> for TransactionBuilder {
    fn from(seed: SeedTransaction) -> Self {
        TransactionBuilder {
            title: seed.title.unwrap_or_default(),
            description: seed.description.unwrap_or_default(),
            price: seed.price,
            category: seed.category,
            image: seed.image,
            date_of_sale: None,
            is_sold: seed.is_sold,
        }
        .date_of_sale(seed.date_of_sale)
    }
}

fn upstream_error(source: &SeedSource, error: impl Display) -> Error {
    tracing::error!("could not load seed data from {source}: {error}");
    Error::UpstreamFetch(error.to_string())
}

/// Fetch and parse the seed dataset from `source`.
///
/// # Errors
/// Returns an [Error::UpstreamFetch] if the source cannot be read, responds
/// with an error status, or does not contain a JSON array of transactions.
pub async fn load_seed_data(
    source: &SeedSource,
    client: &reqwest::Client,
) -> Result<Vec<TransactionBuilder>, Error> {
    let body = match source {
        SeedSource::Url(url) => client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| upstream_error(source, error))?
            .bytes()
            .await
            .map_err(|error| upstream_error(source, error))?
            .to_vec(),
        SeedSource::File(path) => tokio::fs::read(path)
            .await
            .map_err(|error| upstream_error(source, error))?,
    };

    let records: Vec<SeedTransaction> =
        serde_json::from_slice(&body).map_err(|error| upstream_error(source, error))?;

    Ok(records.into_iter().map(TransactionBuilder::from).collect())
}

/// Replace the contents of `store` with the dataset at `source`.
///
/// The store is only touched once the whole dataset has been loaded.
/// Returns the number of transactions inserted.
///
/// # Errors
/// Returns an [Error::UpstreamFetch] if the dataset cannot be loaded, or the
/// store's error if the transactions cannot be written.
pub async fn seed_store(
    store: SharedStore,
    source: &SeedSource,
    client: &reqwest::Client,
) -> Result<usize, Error> {
    let transactions = load_seed_data(source, client).await?;

    tokio::task::spawn_blocking(move || store.replace_all(transactions))
        .await
        .map_err(|error| {
            tracing::error!("seeding task failed: {error}");
            Error::TaskFailed(error.to_string())
        })?
}

/// The state needed to seed the store.
#[derive(Debug, Clone)]
pub struct SeedState {
    /// The store to replace the contents of.
    pub store: SharedStore,
    /// Where to load the dataset from.
    pub seed_source: SeedSource,
    /// The client for fetching the dataset.
    pub http_client: reqwest::Client,
}

impl FromRef<AppState> for SeedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            seed_source: state.seed_source.clone(),
            http_client: state.http_client.clone(),
        }
    }
}

/// A route handler for `GET /api/v1/initialize-db`.
///
/// Responds with plain text rather than JSON.
pub async fn get_initialize_db(State(state): State<SeedState>) -> Response {
    match seed_store(state.store, &state.seed_source, &state.http_client).await {
        Ok(count) => {
            tracing::info!("Seeded {count} transactions from {}", state.seed_source);
            (StatusCode::OK, "Database initialized with seed data").into_response()
        }
        Err(error) => {
            tracing::error!("could not initialize the database: {error}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error initializing database").into_response()
        }
    }
}
