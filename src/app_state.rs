//! Implements a struct that holds the state of the REST server.

use std::time::Duration;

use axum::extract::FromRef;

use crate::{Error, pagination::PaginationConfig, seed::SeedSource, store::SharedStore};

/// How long to wait for the seed source before giving up.
const SEED_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The transaction store shared by every request.
    pub store: SharedStore,

    /// Where `/initialize-db` loads the seed data from.
    pub seed_source: SeedSource,

    /// The HTTP client used to fetch seed data.
    pub http_client: reqwest::Client,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] around an already initialized `store`.
    ///
    /// # Errors
    /// Returns an [Error::UpstreamFetch] if the HTTP client for seeding
    /// cannot be built.
    pub fn new(
        store: SharedStore,
        seed_source: SeedSource,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        let http_client = reqwest::Client::builder()
            .timeout(SEED_FETCH_TIMEOUT)
            .build()
            .map_err(|error| {
                tracing::error!("could not build HTTP client: {error}");
                Error::UpstreamFetch(error.to_string())
            })?;

        Ok(Self {
            store,
            seed_source,
            http_client,
            pagination_config,
        })
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}
