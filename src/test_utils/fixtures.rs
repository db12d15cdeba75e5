use std::{path::PathBuf, sync::Arc};

use time::{Date, Month, macros::datetime};

use crate::{
    AppState, Error,
    pagination::PaginationConfig,
    seed::SeedSource,
    store::{
        AggregateRow, Aggregation, InMemoryTransactionStore, SharedStore, TransactionFilter,
        TransactionStore,
    },
    transaction::{Transaction, TransactionBuilder},
};

/// The single record used in the worked examples: a 50 rupee widget sold in March 2024.
pub(crate) fn widget() -> TransactionBuilder {
    Transaction::build("Widget", 50.0, datetime!(2024-03-15 0:00 UTC)).category("Tools")
}

/// A transaction sold mid-way through `month` of 2022.
pub(crate) fn sale(title: &str, price: f64, month: Month) -> TransactionBuilder {
    let date = Date::from_calendar_date(2022, month, 15).expect("Could not create date");

    Transaction::build(title, price, date.midnight().assume_utc())
}

/// An in-memory store holding `transactions`.
pub(crate) fn store_with(transactions: Vec<TransactionBuilder>) -> SharedStore {
    let store = InMemoryTransactionStore::new();
    store
        .replace_all(transactions)
        .expect("Could not seed store");

    Arc::new(store)
}

/// App state around `store` whose seed source does not exist.
pub(crate) fn test_state(store: SharedStore) -> AppState {
    AppState::new(
        store,
        SeedSource::File(PathBuf::from("does-not-exist.json")),
        PaginationConfig::default(),
    )
    .expect("Could not create app state")
}

/// A store whose every operation fails.
#[derive(Debug)]
pub(crate) struct FailingStore;

impl TransactionStore for FailingStore {
    fn replace_all(&self, _: Vec<TransactionBuilder>) -> Result<usize, Error> {
        Err(Error::StoreWrite("read-only".to_owned()))
    }

    fn count(&self, _: &TransactionFilter) -> Result<u64, Error> {
        Err(Error::DatabaseLockError)
    }

    fn find(&self, _: &TransactionFilter, _: u64, _: u64) -> Result<Vec<Transaction>, Error> {
        Err(Error::DatabaseLockError)
    }

    fn aggregate(&self, _: &Aggregation) -> Result<Vec<AggregateRow>, Error> {
        Err(Error::DatabaseLockError)
    }
}
