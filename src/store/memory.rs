//! Implements an in-memory transaction store, mostly for tests and demos.
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{
    Error,
    store::{AggregateRow, Aggregation, TransactionFilter, TransactionStore},
    transaction::{Transaction, TransactionBuilder},
};

#[derive(Debug, Default)]
struct Inner {
    transactions: Vec<Transaction>,
    next_id: i64,
}

/// Stores transactions in a vector behind a read-write lock.
///
/// Filters are evaluated with [TransactionFilter::matches] and
/// aggregations with [GroupBy::key_for](crate::GroupBy::key_for), so this
/// store defines the reference behaviour the SQLite store is tested against.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn replace_all(&self, transactions: Vec<TransactionBuilder>) -> Result<usize, Error> {
        let mut inner = self
            .inner
            .write()
            .inspect_err(|error| tracing::error!("could not acquire store lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let first_id = inner.next_id + 1;
        let replacement: Vec<Transaction> = transactions
            .into_iter()
            .zip(first_id..)
            .map(|(builder, id)| builder.finalise(id))
            .collect();

        inner.next_id += replacement.len() as i64;
        inner.transactions = replacement;

        Ok(inner.transactions.len())
    }

    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let inner = self.read()?;

        Ok(inner
            .transactions
            .iter()
            .filter(|transaction| filter.matches(transaction))
            .count() as u64)
    }

    fn find(
        &self,
        filter: &TransactionFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>, Error> {
        let inner = self.read()?;

        Ok(inner
            .transactions
            .iter()
            .filter(|transaction| filter.matches(transaction))
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn aggregate(&self, aggregation: &Aggregation) -> Result<Vec<AggregateRow>, Error> {
        let inner = self.read()?;
        let mut groups = HashMap::new();

        for transaction in inner
            .transactions
            .iter()
            .filter(|transaction| aggregation.filter.matches(transaction))
        {
            let key = aggregation.group_by.key_for(transaction);
            let (count, total_price) = groups.entry(key).or_insert((0u64, 0.0));
            *count += 1;
            *total_price += transaction.price.unwrap_or_default();
        }

        Ok(groups
            .into_iter()
            .map(|(key, (count, total_price))| AggregateRow {
                key,
                count,
                total_price,
            })
            .collect())
    }
}

impl InMemoryTransactionStore {
    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, Error> {
        self.inner
            .read()
            .inspect_err(|error| tracing::error!("could not acquire store lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        store::{Aggregation, GroupBy, GroupKey, TransactionFilter, TransactionStore},
        transaction::Transaction,
    };

    use super::InMemoryTransactionStore;

    #[test]
    fn replace_all_assigns_fresh_ids() {
        let store = InMemoryTransactionStore::new();
        let date = datetime!(2024-03-15 0:00 UTC);
        store
            .replace_all(vec![
                Transaction::build("a", 1.0, date),
                Transaction::build("b", 2.0, date),
            ])
            .expect("Could not seed store");

        store
            .replace_all(vec![Transaction::build("c", 3.0, date)])
            .expect("Could not reseed store");

        let got = store
            .find(&TransactionFilter::All, 0, 10)
            .expect("Could not query store");
        assert_eq!(got, vec![Transaction::build("c", 3.0, date).finalise(3)]);
    }

    #[test]
    fn total_price_ignores_missing_prices() {
        let store = InMemoryTransactionStore::new();
        let date = datetime!(2024-03-15 0:00 UTC);
        store
            .replace_all(vec![
                Transaction::build("a", 1.5, date),
                Transaction::build("b", 0.0, date).price(None),
            ])
            .expect("Could not seed store");

        let rows = store
            .aggregate(&Aggregation {
                filter: TransactionFilter::All,
                group_by: GroupBy::Nothing,
            })
            .expect("Could not aggregate");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, GroupKey::All);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].total_price, 1.5);
    }
}
