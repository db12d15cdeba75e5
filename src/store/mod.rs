//! Defines the transaction store trait and the engine-agnostic query types
//! that the services use to talk to it.
//!
//! A store only has to understand [TransactionFilter] and [Aggregation]; it is
//! free to evaluate them however its backing engine prefers.

mod memory;
mod sqlite;

use std::{fmt::Debug, sync::Arc};

use time::Month;

use crate::{
    Error,
    transaction::{Transaction, TransactionBuilder},
};

pub use memory::InMemoryTransactionStore;
pub use sqlite::SQLiteTransactionStore;

/// The store handle shared by every request handler.
pub type SharedStore = Arc<dyn TransactionStore>;

/// Handles the persistence and querying of transactions.
pub trait TransactionStore: Debug + Send + Sync {
    /// Delete every transaction and insert `transactions` in their place.
    ///
    /// Returns the number of transactions inserted. Implementers should make
    /// the swap as atomic as their engine allows.
    ///
    /// # Errors
    /// Returns [Error::StoreWrite] if the transactions could not be persisted.
    fn replace_all(&self, transactions: Vec<TransactionBuilder>) -> Result<usize, Error>;

    /// Count the transactions that match `filter`.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error>;

    /// Retrieve up to `limit` transactions that match `filter`, skipping the
    /// first `skip` matches.
    ///
    /// Transactions are returned in the order they were inserted.
    fn find(
        &self,
        filter: &TransactionFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>, Error>;

    /// Group the transactions that match `aggregation.filter` and count them.
    ///
    /// The order of the returned rows is unspecified.
    fn aggregate(&self, aggregation: &Aggregation) -> Result<Vec<AggregateRow>, Error>;
}

/// A predicate over transactions.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionFilter {
    /// Matches every transaction.
    All,
    /// Sold in the given calendar month of any year.
    SoldIn(Month),
    /// Not sold in the given calendar month. Transactions without a date of
    /// sale match.
    SoldOutside(Month),
    /// The title contains the text, ignoring case (Unicode lowercase).
    TitleContains(String),
    /// The description contains the text, ignoring case (Unicode lowercase).
    DescriptionContains(String),
    /// The price lies within `min..=max`. Transactions without a price never match.
    PriceBetween {
        /// The inclusive lower bound.
        min: f64,
        /// The inclusive upper bound.
        max: f64,
    },
    /// Matches if any of the inner filters match. An empty list matches nothing.
    AnyOf(Vec<TransactionFilter>),
}

impl TransactionFilter {
    /// Evaluate the filter against a single transaction.
    ///
    /// Stores that cannot push the filter down to their engine can use this
    /// directly, the other stores must agree with it.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::SoldIn(month) => transaction.sale_month() == Some(*month),
            TransactionFilter::SoldOutside(month) => transaction.sale_month() != Some(*month),
            TransactionFilter::TitleContains(text) => {
                contains_ignore_case(&transaction.title, text)
            }
            TransactionFilter::DescriptionContains(text) => {
                contains_ignore_case(&transaction.description, text)
            }
            TransactionFilter::PriceBetween { min, max } => transaction
                .price
                .is_some_and(|price| *min <= price && price <= *max),
            TransactionFilter::AnyOf(filters) => {
                filters.iter().any(|filter| filter.matches(transaction))
            }
        }
    }
}

/// The case-insensitive form of `text` used for searching.
///
/// Uses Unicode lowercasing, so "CAFÉ" and "café" compare equal.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    fold_case(haystack).contains(&fold_case(needle))
}

/// A declarative filter-then-group query.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Only transactions matching this filter are grouped.
    pub filter: TransactionFilter,
    /// How the matching transactions are grouped.
    pub group_by: GroupBy,
}

/// The grouping stage of an [Aggregation].
#[derive(Debug, Clone, PartialEq)]
pub enum GroupBy {
    /// A single group over all matches. No row is produced if nothing matches.
    Nothing,
    /// One group per distinct category, including a group for no category.
    Category,
    /// Half-open price buckets: bucket `i` is `boundaries[i]..boundaries[i + 1]`.
    ///
    /// Transactions whose price falls outside every bucket, or that have no
    /// price, are grouped under [GroupKey::Overflow]. Empty buckets produce no row.
    PriceBuckets {
        /// Strictly increasing bucket boundaries.
        boundaries: Vec<f64>,
    },
}

impl GroupBy {
    /// The group a transaction falls into.
    pub fn key_for(&self, transaction: &Transaction) -> GroupKey {
        match self {
            GroupBy::Nothing => GroupKey::All,
            GroupBy::Category => GroupKey::Category(transaction.category.clone()),
            GroupBy::PriceBuckets { boundaries } => transaction
                .price
                .and_then(|price| {
                    boundaries
                        .windows(2)
                        .position(|bounds| bounds[0] <= price && price < bounds[1])
                })
                .map_or(GroupKey::Overflow, GroupKey::Bucket),
        }
    }
}

/// Identifies the group an [AggregateRow] summarises.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// The single group of [GroupBy::Nothing].
    All,
    /// A category group of [GroupBy::Category].
    Category(Option<String>),
    /// The index of a price bucket of [GroupBy::PriceBuckets].
    Bucket(usize),
    /// Prices outside every bucket of [GroupBy::PriceBuckets].
    Overflow,
}

/// The summary of one group produced by [TransactionStore::aggregate].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    /// Which group this row summarises.
    pub key: GroupKey,
    /// The number of transactions in the group.
    pub count: u64,
    /// The sum of the prices in the group, ignoring missing prices.
    pub total_price: f64,
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::datetime};

    use crate::{
        store::{GroupBy, GroupKey, InMemoryTransactionStore, SQLiteTransactionStore},
        transaction::Transaction,
    };

    use super::{Aggregation, TransactionFilter, TransactionStore};

    fn stores() -> Vec<(&'static str, Box<dyn TransactionStore>)> {
        vec![
            ("memory", Box::new(InMemoryTransactionStore::new())),
            (
                "sqlite",
                Box::new(SQLiteTransactionStore::open_in_memory().expect("Could not open SQLite")),
            ),
        ]
    }

    fn seed(store: &dyn TransactionStore) {
        let transactions = vec![
            Transaction::build("Mens Cotton Jacket", 55.99, datetime!(2022-03-27 20:29 UTC))
                .description("Great outerwear jackets for Spring")
                .category("men's clothing"),
            Transaction::build("Solid Gold Petite", 168.0, datetime!(2021-03-10 9:00 UTC))
                .description("Satisfaction Guaranteed 100%_off")
                .category("jewelery"),
            Transaction::build("SanDisk SSD", 109.0, datetime!(2022-07-27 20:29 UTC))
                .description("Easy upgrade")
                .category("electronics"),
            Transaction::build("No date", 10.0, datetime!(2022-03-01 0:00 UTC))
                .date_of_sale(None),
            Transaction::build("No price", 0.0, datetime!(2022-03-02 0:00 UTC)).price(None),
            Transaction::build("Café au lait mug", 250.0, datetime!(2022-05-02 0:00 UTC))
                .description("Holds a crème brûlée too"),
        ];

        store
            .replace_all(transactions)
            .expect("Could not seed store");
    }

    #[test]
    fn filters_agree_across_stores() {
        let cases = [
            (TransactionFilter::All, 6),
            (TransactionFilter::SoldIn(Month::March), 3),
            (TransactionFilter::SoldOutside(Month::March), 3),
            (TransactionFilter::TitleContains("jACKET".to_owned()), 1),
            (TransactionFilter::TitleContains("CAFÉ".to_owned()), 1),
            (TransactionFilter::DescriptionContains("CRÈME".to_owned()), 1),
            (TransactionFilter::DescriptionContains("100%_".to_owned()), 1),
            // Wildcards in the search text are literal.
            (TransactionFilter::DescriptionContains("100%x".to_owned()), 0),
            (TransactionFilter::TitleContains("_".to_owned()), 0),
            (TransactionFilter::PriceBetween { min: 55.99, max: 109.0 }, 2),
            (TransactionFilter::AnyOf(vec![]), 0),
            (
                TransactionFilter::AnyOf(vec![
                    TransactionFilter::TitleContains("ssd".to_owned()),
                    TransactionFilter::PriceBetween { min: 0.0, max: 20.0 },
                ]),
                2,
            ),
        ];

        for (name, store) in stores() {
            seed(store.as_ref());

            for (filter, want) in &cases {
                let got = store.count(filter).expect("Could not count");
                assert_eq!(got, *want, "{name} store: count for {filter:?}");

                let found = store.find(filter, 0, 100).expect("Could not find");
                assert_eq!(found.len() as u64, *want, "{name} store: find for {filter:?}");
                assert!(found.iter().all(|transaction| filter.matches(transaction)));
            }
        }
    }

    #[test]
    fn aggregations_agree_across_stores() {
        let aggregation = Aggregation {
            filter: TransactionFilter::SoldIn(Month::March),
            group_by: GroupBy::PriceBuckets {
                boundaries: vec![0.0, 101.0, 201.0],
            },
        };

        for (name, store) in stores() {
            seed(store.as_ref());

            let mut rows = store.aggregate(&aggregation).expect("Could not aggregate");
            rows.sort_by_key(|row| match row.key {
                GroupKey::Bucket(index) => index,
                _ => usize::MAX,
            });

            let keys_and_counts: Vec<_> = rows
                .iter()
                .map(|row| (row.key.clone(), row.count))
                .collect();
            assert_eq!(
                keys_and_counts,
                vec![
                    (GroupKey::Bucket(0), 1),
                    (GroupKey::Bucket(1), 1),
                    (GroupKey::Overflow, 1),
                ],
                "{name} store"
            );
        }
    }

    #[test]
    fn group_by_nothing_produces_no_row_without_matches() {
        let aggregation = Aggregation {
            filter: TransactionFilter::SoldIn(Month::December),
            group_by: GroupBy::Nothing,
        };

        for (name, store) in stores() {
            seed(store.as_ref());

            let rows = store.aggregate(&aggregation).expect("Could not aggregate");

            assert!(rows.is_empty(), "{name} store: got {rows:?}");
        }
    }

    #[test]
    fn price_bucket_boundaries_are_half_open() {
        let group_by = GroupBy::PriceBuckets {
            boundaries: vec![0.0, 101.0, 201.0],
        };
        let date = datetime!(2024-03-15 0:00 UTC);
        let cases = [
            (0.0, GroupKey::Bucket(0)),
            (100.5, GroupKey::Bucket(0)),
            (101.0, GroupKey::Bucket(1)),
            (201.0, GroupKey::Overflow),
            (-1.0, GroupKey::Overflow),
        ];

        for (price, want) in cases {
            let transaction = Transaction::build("", price, date).finalise(1);
            assert_eq!(group_by.key_for(&transaction), want, "price {price}");
        }
    }
}
