//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{
    Connection, Row, params_from_iter,
    types::{Type, Value},
};
use time::Month;

use crate::{
    Error,
    db::initialize,
    store::{
        AggregateRow, Aggregation, GroupBy, GroupKey, TransactionFilter, TransactionStore,
        fold_case,
    },
    transaction::{Transaction, TransactionBuilder},
};

const SELECT_COLUMNS: &str =
    "id, title, description, price, category, image, date_of_sale, is_sold";

/// Stores transactions in a SQLite database.
///
/// Filters and aggregations are compiled to parameterised SQL, so the
/// database does the heavy lifting. The month of sale is stored in its own
/// indexed column when a transaction is inserted.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The connection must have been set up with [initialize].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Create a store backed by a fresh in-memory SQLite database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database cannot be initialized.
    pub fn open_in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory()?;
        initialize(&connection)?;

        Ok(Self::new(Arc::new(Mutex::new(connection))))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }

    fn query_rows<T>(
        &self,
        query: &str,
        parameters: &[Value],
        map_row: impl FnMut(&Row) -> Result<T, rusqlite::Error>,
    ) -> Result<Vec<T>, Error> {
        let connection = self.lock()?;
        let mut statement = connection.prepare(query)?;
        let rows = statement
            .query_map(params_from_iter(parameters.iter()), map_row)?
            .map(|row| row.map_err(Error::from))
            .collect();

        rows
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Replace the contents of the transaction table inside a single SQLite
    /// transaction, so readers never observe a half-seeded table.
    ///
    /// # Errors
    /// Returns an [Error::StoreWrite] if any statement fails, in which case
    /// the previous contents are kept.
    fn replace_all(&self, transactions: Vec<TransactionBuilder>) -> Result<usize, Error> {
        let write_error = |error: rusqlite::Error| {
            tracing::error!("could not replace transactions: {error}");
            Error::StoreWrite(error.to_string())
        };

        let mut connection = self.lock()?;
        let tx = connection.transaction().map_err(write_error)?;

        tx.execute("DELETE FROM \"transaction\"", ())
            .map_err(write_error)?;

        {
            let mut statement = tx
                .prepare(
                    "INSERT INTO \"transaction\"
                    (title, description, title_folded, description_folded,
                    price, category, image, date_of_sale, sale_month, is_sold)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .map_err(write_error)?;

            for transaction in &transactions {
                statement
                    .execute((
                        &transaction.title,
                        &transaction.description,
                        fold_case(&transaction.title),
                        fold_case(&transaction.description),
                        transaction.price,
                        &transaction.category,
                        &transaction.image,
                        transaction.date_of_sale,
                        transaction.sale_month().map(u8::from),
                        transaction.is_sold,
                    ))
                    .map_err(write_error)?;
            }
        }

        tx.commit().map_err(write_error)?;

        Ok(transactions.len())
    }

    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let mut parameters = Vec::new();
        let where_clause = compile_filter(filter, &mut parameters);
        let query = format!("SELECT COUNT(*) FROM \"transaction\" WHERE {where_clause}");

        let count = self.lock()?.query_row(
            &query,
            params_from_iter(parameters.iter()),
            |row| get_count(row, 0),
        )?;

        Ok(count)
    }

    fn find(
        &self,
        filter: &TransactionFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>, Error> {
        let mut parameters = Vec::new();
        let where_clause = compile_filter(filter, &mut parameters);

        parameters.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        let limit_index = parameters.len();
        parameters.push(Value::Integer(i64::try_from(skip).unwrap_or(i64::MAX)));
        let offset_index = parameters.len();

        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE {where_clause} \
            ORDER BY id ASC LIMIT ?{limit_index} OFFSET ?{offset_index}"
        );

        self.query_rows(&query, &parameters, map_transaction_row)
    }

    fn aggregate(&self, aggregation: &Aggregation) -> Result<Vec<AggregateRow>, Error> {
        let mut parameters = Vec::new();
        let where_clause = compile_filter(&aggregation.filter, &mut parameters);

        match &aggregation.group_by {
            GroupBy::Nothing => {
                let query = format!(
                    "SELECT COUNT(*), TOTAL(price) FROM \"transaction\" WHERE {where_clause}"
                );
                let rows = self.query_rows(&query, &parameters, |row| {
                    Ok(AggregateRow {
                        key: GroupKey::All,
                        count: get_count(row, 0)?,
                        total_price: row.get(1)?,
                    })
                })?;

                Ok(rows.into_iter().filter(|row| row.count > 0).collect())
            }
            GroupBy::Category => {
                let query = format!(
                    "SELECT category, COUNT(*), TOTAL(price) FROM \"transaction\" \
                    WHERE {where_clause} GROUP BY category"
                );

                self.query_rows(&query, &parameters, |row| {
                    Ok(AggregateRow {
                        key: GroupKey::Category(row.get(0)?),
                        count: get_count(row, 1)?,
                        total_price: row.get(2)?,
                    })
                })
            }
            GroupBy::PriceBuckets { boundaries } => {
                let bucket_expression = compile_price_buckets(boundaries, &mut parameters);
                let query = format!(
                    "SELECT {bucket_expression} AS bucket, COUNT(*), TOTAL(price) \
                    FROM \"transaction\" WHERE {where_clause} GROUP BY bucket"
                );

                self.query_rows(&query, &parameters, |row| {
                    let bucket: i64 = row.get(0)?;
                    let key = usize::try_from(bucket).map_or(GroupKey::Overflow, GroupKey::Bucket);

                    Ok(AggregateRow {
                        key,
                        count: get_count(row, 1)?,
                        total_price: row.get(2)?,
                    })
                })
            }
        }
    }
}

/// Translate `filter` into a SQL boolean expression.
///
/// Values are appended to `parameters` and referenced by their 1-based
/// position, so the expression can be combined with further parameters.
fn compile_filter(filter: &TransactionFilter, parameters: &mut Vec<Value>) -> String {
    match filter {
        TransactionFilter::All => "1".to_owned(),
        TransactionFilter::SoldIn(month) => {
            parameters.push(month_value(*month));
            format!("sale_month = ?{}", parameters.len())
        }
        TransactionFilter::SoldOutside(month) => {
            // `IS NOT` so that rows without a date of sale are included.
            parameters.push(month_value(*month));
            format!("sale_month IS NOT ?{}", parameters.len())
        }
        TransactionFilter::TitleContains(text) => {
            parameters.push(Value::Text(like_pattern(text)));
            format!("title_folded LIKE ?{} ESCAPE '\\'", parameters.len())
        }
        TransactionFilter::DescriptionContains(text) => {
            parameters.push(Value::Text(like_pattern(text)));
            format!("description_folded LIKE ?{} ESCAPE '\\'", parameters.len())
        }
        TransactionFilter::PriceBetween { min, max } => {
            parameters.push(Value::Real(*min));
            parameters.push(Value::Real(*max));
            format!(
                "price BETWEEN ?{} AND ?{}",
                parameters.len() - 1,
                parameters.len()
            )
        }
        TransactionFilter::AnyOf(filters) if filters.is_empty() => "0".to_owned(),
        TransactionFilter::AnyOf(filters) => {
            let clauses: Vec<String> = filters
                .iter()
                .map(|filter| compile_filter(filter, parameters))
                .collect();

            format!("({})", clauses.join(" OR "))
        }
    }
}

/// Build a `CASE` expression that yields the bucket index of `price`, or -1
/// when the price is outside every bucket or missing.
fn compile_price_buckets(boundaries: &[f64], parameters: &mut Vec<Value>) -> String {
    let mut arms = Vec::new();

    for (index, bounds) in boundaries.windows(2).enumerate() {
        parameters.push(Value::Real(bounds[0]));
        parameters.push(Value::Real(bounds[1]));
        arms.push(format!(
            "WHEN price >= ?{} AND price < ?{} THEN {index}",
            parameters.len() - 1,
            parameters.len()
        ));
    }

    if arms.is_empty() {
        "-1".to_owned()
    } else {
        format!("CASE {} ELSE -1 END", arms.join(" "))
    }
}

fn month_value(month: Month) -> Value {
    Value::Integer(i64::from(u8::from(month)))
}

/// Wrap the case-folded `text` in wildcards, escaping the LIKE metacharacters
/// it contains.
///
/// SQLite's `LIKE` only ignores ASCII case, so text is matched against the
/// `*_folded` columns, which hold [fold_case] of the original text.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');

    for c in fold_case(text).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

/// Read a `COUNT(*)` column, which SQLite returns as a signed integer.
fn get_count(row: &Row, index: usize) -> Result<u64, rusqlite::Error> {
    let count: i64 = row.get(index)?;

    u64::try_from(count).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        image: row.get(5)?,
        date_of_sale: row.get(6)?,
        is_sold: row.get(7)?,
    })
}
