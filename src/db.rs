//! Sets up the SQLite database used by [SQLiteTransactionStore](crate::SQLiteTransactionStore).

use rusqlite::{Connection, Transaction as SqlTransaction};

/// Create the transaction table and its indexes if they do not exist yet.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                title_folded TEXT NOT NULL,
                description_folded TEXT NOT NULL,
                price REAL,
                category TEXT,
                image TEXT,
                date_of_sale TEXT,
                sale_month INTEGER,
                is_sold INTEGER
                )",
        (),
    )?;

    // The month of sale is the filter for every query except search.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_sale_month ON \"transaction\"(sale_month);",
        (),
    )?;

    Ok(())
}
