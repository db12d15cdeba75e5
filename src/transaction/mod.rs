//! Transaction records and the paginated listing of them.
//!
//! This module contains:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The query service and route handler for listing transactions

mod core;
mod list;

pub use core::{Transaction, TransactionBuilder};
pub use list::{
    ListQuery, PageRequest, TransactionPage, TransactionsState, get_transactions_endpoint,
    list_transactions,
};
