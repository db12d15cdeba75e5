//! Defines the core data model for transactions.

use serde::{Deserialize, Serialize};
use time::{Month, OffsetDateTime, UtcOffset};

use crate::database_id::TransactionId;

// ============================================================================
// MODELS
// ============================================================================

/// A product sale record.
///
/// To create a new `Transaction`, use [Transaction::build] and hand the
/// builder to a [TransactionStore](crate::TransactionStore), which assigns the ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    #[serde(rename = "_id")]
    pub id: TransactionId,
    /// The name of the product that was sold.
    pub title: String,
    /// A free-form description of the product.
    pub description: String,
    /// The sale price. Non-negative in practice, but not enforced.
    pub price: Option<f64>,
    /// The product category label, e.g. "electronics".
    pub category: Option<String>,
    /// A URL to an image of the product.
    pub image: Option<String>,
    /// When the product was sold, in UTC.
    ///
    /// Only the calendar month is used when querying.
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub date_of_sale: Option<OffsetDateTime>,
    /// Whether the product was sold. Kept for completeness, no query reads it.
    pub is_sold: Option<bool>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(title: &str, price: f64, date_of_sale: OffsetDateTime) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            description: String::new(),
            price: Some(price),
            category: None,
            image: None,
            date_of_sale: Some(date_of_sale.to_offset(UtcOffset::UTC)),
            is_sold: None,
        }
    }

    /// The calendar month (UTC) the transaction was sold in, if it has a date.
    pub fn sale_month(&self) -> Option<Month> {
        self.date_of_sale.map(|date| date.month())
    }
}

/// A builder for transactions that have not been saved to a store yet.
///
/// Every field apart from the title and description may be absent, which
/// mirrors what the upstream seed data tolerates.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The name of the product that was sold.
    pub title: String,
    /// A free-form description of the product.
    pub description: String,
    /// The sale price.
    pub price: Option<f64>,
    /// The product category label.
    pub category: Option<String>,
    /// A URL to an image of the product.
    pub image: Option<String>,
    /// When the product was sold, always stored in UTC.
    pub date_of_sale: Option<OffsetDateTime>,
    /// Whether the product was sold.
    pub is_sold: Option<bool>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    /// Set the image URL for the transaction.
    pub fn image(mut self, image: &str) -> Self {
        self.image = Some(image.to_owned());
        self
    }

    /// Set whether the product was sold.
    pub fn sold(mut self, is_sold: bool) -> Self {
        self.is_sold = Some(is_sold);
        self
    }

    /// Set or clear the price for the transaction.
    pub fn price(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self
    }

    /// Set or clear the date of sale. The date is converted to UTC.
    pub fn date_of_sale(mut self, date_of_sale: Option<OffsetDateTime>) -> Self {
        self.date_of_sale = date_of_sale.map(|date| date.to_offset(UtcOffset::UTC));
        self
    }

    /// The calendar month (UTC) the transaction was sold in, if it has a date.
    pub fn sale_month(&self) -> Option<Month> {
        self.date_of_sale.map(|date| date.month())
    }

    /// Create the [Transaction] with the store assigned `id`.
    pub fn finalise(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            image: self.image,
            date_of_sale: self.date_of_sale,
            is_sold: self.is_sold,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::datetime};

    use super::Transaction;

    #[test]
    fn build_normalises_date_to_utc() {
        // 01:30 on the 1st of April in UTC+05:30 is still March in UTC.
        let transaction = Transaction::build("Widget", 50.0, datetime!(2024-04-01 1:30 +5:30));

        assert_eq!(transaction.sale_month(), Some(Month::March));
        assert_eq!(
            transaction.date_of_sale,
            Some(datetime!(2024-03-31 20:00 UTC))
        );
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let transaction = Transaction::build("Widget", 50.0, datetime!(2024-03-15 0:00 UTC))
            .category("Tools")
            .finalise(7);

        let json = serde_json::to_value(&transaction).expect("Could not serialize transaction");

        assert_eq!(json["_id"], 7);
        assert_eq!(json["title"], "Widget");
        assert_eq!(json["price"], 50.0);
        assert_eq!(json["category"], "Tools");
        assert_eq!(json["dateOfSale"], "2024-03-15T00:00:00Z");
        assert!(json["isSold"].is_null());
    }

    #[test]
    fn transaction_without_date_has_no_month() {
        let transaction = Transaction::build("Widget", 50.0, datetime!(2024-03-15 0:00 UTC))
            .date_of_sale(None)
            .finalise(1);

        assert_eq!(transaction.sale_month(), None);
    }
}
