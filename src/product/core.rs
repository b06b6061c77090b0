//! Defines the core data models and database queries for product transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// A product listing and whether it sold, as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTransaction {
    /// The ID assigned by the database.
    #[serde(rename = "_id")]
    pub id: DatabaseId,
    /// The product name.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The listed price, never negative.
    pub price: f64,
    /// The product category, e.g. "electronics".
    pub category: String,
    /// When the sale happened, kept as the `YYYY-MM-DD...` text from the feed.
    pub date_of_sale: String,
    /// Whether the product sold.
    pub sold: bool,
}

/// A product transaction that has been normalized but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductTransaction {
    /// The product name.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The listed price, never negative.
    pub price: f64,
    /// The product category.
    pub category: String,
    /// When the sale happened.
    pub date_of_sale: String,
    /// Whether the product sold.
    pub sold: bool,
}

impl NewProductTransaction {
    /// Shortcut for tests and fixtures that only care about price, date and sale status.
    #[cfg(test)]
    pub fn sample(price: f64, date_of_sale: &str, sold: bool) -> Self {
        Self {
            title: "Sample product".to_owned(),
            description: "A product used in tests".to_owned(),
            price,
            category: "sample".to_owned(),
            date_of_sale: date_of_sale.to_owned(),
            sold,
        }
    }

    /// Set the title.
    #[cfg(test)]
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    /// Set the description.
    #[cfg(test)]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the category.
    #[cfg(test)]
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the product transaction table.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_product_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS product_transaction (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL CHECK (price >= 0),
                category TEXT NOT NULL,
                date_of_sale TEXT NOT NULL,
                sold INTEGER NOT NULL CHECK (sold IN (0, 1))
                )",
        (),
    )?;

    // Every report filters on the date of sale.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_product_transaction_date_of_sale \
        ON product_transaction(date_of_sale);",
        (),
    )?;

    Ok(())
}

/// Replace every stored product transaction with `products`.
///
/// The existing rows are deleted first and the new rows inserted afterwards.
/// The two steps are not atomic: if the insert fails the table is left empty.
///
/// Returns the number of rows inserted.
///
/// # Errors
/// Returns an [Error::SqlError] if either step fails.
pub fn replace_all_products(
    products: &[NewProductTransaction],
    connection: &Connection,
) -> Result<usize, Error> {
    let deleted = connection.execute("DELETE FROM product_transaction", ())?;
    tracing::debug!("deleted {deleted} product transactions");

    let tx = connection.unchecked_transaction()?;

    // Prepare the insert statement once for reuse
    let mut stmt = tx.prepare(
        "INSERT INTO product_transaction (title, description, price, category, date_of_sale, sold)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    let mut inserted = 0;
    for product in products {
        inserted += stmt.execute((
            &product.title,
            &product.description,
            product.price,
            &product.category,
            &product.date_of_sale,
            product.sold,
        ))?;
    }

    drop(stmt);
    tx.commit()?;

    Ok(inserted)
}

/// Map a database row to a [ProductTransaction].
///
/// Expects the columns `id, title, description, price, category, date_of_sale, sold` in that order.
pub fn map_product_row(row: &Row) -> Result<ProductTransaction, rusqlite::Error> {
    Ok(ProductTransaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        date_of_sale: row.get(5)?,
        sold: row.get(6)?,
    })
}

/// Get every stored product transaction in store order.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
#[cfg(test)]
pub fn get_all_products(connection: &Connection) -> Result<Vec<ProductTransaction>, Error> {
    connection
        .prepare(
            "SELECT id, title, description, price, category, date_of_sale, sold \
            FROM product_transaction ORDER BY id ASC",
        )?
        .query_map([], map_product_row)?
        .map(|row| row.map_err(Error::SqlError))
        .collect()
}
