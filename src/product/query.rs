//! Month-scoped queries over stored product transactions.

use rusqlite::Connection;

use crate::{Error, month::Month};

use super::core::{ProductTransaction, map_product_row};

/// Which page of search results to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of rows on a page.
    pub per_page: u64,
}

impl PageRequest {
    fn offset(self) -> i64 {
        clamp_to_i64(self.page.saturating_sub(1).saturating_mul(self.per_page))
    }

    fn limit(self) -> i64 {
        clamp_to_i64(self.per_page)
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Get one page of the product transactions sold in `month` that match `search`.
///
/// A row matches when its title or description contains `search`, ignoring
/// ASCII case, or when the text form of its price contains `search`. An empty
/// `search` matches every row. Rows come back in store order.
///
/// If `month` is `None` no rows match.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_products_page(
    month: Option<Month>,
    search: &str,
    page: PageRequest,
    connection: &Connection,
) -> Result<Vec<ProductTransaction>, Error> {
    let Some(month) = month else {
        return Ok(Vec::new());
    };

    let search_pattern = format!("%{}%", escape_like(search));

    // The price clause compares against the text form of a numeric column,
    // e.g. a search for "9.9" matches a price of 329.95. Whole prices are written
    // without a fractional part, so 15.0 reads as "15".
    connection
        .prepare(
            "SELECT id, title, description, price, category, date_of_sale, sold \
            FROM product_transaction \
            WHERE date_of_sale GLOB ?1 \
            AND (title LIKE ?2 ESCAPE '\\' \
                OR description LIKE ?2 ESCAPE '\\' \
                OR CASE WHEN price = CAST(price AS INTEGER) \
                    THEN CAST(CAST(price AS INTEGER) AS TEXT) \
                    ELSE CAST(price AS TEXT) END LIKE ?2 ESCAPE '\\') \
            ORDER BY id ASC \
            LIMIT ?3 OFFSET ?4",
        )?
        .query_map(
            (
                month.date_pattern(),
                search_pattern,
                page.limit(),
                page.offset(),
            ),
            map_product_row,
        )?
        .map(|row| row.map_err(Error::SqlError))
        .collect()
}

/// Escape the `LIKE` wildcards in `text` so it matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// The fields of a product transaction that the reports aggregate over.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    /// The listed price.
    pub price: f64,
    /// The product category.
    pub category: String,
    /// Whether the product sold.
    pub sold: bool,
}

/// Get the price, category and sale status of every product transaction sold in `month`.
///
/// If `month` is `None` no rows match.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_sale_rows(month: Option<Month>, connection: &Connection) -> Result<Vec<SaleRow>, Error> {
    let Some(month) = month else {
        return Ok(Vec::new());
    };

    connection
        .prepare(
            "SELECT price, category, sold FROM product_transaction \
            WHERE date_of_sale GLOB ?1 \
            ORDER BY id ASC",
        )?
        .query_map([month.date_pattern()], |row| {
            Ok(SaleRow {
                price: row.get(0)?,
                category: row.get(1)?,
                sold: row.get(2)?,
            })
        })?
        .map(|row| row.map_err(Error::SqlError))
        .collect()
}
