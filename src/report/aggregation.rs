//! Reductions over month-scoped sale rows for the statistics and chart reports.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::product::SaleRow;

/// The width of each price range in the price histogram.
const BUCKET_WIDTH: u32 = 100;

/// Prices at or above this go in the overflow bucket.
const OVERFLOW_START: u32 = 900;

/// The label of the bucket for prices at or above [OVERFLOW_START].
pub(super) const OVERFLOW_LABEL: &str = "901-above";

/// Sale totals for a month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of the products that sold.
    pub total_sale_amount: f64,
    /// How many products sold.
    pub total_sold_items: u64,
    /// How many products did not sell.
    pub total_not_sold_items: u64,
}

/// One bar or slice of a chart: a group key and how many products fall in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry<K> {
    /// The group key.
    #[serde(rename = "_id")]
    pub id: K,
    /// The number of products in the group.
    pub item_count: u64,
}

/// A price range in the price histogram.
///
/// Serializes as the range's lower bound, e.g. `100` for `[100, 200)`, or as
/// `"901-above"` for the overflow bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriceBucket {
    /// Prices from the lower bound up to, but not including, the lower bound plus 100.
    From(u32),
    /// Prices of 900 and above.
    Overflow,
}

impl PriceBucket {
    /// The bucket that `price` falls in.
    ///
    /// Prices that are not in any range (negative or NaN) go in the overflow bucket.
    pub fn for_price(price: f64) -> Self {
        if !(0.0..f64::from(OVERFLOW_START)).contains(&price) {
            return PriceBucket::Overflow;
        }

        // Truncation is intended: the price is in [0, 900) so the quotient is in 0..=8.
        let index = (price / f64::from(BUCKET_WIDTH)).floor() as u32;
        PriceBucket::From(index * BUCKET_WIDTH)
    }
}

impl Serialize for PriceBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PriceBucket::From(lower_bound) => serializer.serialize_u32(*lower_bound),
            PriceBucket::Overflow => serializer.serialize_str(OVERFLOW_LABEL),
        }
    }
}

/// Sums the sold amount and counts sold and unsold products.
///
/// Returns zeroed statistics for no rows.
pub fn summarize_sales(rows: &[SaleRow]) -> Statistics {
    rows.iter().fold(Statistics::default(), |mut stats, row| {
        if row.sold {
            stats.total_sale_amount += row.price;
            stats.total_sold_items += 1;
        } else {
            stats.total_not_sold_items += 1;
        }

        stats
    })
}

/// Counts products per price range, in ascending order with the overflow bucket last.
///
/// Ranges with no products are left out.
pub fn bucket_by_price(rows: &[SaleRow]) -> Vec<ChartEntry<PriceBucket>> {
    let mut counts: BTreeMap<PriceBucket, u64> = BTreeMap::new();

    for row in rows {
        *counts.entry(PriceBucket::for_price(row.price)).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(id, item_count)| ChartEntry { id, item_count })
        .collect()
}

/// Counts products per category, ordered by category name.
pub fn count_by_category(rows: &[SaleRow]) -> Vec<ChartEntry<String>> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();

    for row in rows {
        *counts.entry(row.category.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(category, item_count)| ChartEntry {
            id: category.to_owned(),
            item_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::product::SaleRow;

    use super::{
        ChartEntry, PriceBucket, Statistics, bucket_by_price, count_by_category, summarize_sales,
    };

    fn create_test_row(price: f64, category: &str, sold: bool) -> SaleRow {
        SaleRow {
            price,
            category: category.to_owned(),
            sold,
        }
    }

    #[test]
    fn summarize_sales_totals_sold_and_unsold() {
        let rows = vec![
            create_test_row(50.0, "toys", true),
            create_test_row(950.0, "tools", false),
            create_test_row(25.5, "toys", true),
        ];

        let got = summarize_sales(&rows);

        assert_eq!(
            got,
            Statistics {
                total_sale_amount: 75.5,
                total_sold_items: 2,
                total_not_sold_items: 1,
            }
        );
        assert_eq!(
            got.total_sold_items + got.total_not_sold_items,
            rows.len() as u64
        );
    }

    #[test]
    fn summarize_sales_is_zero_for_no_rows() {
        assert_eq!(summarize_sales(&[]), Statistics::default());
    }

    #[test]
    fn buckets_prices_by_hundreds() {
        assert_eq!(PriceBucket::for_price(0.0), PriceBucket::From(0));
        assert_eq!(PriceBucket::for_price(99.99), PriceBucket::From(0));
        assert_eq!(PriceBucket::for_price(100.0), PriceBucket::From(100));
        assert_eq!(PriceBucket::for_price(450.0), PriceBucket::From(400));
        assert_eq!(PriceBucket::for_price(899.99), PriceBucket::From(800));
        assert_eq!(PriceBucket::for_price(900.0), PriceBucket::Overflow);
        assert_eq!(PriceBucket::for_price(10_000.0), PriceBucket::Overflow);
        assert_eq!(PriceBucket::for_price(-1.0), PriceBucket::Overflow);
        assert_eq!(PriceBucket::for_price(f64::NAN), PriceBucket::Overflow);
    }

    #[test]
    fn bucket_by_price_omits_empty_buckets_and_sorts_overflow_last() {
        let rows = vec![
            create_test_row(950.0, "a", false),
            create_test_row(50.0, "a", true),
            create_test_row(250.0, "a", true),
            create_test_row(299.0, "a", true),
        ];

        let got = bucket_by_price(&rows);

        assert_eq!(
            got,
            vec![
                ChartEntry {
                    id: PriceBucket::From(0),
                    item_count: 1
                },
                ChartEntry {
                    id: PriceBucket::From(200),
                    item_count: 2
                },
                ChartEntry {
                    id: PriceBucket::Overflow,
                    item_count: 1
                },
            ]
        );
        let total: u64 = got.iter().map(|entry| entry.item_count).sum();
        assert_eq!(total, rows.len() as u64);
    }

    #[test]
    fn price_buckets_serialize_as_lower_bound_or_overflow_label() {
        let entries = bucket_by_price(&[
            create_test_row(150.0, "a", true),
            create_test_row(901.0, "a", true),
        ]);

        assert_eq!(
            serde_json::to_value(&entries).unwrap(),
            json!([
                { "_id": 100, "itemCount": 1 },
                { "_id": "901-above", "itemCount": 1 },
            ])
        );
    }

    #[test]
    fn count_by_category_groups_and_sorts_by_name() {
        let rows = vec![
            create_test_row(1.0, "men's clothing", true),
            create_test_row(2.0, "electronics", false),
            create_test_row(3.0, "men's clothing", false),
        ];

        let got = count_by_category(&rows);

        assert_eq!(
            serde_json::to_value(&got).unwrap(),
            json!([
                { "_id": "electronics", "itemCount": 1 },
                { "_id": "men's clothing", "itemCount": 2 },
            ])
        );
    }

    #[test]
    fn count_by_category_is_empty_for_no_rows() {
        assert!(count_by_category(&[]).is_empty());
    }
}
