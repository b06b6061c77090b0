//! Fetching the remote product feed and normalizing its items.

use std::{fmt::Debug, future::Future, pin::Pin, time::Duration};

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, product::NewProductTransaction};

/// The feed that `/initialize` loads when no other source is configured.
pub const DEFAULT_SOURCE_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// One item of the product feed, before normalization.
///
/// Fields the feed carries but the service does not store (e.g. `id`, `image`) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    /// The product name.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The price as it appears in the feed: usually a number, sometimes a string or missing.
    #[serde(default)]
    pub price: Value,
    /// The product category.
    pub category: String,
    /// When the sale happened.
    pub date_of_sale: String,
    /// Whether the product sold.
    pub sold: bool,
}

/// A source of raw product transactions.
pub trait ProductFeed: Debug + Send + Sync {
    /// Fetch every item in the feed.
    ///
    /// # Errors
    /// Returns [Error::FeedError] if the feed could not be retrieved, or
    /// [Error::InvalidFeed] if its body is not a JSON array of products.
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Vec<RawProduct>, Error>> + Send + '_>>;
}

/// Fetches the product feed over HTTP.
#[derive(Debug, Clone)]
pub struct ReqwestProductFeed {
    client: reqwest::Client,
    url: String,
}

impl ReqwestProductFeed {
    /// Create a feed that fetches from `url`.
    ///
    /// # Errors
    /// Returns [Error::FeedError] if the HTTP client could not be built.
    pub fn new(url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("salesboard_rs/", env!("CARGO_PKG_VERSION")))
            .timeout(FEED_TIMEOUT)
            .build()
            .map_err(|error| Error::FeedError(format!("could not build HTTP client: {error}")))?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// The URL the feed is fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ProductFeed for ReqwestProductFeed {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Vec<RawProduct>, Error>> + Send + '_>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|error| {
                    if error.is_timeout() {
                        Error::FeedError(format!("request timeout: {error}"))
                    } else if error.is_connect() {
                        Error::FeedError(format!("connection failed: {error}"))
                    } else {
                        Error::FeedError(format!("request failed: {error}"))
                    }
                })?
                .error_for_status()
                .map_err(|error| Error::FeedError(error.to_string()))?;

            let body = response.text().await.map_err(|error| {
                Error::FeedError(format!("failed to read response body: {error}"))
            })?;

            parse_feed(&body)
        })
    }
}

/// Parse the body of the product feed.
///
/// # Errors
/// Returns [Error::InvalidFeed] if `body` is not a JSON array of products.
pub fn parse_feed(body: &str) -> Result<Vec<RawProduct>, Error> {
    serde_json::from_str(body).map_err(|error| Error::InvalidFeed(error.to_string()))
}

/// Turn raw feed items into records ready to store.
///
/// Prices are coerced with [coerce_price]; every other field passes through unchanged.
pub fn normalize_products(raw_products: Vec<RawProduct>) -> Vec<NewProductTransaction> {
    raw_products
        .into_iter()
        .map(|raw| NewProductTransaction {
            price: coerce_price(&raw.price),
            title: raw.title,
            description: raw.description,
            category: raw.category,
            date_of_sale: raw.date_of_sale,
            sold: raw.sold,
        })
        .filter(|product| !product.price.is_nan())
        .collect()
}

/// Read a price from the feed, defaulting to zero.
///
/// Numbers are used as is. Strings are read up to the end of their leading
/// decimal number, so `"12.5 USD"` is 12.5. Anything else, and any result that
/// is negative or not finite, becomes 0.
pub fn coerce_price(value: &Value) -> f64 {
    let price = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_leading_float(text),
        _ => None,
    };

    match price {
        Some(price) if price.is_finite() && price >= 0.0 => price,
        _ => 0.0,
    }
}

/// Parse the longest prefix of `text` (after leading whitespace) that is a decimal number.
fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let integer_digits = count_digits(&bytes[end..]);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(&bytes[end + 1..]);
        if integer_digits > 0 || fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }

    if integer_digits == 0 && fraction_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = count_digits(&bytes[exponent_end..]);
        if exponent_digits > 0 {
            end = exponent_end + exponent_digits;
        }
    }

    text[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

/// A feed that returns a fixed result, for tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) enum StaticProductFeed {
    Products(Vec<RawProduct>),
    Unavailable,
}

#[cfg(test)]
impl ProductFeed for StaticProductFeed {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Vec<RawProduct>, Error>> + Send + '_>> {
        Box::pin(async move {
            match self {
                StaticProductFeed::Products(products) => Ok(products.clone()),
                StaticProductFeed::Unavailable => {
                    Err(Error::FeedError("connection failed".to_owned()))
                }
            }
        })
    }
}
