//! Defines the route handler for searching and paging through a month's transactions.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    db::run_blocking,
    month::month_or_default,
    product::{PageRequest, ProductTransaction, get_products_page},
};

use super::handlers::ReportState;

/// The page number to default to when not specified in a request.
const DEFAULT_PAGE: u64 = 1;
/// The number of transactions per page when not specified in a request.
const DEFAULT_PER_PAGE: u64 = 10;

/// The query parameters for the transactions list.
///
/// Everything is read as text so that malformed numbers fall back to the defaults
/// instead of rejecting the request. A query string that cannot be read at all, such as
/// one repeating a parameter, falls back to the defaults as a whole.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    /// The 1-based page number.
    pub page: Option<String>,
    /// The number of transactions per page.
    pub per_page: Option<String>,
    /// Text to look for in the title, description or price.
    pub search: Option<String>,
    /// The month name, e.g. "march".
    pub month: Option<String>,
}

/// One page of transactions along with the paging options used to get it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsPage {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of transactions on the page.
    pub per_page: u64,
    /// The transactions on the page.
    pub transactions: Vec<ProductTransaction>,
}

/// Parse a positive integer query parameter, using `default` for anything else.
///
/// Only the leading run of digits is read, after any leading whitespace and an optional
/// `+`, so `"2abc"` is 2 and `"1.5"` is 1.
fn parse_positive_or(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(parse_leading_integer)
        .filter(|&number| number > 0)
        .unwrap_or(default)
}

fn parse_leading_integer(text: &str) -> Option<u64> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let digit_count = text.bytes().take_while(u8::is_ascii_digit).count();

    text[..digit_count].parse().ok()
}

/// Route handler for a page of a month's transactions, optionally filtered by a search term.
pub async fn transactions_endpoint(
    State(state): State<ReportState>,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
) -> Result<Json<TransactionsPage>, Error> {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    let page = PageRequest {
        page: parse_positive_or(query.page.as_deref(), DEFAULT_PAGE),
        per_page: parse_positive_or(query.per_page.as_deref(), DEFAULT_PER_PAGE),
    };
    let search = query.search.unwrap_or_default().to_lowercase();
    let month = month_or_default(query.month.as_deref());

    let transactions = run_blocking(state.db_connection, move |connection| {
        get_products_page(month, &search, page, connection)
    })
    .await?;

    Ok(Json(TransactionsPage {
        page: page.page,
        per_page: page.per_page,
        transactions,
    }))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;

    use crate::{
        AppState, build_router, endpoints,
        ingest::StaticProductFeed,
        product::{NewProductTransaction, replace_all_products},
    };

    use super::parse_positive_or;

    fn get_test_server(products: &[NewProductTransaction]) -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, StaticProductFeed::Products(Vec::new())).unwrap();
        replace_all_products(products, &state.db_connection.lock().unwrap()).unwrap();

        TestServer::new(build_router(state))
    }

    fn titles(body: &Value) -> Vec<&str> {
        body["transactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|transaction| transaction["title"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn parse_positive_falls_back_to_default() {
        assert_eq!(parse_positive_or(Some("3"), 1), 3);
        assert_eq!(parse_positive_or(Some(" 3 "), 1), 3);
        assert_eq!(parse_positive_or(None, 1), 1);
        assert_eq!(parse_positive_or(Some("0"), 1), 1);
        assert_eq!(parse_positive_or(Some("-2"), 1), 1);
        assert_eq!(parse_positive_or(Some("two"), 10), 10);
        assert_eq!(parse_positive_or(Some(""), 10), 10);
    }

    #[test]
    fn parse_positive_reads_leading_digits() {
        assert_eq!(parse_positive_or(Some("2abc"), 1), 2);
        assert_eq!(parse_positive_or(Some("1.5"), 10), 1);
        assert_eq!(parse_positive_or(Some("+4"), 1), 4);
        assert_eq!(parse_positive_or(Some("0.9"), 10), 10);
        assert_eq!(parse_positive_or(Some("abc2"), 1), 1);
        assert_eq!(parse_positive_or(Some("99999999999999999999999"), 10), 10);
    }

    #[tokio::test]
    async fn second_page_of_one_returns_second_record() {
        let server = get_test_server(&[
            NewProductTransaction::sample(50.0, "2023-03-05", true).title("first"),
            NewProductTransaction::sample(950.0, "2023-03-09", false).title("second"),
        ]);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", "2")
            .add_query_param("perPage", "1")
            .add_query_param("month", "march")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["page"], 2);
        assert_eq!(body["perPage"], 1);
        assert_eq!(titles(&body), vec!["second"]);
        assert_eq!(body["transactions"][0]["dateOfSale"], "2023-03-09");
        assert_eq!(body["transactions"][0]["price"], 950.0);
        assert_eq!(body["transactions"][0]["sold"], false);
    }

    #[tokio::test]
    async fn defaults_apply_for_missing_or_malformed_params() {
        let products: Vec<_> = (0..12)
            .map(|i| NewProductTransaction::sample(i as f64, "2023-03-01", true))
            .collect();
        let server = get_test_server(&products);

        let body: Value = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", "zero")
            .add_query_param("perPage", "-5")
            .await
            .json();

        assert_eq!(body["page"], 1);
        assert_eq!(body["perPage"], 10);
        assert_eq!(body["transactions"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn paging_reads_leading_digits() {
        let products: Vec<_> = (0..3)
            .map(|i| {
                NewProductTransaction::sample(i as f64, "2023-03-01", true).title(&i.to_string())
            })
            .collect();
        let server = get_test_server(&products);

        let body: Value = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("page", "2abc")
            .add_query_param("perPage", "1.5")
            .await
            .json();

        assert_eq!(body["page"], 2);
        assert_eq!(body["perPage"], 1);
        assert_eq!(titles(&body), vec!["1"]);
    }

    #[tokio::test]
    async fn empty_month_defaults_to_march() {
        let server = get_test_server(&[
            NewProductTransaction::sample(10.0, "2023-03-01", true).title("march"),
            NewProductTransaction::sample(20.0, "2023-04-01", true).title("april"),
        ]);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "")
            .await;

        response.assert_status_ok();
        assert_eq!(titles(&response.json()), vec!["march"]);
    }

    #[tokio::test]
    async fn repeated_params_fall_back_to_defaults() {
        let products: Vec<_> = (0..12)
            .map(|i| NewProductTransaction::sample(i as f64, "2023-03-01", true))
            .collect();
        let server = get_test_server(&products);

        let response = server
            .get(&format!("{}?page=2&page=3&month=march&month=april", endpoints::TRANSACTIONS))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["page"], 1);
        assert_eq!(body["perPage"], 10);
        assert_eq!(body["transactions"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn search_filters_within_month() {
        let server = get_test_server(&[
            NewProductTransaction::sample(10.0, "2023-03-01", true).title("Wireless Mouse"),
            NewProductTransaction::sample(20.0, "2023-03-02", true).title("Keyboard"),
            NewProductTransaction::sample(30.0, "2023-05-02", true).title("Gaming Mouse"),
        ]);

        let body: Value = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("search", "MOUSE")
            .add_query_param("month", "march")
            .await
            .json();

        assert_eq!(titles(&body), vec!["Wireless Mouse"]);
    }

    #[tokio::test]
    async fn unknown_month_returns_empty_page() {
        let server = get_test_server(&[NewProductTransaction::sample(10.0, "2023-03-01", true)]);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "marzo")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["transactions"], serde_json::json!([]));
        assert_eq!(body["page"], 1);
        assert_eq!(body["perPage"], 10);
    }
}
