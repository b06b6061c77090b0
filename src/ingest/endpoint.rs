//! Defines the route handler that reloads the database from the product feed.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error, db::run_blocking, internal_server_error, product::replace_all_products,
};

use super::feed::{ProductFeed, normalize_products};

/// The state needed for loading the product feed.
#[derive(Debug, Clone)]
pub struct IngestState {
    /// The database connection for storing product transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where to load product transactions from.
    pub product_feed: Arc<dyn ProductFeed>,
}

impl FromRef<AppState> for IngestState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            product_feed: state.product_feed.clone(),
        }
    }
}

/// Route handler that replaces every stored product transaction with the contents of the feed.
pub async fn initialize_endpoint(State(state): State<IngestState>) -> Response {
    match load_product_feed(&state).await {
        Ok(count) => {
            tracing::info!("Loaded {count} product transactions from the feed");
            (
                StatusCode::CREATED,
                Json(json!({ "message": "Database initialized successfully." })),
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Failed to initialize the database: {error}");
            internal_server_error("Failed to initialize the database.")
        }
    }
}

async fn load_product_feed(state: &IngestState) -> Result<usize, Error> {
    let start_time = std::time::Instant::now();

    let raw_products = state.product_feed.fetch().await?;
    let fetched = raw_products.len();
    let products = normalize_products(raw_products);

    if products.len() < fetched {
        tracing::warn!(
            "Discarded {} feed items with invalid prices",
            fetched - products.len()
        );
    }

    let inserted = run_blocking(state.db_connection.clone(), move |connection| {
        replace_all_products(&products, connection)
    })
    .await?;

    tracing::debug!(
        "Replaced product transactions in {}ms",
        start_time.elapsed().as_millis()
    );

    Ok(inserted)
}
