//! Salesboard is a small web service for exploring product sales.
//!
//! It loads a list of product transactions from a remote JSON feed into a
//! SQLite database and serves read-only reports over them as JSON: a
//! searchable, paged list of transactions, monthly sale statistics, a price
//! histogram and a breakdown by category.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod ingest;
mod logging;
mod month;
mod not_found;
mod product;
mod report;
mod routing;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use ingest::{DEFAULT_SOURCE_URL, ProductFeed, RawProduct, ReqwestProductFeed};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::Month;
pub use product::{NewProductTransaction, ProductTransaction};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The product feed could not be fetched, e.g. the remote host was
    /// unreachable or answered with a non-success status.
    #[error("could not fetch the product feed: {0}")]
    FeedError(String),

    /// The product feed was fetched but its body is not a JSON array of
    /// products.
    #[error("the product feed is malformed: {0}")]
    InvalidFeed(String),

    /// A blocking database task panicked or was cancelled.
    #[error("a database task failed to complete: {0}")]
    TaskJoinError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // None of the error details are intended to be shown to the client.
        tracing::error!("An unexpected error occurred: {}", self);
        internal_server_error("Internal Server Error")
    }
}

/// A 500 response with a JSON body of the form `{"error": message}`.
pub(crate) fn internal_server_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
