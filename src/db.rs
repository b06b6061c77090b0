//! Database setup and helpers for running queries off the async runtime.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, product::create_product_transaction_table};

/// Create the application's tables if they do not exist yet.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_product_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Run `query` against the shared connection on the blocking thread pool.
///
/// The connection lock is held only while `query` runs.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned,
/// [Error::TaskJoinError] if the blocking task panicked,
/// or whatever error `query` returns.
pub(crate) async fn run_blocking<T, F>(
    db_connection: Arc<Mutex<Connection>>,
    query: F,
) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let connection = db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        query(&connection)
    })
    .await
    .map_err(|error| Error::TaskJoinError(error.to_string()))?
}
