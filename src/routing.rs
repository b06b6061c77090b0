//! Application router configuration.

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, endpoints,
    ingest::initialize_endpoint,
    not_found::get_404_not_found,
    report::{
        bar_chart_endpoint, combined_data_endpoint, pie_chart_endpoint, statistics_endpoint,
        transactions_endpoint,
    },
};

/// The plain text greeting served at the root route.
const WELCOME_MESSAGE: &str = "Welcome to Roxiler company assignment backend.";

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::INITIALIZE, get(initialize_endpoint))
        .route(endpoints::TRANSACTIONS, get(transactions_endpoint))
        .route(endpoints::STATISTICS, get(statistics_endpoint))
        .route(endpoints::BAR_CHART, get(bar_chart_endpoint))
        .route(endpoints::PIE_CHART, get(pie_chart_endpoint))
        .route(endpoints::COMBINED_DATA, get(combined_data_endpoint))
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The root path '/' greets the client.
async fn get_index_page() -> &'static str {
    WELCOME_MESSAGE
}
