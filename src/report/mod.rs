//! Monthly reports over the stored product transactions.
//!
//! Every report is scoped to the month named in the `month` query parameter
//! (March when absent). Unknown month names match no transactions.

mod aggregation;
mod handlers;
mod transactions;

pub use handlers::{
    bar_chart_endpoint, combined_data_endpoint, pie_chart_endpoint, statistics_endpoint,
};
pub use transactions::transactions_endpoint;
