//! The API endpoints URIs.

/// The root route which greets the client.
pub const ROOT: &str = "/";
/// The route that reloads the database from the product feed.
pub const INITIALIZE: &str = "/initialize";
/// The route for searching and paging through a month's transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route for a month's sale totals.
pub const STATISTICS: &str = "/statistics";
/// The route for a month's price histogram.
pub const BAR_CHART: &str = "/bar-chart";
/// The route for a month's category breakdown.
pub const PIE_CHART: &str = "/pie-chart";
/// The route for a month's statistics and both charts in one response.
pub const COMBINED_DATA: &str = "/combined-data";
