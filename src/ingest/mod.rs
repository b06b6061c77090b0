//! Loading product transactions from the remote feed into the database.

mod endpoint;
mod feed;

pub use endpoint::initialize_endpoint;
pub use feed::{DEFAULT_SOURCE_URL, ProductFeed, RawProduct, ReqwestProductFeed};

#[cfg(test)]
pub(crate) use feed::StaticProductFeed;
