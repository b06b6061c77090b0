//! Product transactions: the stored records and the month-scoped queries over them.

mod core;
mod query;

pub use core::{
    NewProductTransaction, ProductTransaction, create_product_transaction_table,
    replace_all_products,
};
pub use query::{PageRequest, SaleRow, get_products_page, get_sale_rows};

#[cfg(test)]
pub use core::get_all_products;
