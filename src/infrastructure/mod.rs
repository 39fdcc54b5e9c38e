pub mod models;
pub mod order_repo;
pub mod product_repo;
pub mod stripe;

#[cfg(test)]
pub(crate) mod test_support;
