pub mod cart_repo;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod notify;
pub mod order_repo;
pub mod product_repo;
pub mod shop_repo;
pub mod verification_repo;

#[cfg(test)]
pub(crate) mod test_support;
