use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::CartLine;
use super::errors::DomainError;
use super::events::OrderEvent;
use super::order::{ListResult, NewOrder, Order, OrderFilter, OrderStatus};
use super::product::{NewProduct, Product, ProductChanges};
use super::shop::{NewShop, Shop, ShopChanges};
use super::verification::{Channel, NewVerificationCode, VerificationCode, VerifiedChannel};

pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>, DomainError>;
}

pub trait ShopRepository: Send + Sync + 'static {
    /// Fails with `Conflict` when the name is already taken.
    fn create(&self, shop: NewShop) -> Result<Shop, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Shop>, DomainError>;
    fn update(&self, id: Uuid, changes: ShopChanges) -> Result<Option<Shop>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn list_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError>;
    fn find_line(&self, user_id: Uuid, line_id: Uuid) -> Result<Option<CartLine>, DomainError>;
    fn find_line_for_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartLine>, DomainError>;
    /// Inserts the line, or adds `quantity` to the existing one for the same
    /// product and refreshes its price snapshot.
    fn add_or_increment(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: BigDecimal,
    ) -> Result<CartLine, DomainError>;
    fn set_quantity(&self, line_id: Uuid, quantity: i32) -> Result<CartLine, DomainError>;
    fn remove_line(&self, user_id: Uuid, line_id: Uuid) -> Result<bool, DomainError>;
    fn clear(&self, user_id: Uuid) -> Result<usize, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list(&self, filter: &OrderFilter, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}

/// Runs a closure inside one store transaction: committed when the closure
/// returns `Ok`, rolled back otherwise.
pub trait UnitOfWork: Send + Sync + 'static {
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, DomainError>;
}

/// Operations available inside a [`UnitOfWork`] transaction.
pub trait StoreTx {
    fn cart_lines(&mut self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError>;
    fn clear_cart(&mut self, user_id: Uuid) -> Result<usize, DomainError>;
    /// Reads the product and holds a row lock until the transaction ends.
    fn product_for_update(&mut self, product_id: Uuid) -> Result<Option<Product>, DomainError>;
    /// `stock = stock - quantity` only when `stock >= quantity`; returns
    /// whether a row was changed.
    fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<bool, DomainError>;
    fn increment_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<(), DomainError>;
    fn insert_order(&mut self, order: NewOrder) -> Result<Order, DomainError>;
    fn order_for_update(&mut self, order_id: Uuid) -> Result<Option<Order>, DomainError>;
    fn set_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, DomainError>;
    fn append_event(&mut self, event: OrderEvent) -> Result<(), DomainError>;
}

pub trait VerificationRepository: Send + Sync + 'static {
    /// Replaces any previous code for the same user and channel.
    fn upsert(&self, code: NewVerificationCode) -> Result<VerificationCode, DomainError>;
    fn find_pending(
        &self,
        user_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerificationCode>, DomainError>;
    /// Counts one confirmation try, but only while fewer than `max_attempts`
    /// were made. Returns the new count, or `None` once the code is locked.
    fn claim_attempt(&self, id: Uuid, max_attempts: i32) -> Result<Option<i32>, DomainError>;
    /// Consumes the code and records its target as verified for the user in
    /// one transaction. Returns `false` if the code was already consumed.
    fn consume(&self, code: &VerificationCode, at: DateTime<Utc>) -> Result<bool, DomainError>;
    fn verified(
        &self,
        user_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerifiedChannel>, DomainError>;
}

pub trait CodeSender: Send + Sync + 'static {
    fn send(&self, channel: Channel, target: &str, code: &str) -> Result<(), DomainError>;
}
