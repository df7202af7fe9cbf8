use std::str::FromStr;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::cart_total;
use crate::domain::errors::DomainError;
use crate::domain::events::OrderEvent;
use crate::domain::order::{generate_order_number, NewOrder, NewOrderItem, Order, ShippingInfo};
use crate::domain::ports::UnitOfWork;

/// Which price is recorded as `price_at_time` on each order item.
///
/// The order total is always the sum of the cart snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricingPolicy {
    /// The product's price at the moment its stock is committed.
    #[default]
    Catalog,
    /// The price captured when the line was added to the cart.
    Cart,
}

impl FromStr for PricingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(PricingPolicy::Catalog),
            "cart" => Ok(PricingPolicy::Cart),
            other => Err(format!("expected 'catalog' or 'cart', got '{}'", other)),
        }
    }
}

pub struct CheckoutService<S> {
    store: S,
    pricing: PricingPolicy,
}

impl<S: UnitOfWork> CheckoutService<S> {
    pub fn new(store: S, pricing: PricingPolicy) -> Self {
        Self { store, pricing }
    }

    /// Turns the user's cart into a pending order.
    ///
    /// Stock for every line is checked and decremented, the order and its
    /// items are inserted, an `OrderCreated` event is recorded and the cart is
    /// emptied, all in one transaction. Any failure leaves stock, cart and
    /// orders exactly as they were.
    pub fn create_order_from_cart(
        &self,
        user_id: Uuid,
        shipping: ShippingInfo,
        payment_method: &str,
    ) -> Result<Order, DomainError> {
        shipping.validate()?;
        let payment_method = payment_method.trim();
        if payment_method.is_empty() {
            return Err(DomainError::InvalidInput(
                "payment_method is required".to_string(),
            ));
        }
        if payment_method.len() > 50 {
            return Err(DomainError::InvalidInput(
                "payment_method must be at most 50 characters".to_string(),
            ));
        }
        let payment_method = payment_method.to_string();
        let pricing = self.pricing;

        let result = self.store.transaction(|tx| {
            let lines = tx.cart_lines(user_id)?;
            if lines.is_empty() {
                return Err(DomainError::EmptyCart);
            }

            let total_amount = cart_total(&lines);

            let mut items = Vec::with_capacity(lines.len());
            for line in &lines {
                let product = tx
                    .product_for_update(line.product_id)?
                    .ok_or(DomainError::ProductNotFound {
                        product_id: line.product_id,
                    })?;

                let insufficient = DomainError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                    requested: line.quantity,
                };
                if product.stock < line.quantity {
                    return Err(insufficient);
                }
                if !tx.decrement_stock(product.id, line.quantity)? {
                    return Err(insufficient);
                }

                if product.price != line.price_snapshot {
                    log::warn!(
                        "Price of product {} changed since it was added to the cart of user {}: cart {}, catalog {}",
                        product.id,
                        user_id,
                        line.price_snapshot,
                        product.price
                    );
                }
                let price_at_time = match pricing {
                    PricingPolicy::Catalog => product.price,
                    PricingPolicy::Cart => line.price_snapshot.clone(),
                };
                items.push(NewOrderItem {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price_at_time,
                });
            }

            let order = tx.insert_order(NewOrder {
                order_number: generate_order_number(Utc::now()),
                user_id,
                total_amount,
                shipping,
                payment_method,
                items,
            })?;
            tx.append_event(OrderEvent::order_created(&order))?;
            tx.clear_cart(user_id)?;

            Ok(order)
        });

        match &result {
            Ok(order) => log::info!(
                "Order {} created for user {} ({} items, total {})",
                order.order_number,
                user_id,
                order.items.len(),
                order.total_amount
            ),
            Err(e) if e.is_infrastructure() => {
                log::error!("Checkout for user {} rolled back: {}", user_id, e)
            }
            Err(e) => log::warn!("Checkout for user {} rejected: {}", user_id, e),
        }
        result
    }
}
