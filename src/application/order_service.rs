use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::events::OrderEvent;
use crate::domain::order::{ListResult, Order, OrderFilter, OrderStatus};
use crate::domain::ports::{OrderRepository, UnitOfWork};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page whose row offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Clamps paging input to `1 <= page <= MAX_PAGE` and `1 <= limit <= MAX_PAGE_SIZE`.
pub fn normalize_paging(page: i64, limit: i64) -> (i64, i64) {
    (page.clamp(1, MAX_PAGE), limit.clamp(1, MAX_PAGE_SIZE))
}

pub struct OrderService<R> {
    repo: R,
    restock_on_cancel: bool,
}

impl<R: OrderRepository + UnitOfWork> OrderService<R> {
    pub fn new(repo: R, restock_on_cancel: bool) -> Self {
        Self {
            repo,
            restock_on_cancel,
        }
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn list_orders(
        &self,
        filter: &OrderFilter,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let (page, limit) = normalize_paging(page, limit);
        self.repo.list(filter, page, limit)
    }

    pub fn list_user_orders(
        &self,
        user_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let filter = OrderFilter {
            user_id: Some(user_id),
            ..Default::default()
        };
        self.list_orders(&filter, page, limit)
    }

    /// Moves an order one step along its lifecycle.
    ///
    /// A tracking number is accepted only together with `Shipped`. When
    /// restocking is enabled, cancelling returns every item's quantity to its
    /// product in the same transaction.
    pub fn update_status(
        &self,
        order_id: Uuid,
        to: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, DomainError> {
        let tracking_number = match tracking_number.map(|t| t.trim().to_string()) {
            Some(t) if t.is_empty() => None,
            Some(t) if to != OrderStatus::Shipped => {
                return Err(DomainError::InvalidInput(format!(
                    "tracking_number '{}' can only be set when shipping",
                    t
                )))
            }
            Some(t) if t.len() > 50 => {
                return Err(DomainError::InvalidInput(
                    "tracking_number must be at most 50 characters".to_string(),
                ))
            }
            other => other,
        };
        let restock = self.restock_on_cancel;

        let updated = self.repo.transaction(|tx| {
            let order = tx
                .order_for_update(order_id)?
                .ok_or(DomainError::NotFound("Order"))?;
            let from = order.status;
            if !from.can_transition_to(to) {
                return Err(DomainError::InvalidTransition { from, to });
            }

            let updated = tx.set_order_status(order_id, to, tracking_number)?;
            if to == OrderStatus::Cancelled && restock {
                for item in &order.items {
                    tx.increment_stock(item.product_id, item.quantity)?;
                }
            }
            tx.append_event(OrderEvent::status_changed(&updated, from))?;
            Ok((from, updated))
        });

        match updated {
            Ok((from, order)) => {
                log::info!(
                    "Order {} moved from {} to {}",
                    order.order_number,
                    from,
                    order.status
                );
                Ok(order)
            }
            Err(e) => {
                if e.is_infrastructure() {
                    log::error!("Status update of order {} failed: {}", order_id, e);
                }
                Err(e)
            }
        }
    }
}
