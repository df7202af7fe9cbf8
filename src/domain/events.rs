use serde_json::{json, Value};
use uuid::Uuid;

use super::order::{Order, OrderStatus};

pub const AGGREGATE_TYPE: &str = "Order";

/// A row for the transactional outbox, written alongside the order change it
/// describes.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEvent {
    pub aggregate_id: Uuid,
    pub event_type: &'static str,
    pub payload: Value,
}

impl OrderEvent {
    pub fn order_created(order: &Order) -> Self {
        let items: Vec<Value> = order
            .items
            .iter()
            .map(|item| {
                json!({
                    "product_id": item.product_id,
                    "quantity": item.quantity,
                    "price_at_time": item.price_at_time.to_string(),
                })
            })
            .collect();

        OrderEvent {
            aggregate_id: order.id,
            event_type: "OrderCreated",
            payload: json!({
                "order_id": order.id,
                "order_number": order.order_number,
                "user_id": order.user_id,
                "status": order.status.as_str(),
                "total_amount": order.total_amount.to_string(),
                "email": order.shipping.email,
                "items": items,
            }),
        }
    }

    pub fn status_changed(order: &Order, from: OrderStatus) -> Self {
        OrderEvent {
            aggregate_id: order.id,
            event_type: "OrderStatusChanged",
            payload: json!({
                "order_id": order.id,
                "order_number": order.order_number,
                "user_id": order.user_id,
                "from": from.as_str(),
                "to": order.status.as_str(),
                "tracking_number": order.shipping.tracking_number,
            }),
        }
    }
}
