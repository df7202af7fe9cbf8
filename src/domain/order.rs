use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// The step that follows this one on the fulfilment path.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Paid),
            OrderStatus::Paid => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Only the next fulfilment step or a cancellation is allowed, and never
    /// out of a terminal state.
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        !self.is_terminal() && (to == OrderStatus::Cancelled || self.next() == Some(to))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::InvalidInput(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub tracking_number: Option<String>,
}

impl ShippingInfo {
    /// Checks that every required field is present and fits its column.
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields: [(&str, &str, usize); 7] = [
            ("name", &self.name, 100),
            ("email", &self.email, 100),
            ("phone", &self.phone, 20),
            ("address", &self.address, 255),
            ("city", &self.city, 100),
            ("postal_code", &self.postal_code, 20),
            ("country", &self.country, 100),
        ];
        for (field, value, max) in fields {
            let value = value.trim();
            if value.is_empty() {
                return Err(DomainError::InvalidInput(format!(
                    "shipping.{} is required",
                    field
                )));
            }
            if value.chars().count() > max {
                return Err(DomainError::InvalidInput(format!(
                    "shipping.{} must be at most {} characters",
                    field, max
                )));
            }
        }
        if !self.email.contains('@') {
            return Err(DomainError::InvalidInput(
                "shipping.email is not a valid address".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInfo {
    pub method: String,
    pub amount: BigDecimal,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: BigDecimal,
}

/// An order assembled by checkout, not yet persisted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub shipping: ShippingInfo,
    pub payment_method: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Order>,
    pub total: i64,
}

/// Builds an externally visible order number: `ORD-<unix millis>-<12 hex>`.
///
/// The suffix carries 48 random bits from a v4 UUID, so two numbers minted in
/// the same millisecond by different processes still differ; the store's
/// unique index is the final guard.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "ORD-{}-{}",
        now.timestamp_millis(),
        random[..12].to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+221770000000".to_string(),
            address: "1 Rue Carnot".to_string(),
            city: "Dakar".to_string(),
            postal_code: "10200".to_string(),
            country: "SN".to_string(),
            tracking_number: None,
        }
    }

    #[test]
    fn fulfilment_path_moves_one_step_at_a_time() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Paid));
    }

    #[test]
    fn cancellation_allowed_from_every_non_terminal_state() {
        for from in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Shipped,
        ] {
            assert!(from.can_transition_to(OrderStatus::Cancelled), "{}", from);
        }
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert!(from.is_terminal());
            assert!(!from.can_transition_to(OrderStatus::Cancelled));
            assert!(from.next().is_none());
        }
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn complete_shipping_info_is_valid() {
        assert!(shipping().validate().is_ok());
    }

    #[test]
    fn blank_shipping_field_is_rejected() {
        let mut info = shipping();
        info.city = "   ".to_string();
        let err = info.validate().unwrap_err();
        assert!(err.to_string().contains("shipping.city"));
    }

    #[test]
    fn shipping_email_needs_at_sign() {
        let mut info = shipping();
        info.email = "ada.example.com".to_string();
        assert!(matches!(info.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn overlong_phone_is_rejected() {
        let mut info = shipping();
        info.phone = "0".repeat(21);
        assert!(info.validate().is_err());
    }

    #[test]
    fn order_number_has_prefix_and_fits_column() {
        let number = generate_order_number(Utc::now());
        assert!(number.starts_with("ORD-"));
        assert!(number.len() <= 32, "{}", number);
    }

    #[test]
    fn order_numbers_are_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                thread::spawn(|| {
                    let now = Utc::now();
                    (0..500)
                        .map(|_| generate_order_number(now))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for number in handle.join().unwrap() {
                assert!(seen.insert(number), "duplicate order number");
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
