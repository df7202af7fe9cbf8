use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Product price copied in when the line was last added to.
    pub price_snapshot: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    pub fn subtotal(&self) -> BigDecimal {
        &self.price_snapshot * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: BigDecimal,
}

/// Sum of `price_snapshot * quantity` over the given lines.
pub fn cart_total(lines: &[CartLine]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::from(0), |acc, line| acc + line.subtotal())
}
