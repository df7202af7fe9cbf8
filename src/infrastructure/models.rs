use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, PaymentInfo, ShippingInfo};
use crate::domain::product::Product;
use crate::domain::shop::Shop;
use crate::domain::verification::{VerificationCode, VerifiedChannel};
use crate::schema::{
    cart_items, order_items, order_outbox, orders, products, shops, user_verifications,
    verification_codes,
};

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = shops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShopRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub moto: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Shop {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            moto: row.moto,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = shops)]
pub struct NewShopRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub moto: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = shops)]
pub struct ShopChangeset {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub moto: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub shop_id: Option<Uuid>,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            shop_id: row.shop_id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub shop_id: Option<Uuid>,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

// ── Cart ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartLine {
    fn from(row: CartItemRow) -> Self {
        CartLine {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price_snapshot: row.price,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
    pub updated_at: DateTime<Utc>,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: String,
    pub total_amount: BigDecimal,
    pub shipping_name: String,
    pub shipping_email: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub shipping_tracking_number: Option<String>,
    pub payment_method: String,
    pub payment_amount: BigDecimal,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    /// Items come back in checkout order whatever order they were loaded in.
    pub fn into_order(self, mut items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        items.sort_by_key(|i| i.line_no);
        let status = self.status.parse().map_err(|_| {
            DomainError::Internal(format!(
                "order {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            user_id: self.user_id,
            status,
            total_amount: self.total_amount,
            shipping: ShippingInfo {
                name: self.shipping_name,
                email: self.shipping_email,
                phone: self.shipping_phone,
                address: self.shipping_address,
                city: self.shipping_city,
                postal_code: self.shipping_postal_code,
                country: self.shipping_country,
                tracking_number: self.shipping_tracking_number,
            },
            payment: PaymentInfo {
                method: self.payment_method,
                amount: self.payment_amount,
                status: self.payment_status,
            },
            items: items
                .into_iter()
                .map(|i| OrderItem {
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price_at_time: i.price_at_time,
                })
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: String,
    pub total_amount: BigDecimal,
    pub shipping_name: String,
    pub shipping_email: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub payment_method: String,
    pub payment_amount: BigDecimal,
    pub payment_status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderStatusChangeset {
    pub status: String,
    pub shipping_tracking_number: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: BigDecimal,
    pub line_no: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: BigDecimal,
    pub line_no: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

// ── Verification ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = verification_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VerificationCodeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub channel: String,
    pub target: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl TryFrom<VerificationCodeRow> for VerificationCode {
    type Error = DomainError;

    fn try_from(row: VerificationCodeRow) -> Result<Self, Self::Error> {
        let channel = row.channel.parse().map_err(|_| {
            DomainError::Internal(format!(
                "verification code {} has unknown channel '{}'",
                row.id, row.channel
            ))
        })?;
        Ok(VerificationCode {
            id: row.id,
            user_id: row.user_id,
            channel,
            target: row.target,
            code_hash: row.code_hash,
            attempts: row.attempts,
            expires_at: row.expires_at,
            consumed_at: row.consumed_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = verification_codes)]
pub struct NewVerificationCodeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub channel: String,
    pub target: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_verifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserVerificationRow {
    pub user_id: Uuid,
    pub channel: String,
    pub target: String,
    pub verified_at: DateTime<Utc>,
}

impl TryFrom<UserVerificationRow> for VerifiedChannel {
    type Error = DomainError;

    fn try_from(row: UserVerificationRow) -> Result<Self, Self::Error> {
        let channel = row.channel.parse().map_err(|_| {
            DomainError::Internal(format!(
                "verification of user {} has unknown channel '{}'",
                row.user_id, row.channel
            ))
        })?;
        Ok(VerifiedChannel {
            user_id: row.user_id,
            channel,
            target: row.target,
            verified_at: row.verified_at,
        })
    }
}
