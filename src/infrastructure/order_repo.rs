use chrono::Utc;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartLine;
use crate::domain::errors::DomainError;
use crate::domain::events::{OrderEvent, AGGREGATE_TYPE};
use crate::domain::order::{ListResult, NewOrder, Order, OrderFilter, OrderStatus};
use crate::domain::ports::{OrderRepository, StoreTx, UnitOfWork};
use crate::domain::product::Product;
use crate::schema::{cart_items, order_items, order_outbox, orders, products};

use super::models::{
    CartItemRow, NewOrderItemRow, NewOrderRow, NewOutboxEventRow, OrderItemRow, OrderRow,
    OrderStatusChangeset, ProductRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Queries shared by the repository and the transaction ─────────────────────

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(orders::user_id.eq(user_id));
    }
    query
}

fn load_order(
    conn: &mut PgConnection,
    id: Uuid,
    lock: bool,
) -> Result<Option<Order>, DomainError> {
    let query = orders::table.find(id).select(OrderRow::as_select());
    let order = if lock {
        query.for_update().first(conn).optional()?
    } else {
        query.first(conn).optional()?
    };
    let Some(order) = order else {
        return Ok(None);
    };

    let items = OrderItemRow::belonging_to(&order)
        .select(OrderItemRow::as_select())
        .order(order_items::line_no.asc())
        .load(conn)?;
    order.into_order(items).map(Some)
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        load_order(&mut conn, id, false)
    }

    fn list(&self, filter: &OrderFilter, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1).saturating_mul(limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let rows = filtered(filter)
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            let items = OrderItemRow::belonging_to(&rows)
                .select(OrderItemRow::as_select())
                .order((order_items::order_id, order_items::line_no))
                .load(conn)?
                .grouped_by(&rows);

            let items = rows
                .into_iter()
                .zip(items)
                .map(|(order, items)| order.into_order(items))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ListResult { items, total })
        })
    }
}

impl UnitOfWork for DieselOrderRepository {
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, DomainError>,
    {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction::<_, DomainError, _>(|conn| f(&mut PgStoreTx { conn }))
    }
}

// ── Transaction-scoped operations ─────────────────────────────────────────────

struct PgStoreTx<'a> {
    conn: &'a mut PgConnection,
}

impl StoreTx for PgStoreTx<'_> {
    fn cart_lines(&mut self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let rows = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .select(CartItemRow::as_select())
            .order((cart_items::created_at.asc(), cart_items::id.asc()))
            .load(self.conn)?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    fn clear_cart(&mut self, user_id: Uuid) -> Result<usize, DomainError> {
        Ok(
            diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
                .execute(self.conn)?,
        )
    }

    fn product_for_update(&mut self, product_id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .find(product_id)
            .select(ProductRow::as_select())
            .for_update()
            .first(self.conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        let changed = diesel::update(
            products::table
                .filter(products::id.eq(product_id))
                .filter(products::stock.ge(quantity)),
        )
        .set((
            products::stock.eq(products::stock - quantity),
            products::updated_at.eq(Utc::now()),
        ))
        .execute(self.conn)?;
        Ok(changed == 1)
    }

    fn increment_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        diesel::update(products::table.find(product_id))
            .set((
                products::stock.eq(products::stock + quantity),
                products::updated_at.eq(Utc::now()),
            ))
            .execute(self.conn)?;
        Ok(())
    }

    fn insert_order(&mut self, order: NewOrder) -> Result<Order, DomainError> {
        let order_id = Uuid::new_v4();
        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: order_id,
                order_number: order.order_number,
                user_id: order.user_id,
                status: OrderStatus::Pending.as_str().to_string(),
                total_amount: order.total_amount.clone(),
                shipping_name: order.shipping.name,
                shipping_email: order.shipping.email,
                shipping_phone: order.shipping.phone,
                shipping_address: order.shipping.address,
                shipping_city: order.shipping.city,
                shipping_postal_code: order.shipping.postal_code,
                shipping_country: order.shipping.country,
                payment_method: order.payment_method,
                payment_amount: order.total_amount,
                payment_status: "pending".to_string(),
            })
            .returning(OrderRow::as_returning())
            .get_result(self.conn)?;

        let new_items: Vec<NewOrderItemRow> = order
            .items
            .into_iter()
            .zip(1..)
            .map(|(item, line_no)| NewOrderItemRow {
                id: Uuid::new_v4(),
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_time: item.price_at_time,
                line_no,
            })
            .collect();
        let items = diesel::insert_into(order_items::table)
            .values(&new_items)
            .returning(OrderItemRow::as_returning())
            .get_results(self.conn)?;

        row.into_order(items)
    }

    fn order_for_update(&mut self, order_id: Uuid) -> Result<Option<Order>, DomainError> {
        load_order(self.conn, order_id, true)
    }

    fn set_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, DomainError> {
        let changed = diesel::update(orders::table.find(order_id))
            .set(&OrderStatusChangeset {
                status: status.as_str().to_string(),
                shipping_tracking_number: tracking_number,
                updated_at: Utc::now(),
            })
            .execute(self.conn)?;
        if changed == 0 {
            return Err(DomainError::NotFound("Order"));
        }
        load_order(self.conn, order_id, false)?.ok_or(DomainError::NotFound("Order"))
    }

    fn append_event(&mut self, event: OrderEvent) -> Result<(), DomainError> {
        // The relay derives the destination topic from `aggregate_type`.
        diesel::insert_into(order_outbox::table)
            .values(&NewOutboxEventRow {
                id: Uuid::new_v4(),
                aggregate_type: AGGREGATE_TYPE.to_string(),
                aggregate_id: event.aggregate_id.to_string(),
                event_type: event.event_type.to_string(),
                payload: event.payload,
            })
            .execute(self.conn)?;
        Ok(())
    }
}
