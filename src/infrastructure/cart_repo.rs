use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartLine;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::cart_items;

use super::models::{CartItemRow, NewCartItemRow};

#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn list_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .select(CartItemRow::as_select())
            .order((cart_items::created_at.asc(), cart_items::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    fn find_line(&self, user_id: Uuid, line_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = cart_items::table
            .filter(cart_items::id.eq(line_id))
            .filter(cart_items::user_id.eq(user_id))
            .select(CartItemRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(CartLine::from))
    }

    fn find_line_for_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .filter(cart_items::product_id.eq(product_id))
            .select(CartItemRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(CartLine::from))
    }

    fn add_or_increment(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: BigDecimal,
    ) -> Result<CartLine, DomainError> {
        let mut conn = self.pool.get()?;
        // One statement, so two concurrent adds of the same product both land.
        let row = diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id: Uuid::new_v4(),
                user_id,
                product_id,
                quantity,
                price,
                updated_at: Utc::now(),
            })
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set((
                cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)),
                cart_items::price.eq(excluded(cart_items::price)),
                cart_items::updated_at.eq(excluded(cart_items::updated_at)),
            ))
            .returning(CartItemRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn set_quantity(&self, line_id: Uuid, quantity: i32) -> Result<CartLine, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(cart_items::table.find(line_id))
            .set((
                cart_items::quantity.eq(quantity),
                cart_items::updated_at.eq(Utc::now()),
            ))
            .returning(CartItemRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        row.map(CartLine::from)
            .ok_or(DomainError::NotFound("Cart item"))
    }

    fn remove_line(&self, user_id: Uuid, line_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq(line_id))
                .filter(cart_items::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn clear(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
            .execute(&mut conn)?;
        Ok(deleted)
    }
}
