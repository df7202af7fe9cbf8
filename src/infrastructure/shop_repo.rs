use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ShopRepository;
use crate::domain::shop::{NewShop, Shop, ShopChanges};
use crate::schema::shops;

use super::models::{NewShopRow, ShopChangeset, ShopRow};

#[derive(Clone)]
pub struct DieselShopRepository {
    pool: DbPool,
}

impl DieselShopRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Name and slug are UNIQUE; a clash is the caller's problem, not a 500.
fn taken(e: DieselError) -> DomainError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DomainError::Conflict("shop name is already taken".to_string())
        }
        other => other.into(),
    }
}

impl ShopRepository for DieselShopRepository {
    fn create(&self, shop: NewShop) -> Result<Shop, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(shops::table)
            .values(&NewShopRow {
                id: shop.id,
                owner_id: shop.owner_id,
                name: shop.name,
                slug: shop.slug,
                description: shop.description,
                moto: shop.moto,
            })
            .returning(ShopRow::as_returning())
            .get_result(&mut conn)
            .map_err(taken)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Shop>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = shops::table
            .find(id)
            .select(ShopRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Shop::from))
    }

    fn update(&self, id: Uuid, changes: ShopChanges) -> Result<Option<Shop>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(shops::table.find(id))
            .set(&ShopChangeset {
                name: changes.name,
                slug: changes.slug,
                description: changes.description,
                moto: changes.moto,
                updated_at: Utc::now(),
            })
            .returning(ShopRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(taken)?;
        Ok(row.map(Shop::from))
    }
}
