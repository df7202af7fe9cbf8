use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{ProductRepository, ShopRepository};
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::domain::roles::Actor;

/// Catalog management. Products of a shop are managed by its owner or by
/// staff; products without a shop by staff only.
pub struct ProductService<P, S> {
    repo: P,
    shops: S,
}

impl<P: ProductRepository, S: ShopRepository> ProductService<P, S> {
    pub fn new(repo: P, shops: S) -> Self {
        Self { repo, shops }
    }

    pub fn create_product(&self, actor: &Actor, product: NewProduct) -> Result<Product, DomainError> {
        product.validate()?;
        self.authorize(actor, product.shop_id)?;
        let product = NewProduct {
            name: product.name.trim().to_string(),
            ..product
        };
        let created = self.repo.create(product)?;
        log::info!("Product {} created with stock {}", created.id, created.stock);
        Ok(created)
    }

    pub fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn update_product(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Product, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::InvalidInput("nothing to update".to_string()));
        }
        changes.validate()?;
        let product = self
            .repo
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Product"))?;
        self.authorize(actor, product.shop_id)?;
        self.repo
            .update(id, changes)?
            .ok_or(DomainError::NotFound("Product"))
    }

    fn authorize(&self, actor: &Actor, shop_id: Option<Uuid>) -> Result<(), DomainError> {
        let allowed = match shop_id {
            Some(shop_id) => self
                .shops
                .find_by_id(shop_id)?
                .ok_or(DomainError::NotFound("Shop"))?
                .can_be_managed_by(actor),
            None => actor.is_staff(),
        };
        if allowed {
            Ok(())
        } else {
            log::warn!(
                "User {} may not manage products of shop {:?}",
                actor.user_id,
                shop_id
            );
            Err(DomainError::Forbidden(
                "only the shop owner or staff can manage this product".to_string(),
            ))
        }
    }
}
