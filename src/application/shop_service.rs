use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ShopRepository;
use crate::domain::roles::Actor;
use crate::domain::shop::{shop_slug, NewShop, Shop, ShopChanges};

pub struct ShopService<S> {
    repo: S,
}

impl<S: ShopRepository> ShopService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Staff open shops on behalf of a user; the owner defaults to the caller.
    pub fn create_shop(
        &self,
        actor: &Actor,
        owner_id: Option<Uuid>,
        name: &str,
        description: &str,
        moto: &str,
    ) -> Result<Shop, DomainError> {
        if !actor.is_staff() {
            return Err(DomainError::Forbidden(
                "only staff can open shops".to_string(),
            ));
        }
        let shop = NewShop::new(owner_id.unwrap_or(actor.user_id), name, description, moto)?;
        let created = self.repo.create(shop)?;
        log::info!("Shop {} '{}' opened for user {}", created.id, created.name, created.owner_id);
        Ok(created)
    }

    pub fn get_shop(&self, id: Uuid) -> Result<Option<Shop>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn update_shop(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: ShopChanges,
    ) -> Result<Shop, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::InvalidInput("nothing to update".to_string()));
        }
        changes.validate()?;
        let shop = self.manageable_shop(actor, id)?;

        let name = changes.name.map(|n| n.trim().to_string());
        let slug = name
            .as_deref()
            .filter(|n| *n != shop.name)
            .map(|n| shop_slug(n, shop.id));
        let changes = ShopChanges {
            name,
            description: changes.description.map(|d| d.trim().to_string()),
            moto: changes.moto.map(|m| m.trim().to_string()),
            slug,
        };
        self.repo
            .update(id, changes)?
            .ok_or(DomainError::NotFound("Shop"))
    }

    /// Loads the shop and checks the actor may manage it.
    pub fn manageable_shop(&self, actor: &Actor, id: Uuid) -> Result<Shop, DomainError> {
        let shop = self
            .repo
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Shop"))?;
        if !shop.can_be_managed_by(actor) {
            log::warn!("User {} may not manage shop {}", actor.user_id, shop.id);
            return Err(DomainError::Forbidden(
                "only the shop owner or staff can manage this shop".to_string(),
            ));
        }
        Ok(shop)
    }
}
