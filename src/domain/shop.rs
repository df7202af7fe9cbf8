use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::roles::Actor;

#[derive(Debug, Clone, PartialEq)]
pub struct Shop {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub moto: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    /// The owner manages their own shop; staff manage every shop.
    pub fn can_be_managed_by(&self, actor: &Actor) -> bool {
        self.owner_id == actor.user_id || actor.is_staff()
    }
}

#[derive(Debug, Clone)]
pub struct NewShop {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub moto: String,
}

impl NewShop {
    pub fn new(owner_id: Uuid, name: &str, description: &str, moto: &str) -> Result<Self, DomainError> {
        check_name(name)?;
        check_moto(moto)?;
        let id = Uuid::new_v4();
        Ok(NewShop {
            id,
            owner_id,
            name: name.trim().to_string(),
            slug: shop_slug(name, id),
            description: description.trim().to_string(),
            moto: moto.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShopChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub moto: Option<String>,
    /// Derived from `name` on rename, never taken from the caller.
    pub slug: Option<String>,
}

impl ShopChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.moto.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(moto) = &self.moto {
            check_moto(moto)?;
        }
        Ok(())
    }
}

fn check_name(name: &str) -> Result<(), DomainError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(DomainError::InvalidInput("shop name cannot be empty".to_string()));
    }
    if len > 100 {
        return Err(DomainError::InvalidInput(
            "shop name must be at most 100 characters".to_string(),
        ));
    }
    Ok(())
}

fn check_moto(moto: &str) -> Result<(), DomainError> {
    if moto.trim().chars().count() > 100 {
        return Err(DomainError::InvalidInput(
            "moto must be at most 100 characters".to_string(),
        ));
    }
    Ok(())
}

/// Lowercase ASCII words joined by `-`, followed by the first 8 hex digits
/// of the shop id so that similar names never collide.
pub fn shop_slug(name: &str, id: Uuid) -> String {
    let mut slug = String::new();
    for word in name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        slug.push_str(&word.to_ascii_lowercase());
        slug.push('-');
    }
    let id = id.simple().to_string();
    slug.push_str(&id[..8]);
    slug
}
