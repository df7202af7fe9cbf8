use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub shop_id: Option<Uuid>,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub shop_id: Option<Uuid>,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
}

fn check_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidInput(
            "product name cannot be empty".to_string(),
        ));
    }
    if name.trim().chars().count() > 255 {
        return Err(DomainError::InvalidInput(
            "product name must be at most 255 characters".to_string(),
        ));
    }
    Ok(())
}

fn check_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price < BigDecimal::zero() {
        return Err(DomainError::InvalidInput(
            "price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn check_stock(stock: i32) -> Result<(), DomainError> {
    if stock < 0 {
        return Err(DomainError::InvalidInput(
            "stock cannot be negative".to_string(),
        ));
    }
    Ok(())
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_name(&self.name)?;
        check_price(&self.price)?;
        check_stock(self.stock)
    }
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(price) = &self.price {
            check_price(price)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        Ok(())
    }
}
