use uuid::Uuid;

use crate::domain::cart::{cart_total, CartLine, CartView};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, ProductRepository};

pub struct CartService<C, P> {
    carts: C,
    products: P,
}

fn positive(quantity: i32) -> Result<i32, DomainError> {
    if quantity < 1 {
        return Err(DomainError::InvalidInput(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(quantity)
}

impl<C: CartRepository, P: ProductRepository> CartService<C, P> {
    pub fn new(carts: C, products: P) -> Self {
        Self { carts, products }
    }

    pub fn get_cart(&self, user_id: Uuid) -> Result<CartView, DomainError> {
        let items = self.carts.list_lines(user_id)?;
        let total = cart_total(&items);
        Ok(CartView { items, total })
    }

    /// Adds `quantity` of a product, merging with an existing line for the
    /// same product and refreshing its price snapshot.
    pub fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        let quantity = positive(quantity)?;
        let product = self
            .products
            .find_by_id(product_id)?
            .ok_or(DomainError::ProductNotFound { product_id })?;

        let in_cart = self
            .carts
            .find_line_for_product(user_id, product_id)?
            .map_or(0, |line| line.quantity);
        let requested = in_cart
            .checked_add(quantity)
            .ok_or_else(|| DomainError::InvalidInput("quantity is too large".to_string()))?;
        if product.stock < requested {
            return Err(DomainError::InsufficientStock {
                product_id,
                available: product.stock,
                requested,
            });
        }

        let line = self
            .carts
            .add_or_increment(user_id, product_id, quantity, product.price)?;
        log::debug!(
            "User {} now has {} x {} in cart",
            user_id,
            line.quantity,
            product_id
        );
        Ok(line)
    }

    pub fn update_item(
        &self,
        user_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        let quantity = positive(quantity)?;
        let line = self
            .carts
            .find_line(user_id, line_id)?
            .ok_or(DomainError::NotFound("Cart item"))?;
        let product = self
            .products
            .find_by_id(line.product_id)?
            .ok_or(DomainError::ProductNotFound {
                product_id: line.product_id,
            })?;
        if product.stock < quantity {
            return Err(DomainError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: quantity,
            });
        }
        self.carts.set_quantity(line.id, quantity)
    }

    pub fn remove_item(&self, user_id: Uuid, line_id: Uuid) -> Result<(), DomainError> {
        if self.carts.remove_line(user_id, line_id)? {
            Ok(())
        } else {
            Err(DomainError::NotFound("Cart item"))
        }
    }

    pub fn clear(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.carts.clear(user_id)
    }
}
