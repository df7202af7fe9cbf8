//! In-process store used by the service tests. Transactions run against a
//! copy of the state under one lock and replace it only on success, which
//! gives the same all-or-nothing and serialisation behaviour the services
//! rely on from Postgres.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::errors::DomainError;
use crate::domain::events::OrderEvent;
use crate::domain::order::{
    ListResult, NewOrder, Order, OrderFilter, OrderItem, OrderStatus, PaymentInfo,
};
use crate::domain::ports::{
    CartRepository, OrderRepository, ProductRepository, ShopRepository, StoreTx, UnitOfWork,
    VerificationRepository,
};
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::domain::shop::{NewShop, Shop, ShopChanges};
use crate::domain::verification::{Channel, NewVerificationCode, VerificationCode, VerifiedChannel};

#[derive(Debug, Clone, Default)]
struct State {
    shops: HashMap<Uuid, Shop>,
    products: HashMap<Uuid, Product>,
    cart: Vec<CartLine>,
    orders: Vec<Order>,
    events: Vec<OrderEvent>,
    codes: Vec<VerificationCode>,
    verified: Vec<VerifiedChannel>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_next_order_insert: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("store lock poisoned".to_string()))
    }

    pub fn seed_product(&self, price: BigDecimal, stock: i32) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            shop_id: None,
            name: "Seeded product".to_string(),
            price,
            stock,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .products
            .insert(product.id, product.clone());
        product
    }

    pub fn seed_shop(&self, owner_id: Uuid, name: &str) -> Shop {
        let new = NewShop::new(owner_id, name, "", "").unwrap();
        ShopRepository::create(self, new).unwrap()
    }

    pub fn seed_cart_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price_snapshot: BigDecimal,
    ) -> CartLine {
        let line = CartLine {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity,
            price_snapshot,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().cart.push(line.clone());
        line
    }

    pub fn remove_product(&self, product_id: Uuid) {
        self.state.lock().unwrap().products.remove(&product_id);
    }

    pub fn product(&self, product_id: Uuid) -> Option<Product> {
        self.state.lock().unwrap().products.get(&product_id).cloned()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn events(&self) -> Vec<OrderEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn cart(&self, user_id: Uuid) -> Vec<CartLine> {
        self.state
            .lock()
            .unwrap()
            .cart
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Makes the next `insert_order` inside a transaction fail like a lost
    /// connection would.
    pub fn fail_next_order_insert(&self) {
        self.fail_next_order_insert.store(true, Ordering::SeqCst);
    }

    pub fn expire_code(&self, user_id: Uuid, channel: Channel, at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        for code in state
            .codes
            .iter_mut()
            .filter(|c| c.user_id == user_id && c.channel == channel)
        {
            code.expires_at = at;
        }
    }

    pub fn code_attempts(&self, user_id: Uuid, channel: Channel) -> Option<i32> {
        self.state
            .lock()
            .unwrap()
            .codes
            .iter()
            .find(|c| c.user_id == user_id && c.channel == channel)
            .map(|c| c.attempts)
    }
}

struct MemoryTx {
    state: State,
    fail_order_insert: bool,
}

impl StoreTx for MemoryTx {
    fn cart_lines(&mut self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        Ok(self
            .state
            .cart
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    fn clear_cart(&mut self, user_id: Uuid) -> Result<usize, DomainError> {
        let before = self.state.cart.len();
        self.state.cart.retain(|l| l.user_id != user_id);
        Ok(before - self.state.cart.len())
    }

    fn product_for_update(&mut self, product_id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.state.products.get(&product_id).cloned())
    }

    fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        match self.state.products.get_mut(&product_id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn increment_stock(&mut self, product_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        if let Some(product) = self.state.products.get_mut(&product_id) {
            product.stock += quantity;
        }
        Ok(())
    }

    fn insert_order(&mut self, order: NewOrder) -> Result<Order, DomainError> {
        if self.fail_order_insert {
            return Err(DomainError::Internal("connection reset by peer".to_string()));
        }
        if self
            .state
            .orders
            .iter()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(DomainError::Internal(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }
        let now = Utc::now();
        let persisted = Order {
            id: Uuid::new_v4(),
            order_number: order.order_number,
            user_id: order.user_id,
            status: OrderStatus::Pending,
            total_amount: order.total_amount.clone(),
            shipping: order.shipping,
            payment: PaymentInfo {
                method: order.payment_method,
                amount: order.total_amount,
                status: "pending".to_string(),
            },
            items: order
                .items
                .into_iter()
                .map(|i| OrderItem {
                    id: Uuid::new_v4(),
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price_at_time: i.price_at_time,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        self.state.orders.push(persisted.clone());
        Ok(persisted)
    }

    fn order_for_update(&mut self, order_id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.state.orders.iter().find(|o| o.id == order_id).cloned())
    }

    fn set_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, DomainError> {
        let order = self
            .state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(DomainError::NotFound("Order"))?;
        order.status = status;
        if tracking_number.is_some() {
            order.shipping.tracking_number = tracking_number;
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    fn append_event(&mut self, event: OrderEvent) -> Result<(), DomainError> {
        self.state.events.push(event);
        Ok(())
    }
}

impl UnitOfWork for InMemoryStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, DomainError>,
    {
        let mut guard = self.lock()?;
        let mut tx = MemoryTx {
            state: guard.clone(),
            fail_order_insert: self.fail_next_order_insert.swap(false, Ordering::SeqCst),
        };
        let result = f(&mut tx)?;
        *guard = tx.state;
        Ok(result)
    }
}

impl ShopRepository for InMemoryStore {
    fn create(&self, shop: NewShop) -> Result<Shop, DomainError> {
        let mut state = self.lock()?;
        if state.shops.values().any(|s| s.name == shop.name) {
            return Err(DomainError::Conflict(format!(
                "shop name '{}' is already taken",
                shop.name
            )));
        }
        let now = Utc::now();
        let created = Shop {
            id: shop.id,
            owner_id: shop.owner_id,
            name: shop.name,
            slug: shop.slug,
            description: shop.description,
            moto: shop.moto,
            created_at: now,
            updated_at: now,
        };
        state.shops.insert(created.id, created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Shop>, DomainError> {
        Ok(self.lock()?.shops.get(&id).cloned())
    }

    fn update(&self, id: Uuid, changes: ShopChanges) -> Result<Option<Shop>, DomainError> {
        let mut state = self.lock()?;
        if let Some(name) = &changes.name {
            if state.shops.values().any(|s| s.id != id && &s.name == name) {
                return Err(DomainError::Conflict(format!(
                    "shop name '{}' is already taken",
                    name
                )));
            }
        }
        let Some(shop) = state.shops.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            shop.name = name;
        }
        if let Some(description) = changes.description {
            shop.description = description;
        }
        if let Some(moto) = changes.moto {
            shop.moto = moto;
        }
        if let Some(slug) = changes.slug {
            shop.slug = slug;
        }
        shop.updated_at = Utc::now();
        Ok(Some(shop.clone()))
    }
}

impl ProductRepository for InMemoryStore {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let now = Utc::now();
        let created = Product {
            id: Uuid::new_v4(),
            shop_id: product.shop_id,
            name: product.name,
            price: product.price,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.products.insert(created.id, created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>, DomainError> {
        let mut state = self.lock()?;
        let Some(product) = state.products.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(stock) = changes.stock {
            product.stock = stock;
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }
}

impl CartRepository for InMemoryStore {
    fn list_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        Ok(self.cart(user_id))
    }

    fn find_line(&self, user_id: Uuid, line_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        Ok(self
            .lock()?
            .cart
            .iter()
            .find(|l| l.id == line_id && l.user_id == user_id)
            .cloned())
    }

    fn find_line_for_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartLine>, DomainError> {
        Ok(self
            .lock()?
            .cart
            .iter()
            .find(|l| l.product_id == product_id && l.user_id == user_id)
            .cloned())
    }

    fn add_or_increment(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: BigDecimal,
    ) -> Result<CartLine, DomainError> {
        let mut state = self.lock()?;
        if let Some(line) = state
            .cart
            .iter_mut()
            .find(|l| l.product_id == product_id && l.user_id == user_id)
        {
            line.quantity += quantity;
            line.price_snapshot = price;
            return Ok(line.clone());
        }
        let line = CartLine {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity,
            price_snapshot: price,
            created_at: Utc::now(),
        };
        state.cart.push(line.clone());
        Ok(line)
    }

    fn set_quantity(&self, line_id: Uuid, quantity: i32) -> Result<CartLine, DomainError> {
        let mut state = self.lock()?;
        let line = state
            .cart
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(DomainError::NotFound("Cart item"))?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    fn remove_line(&self, user_id: Uuid, line_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        let before = state.cart.len();
        state
            .cart
            .retain(|l| !(l.id == line_id && l.user_id == user_id));
        Ok(state.cart.len() < before)
    }

    fn clear(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        let before = state.cart.len();
        state.cart.retain(|l| l.user_id != user_id);
        Ok(before - state.cart.len())
    }
}

impl OrderRepository for InMemoryStore {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock()?.orders.iter().find(|o| o.id == id).cloned())
    }

    fn list(&self, filter: &OrderFilter, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let state = self.lock()?;
        let matching: Vec<&Order> = state
            .orders
            .iter()
            .rev()
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .filter(|o| filter.user_id.map_or(true, |u| o.user_id == u))
            .collect();
        let offset = usize::try_from((page - 1).saturating_mul(limit)).unwrap_or(usize::MAX);
        Ok(ListResult {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(offset)
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }
}

impl VerificationRepository for InMemoryStore {
    fn upsert(&self, code: NewVerificationCode) -> Result<VerificationCode, DomainError> {
        let mut state = self.lock()?;
        state
            .codes
            .retain(|c| !(c.user_id == code.user_id && c.channel == code.channel));
        let stored = VerificationCode {
            id: Uuid::new_v4(),
            user_id: code.user_id,
            channel: code.channel,
            target: code.target,
            code_hash: code.code_hash,
            attempts: 0,
            expires_at: code.expires_at,
            consumed_at: None,
        };
        state.codes.push(stored.clone());
        Ok(stored)
    }

    fn find_pending(
        &self,
        user_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerificationCode>, DomainError> {
        Ok(self
            .lock()?
            .codes
            .iter()
            .find(|c| c.user_id == user_id && c.channel == channel && c.consumed_at.is_none())
            .cloned())
    }

    fn claim_attempt(&self, id: Uuid, max_attempts: i32) -> Result<Option<i32>, DomainError> {
        let mut state = self.lock()?;
        let code = state
            .codes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DomainError::NotFound("Verification code"))?;
        if code.attempts >= max_attempts {
            return Ok(None);
        }
        code.attempts += 1;
        Ok(Some(code.attempts))
    }

    fn consume(&self, code: &VerificationCode, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .codes
            .iter_mut()
            .find(|c| c.id == code.id && c.consumed_at.is_none())
        {
            Some(pending) => pending.consumed_at = Some(at),
            None => return Ok(false),
        }
        state
            .verified
            .retain(|v| !(v.user_id == code.user_id && v.channel == code.channel));
        state.verified.push(VerifiedChannel {
            user_id: code.user_id,
            channel: code.channel,
            target: code.target.clone(),
            verified_at: at,
        });
        Ok(true)
    }

    fn verified(
        &self,
        user_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerifiedChannel>, DomainError> {
        Ok(self
            .lock()?
            .verified
            .iter()
            .find(|v| v.user_id == user_id && v.channel == channel)
            .cloned())
    }
}
