use crate::application::cart_service::CartService;
use crate::application::checkout_service::CheckoutService;
use crate::application::order_service::OrderService;
use crate::application::product_service::ProductService;
use crate::application::shop_service::ShopService;
use crate::application::verification_service::VerificationService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::notify::LogCodeSender;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::product_repo::DieselProductRepository;
use crate::infrastructure::shop_repo::DieselShopRepository;
use crate::infrastructure::verification_repo::DieselVerificationRepository;

/// Services shared by every worker, wired to the Postgres repositories.
pub struct AppState {
    pub pool: DbPool,
    pub checkout: CheckoutService<DieselOrderRepository>,
    pub orders: OrderService<DieselOrderRepository>,
    pub carts: CartService<DieselCartRepository, DieselProductRepository>,
    pub products: ProductService<DieselProductRepository, DieselShopRepository>,
    pub shops: ShopService<DieselShopRepository>,
    pub verification: VerificationService<DieselVerificationRepository, LogCodeSender>,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        let orders = DieselOrderRepository::new(pool.clone());
        let products = DieselProductRepository::new(pool.clone());
        let shops = DieselShopRepository::new(pool.clone());
        Self {
            checkout: CheckoutService::new(orders.clone(), config.pricing_policy),
            orders: OrderService::new(orders, config.restock_on_cancel),
            carts: CartService::new(DieselCartRepository::new(pool.clone()), products.clone()),
            products: ProductService::new(products, shops.clone()),
            shops: ShopService::new(shops),
            verification: VerificationService::new(
                DieselVerificationRepository::new(pool.clone()),
                LogCodeSender,
                config.verification_code_ttl,
            ),
            pool,
        }
    }
}
