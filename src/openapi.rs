use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{cart, health, orders, products, shops, verification};

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::list_my_orders,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_cart_item,
        cart::clear_cart,
        products::create_product,
        products::get_product,
        products::update_product,
        shops::create_shop,
        shops::get_shop,
        shops::update_shop,
        verification::send_code,
        verification::confirm_code,
        verification::verification_status,
        health::health,
    ),
    components(schemas(
        orders::CheckoutRequest,
        orders::ShippingRequest,
        orders::CheckoutResponse,
        orders::OrderItemResponse,
        orders::OrderResponse,
        orders::ShippingResponse,
        orders::PaymentResponse,
        orders::UpdateStatusRequest,
        orders::ListOrdersResponse,
        cart::AddToCartRequest,
        cart::UpdateCartItemRequest,
        cart::CartItemResponse,
        cart::CartResponse,
        cart::ClearCartResponse,
        products::CreateProductRequest,
        products::UpdateProductRequest,
        products::ProductResponse,
        shops::CreateShopRequest,
        shops::UpdateShopRequest,
        shops::ShopResponse,
        verification::SendCodeRequest,
        verification::SendCodeResponse,
        verification::ConfirmCodeRequest,
        verification::VerificationStatusResponse,
        health::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "orders", description = "Checkout and order lifecycle"),
        (name = "cart", description = "Shopping cart"),
        (name = "products", description = "Catalog"),
        (name = "shops", description = "Shops and their owners"),
        (name = "verification", description = "Email and phone verification codes"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
