use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::cart::{CartLine, CartView};
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking_failed;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price captured when the product was added, e.g. "9.99"
    pub price: String,
    pub subtotal: String,
}

impl From<CartLine> for CartItemResponse {
    fn from(line: CartLine) -> Self {
        CartItemResponse {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            subtotal: line.subtotal().to_string(),
            price: line.price_snapshot.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total: String,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        CartResponse {
            items: view.items.into_iter().map(CartItemResponse::from).collect(),
            total: view.total.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearCartResponse {
    pub removed: usize,
}

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The caller's cart", body = CartResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn get_cart(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse, AppError> {
    let cart = web::block(move || state.carts.get_cart(user.user_id))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /cart
///
/// Adds a product, merging with an existing line for the same product.
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Line added or merged", body = CartItemResponse),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Not enough stock for the requested quantity"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn add_to_cart(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let line = web::block(move || {
        state
            .carts
            .add_item(user.user_id, body.product_id, body.quantity)
    })
    .await
    .map_err(blocking_failed)??;
    Ok(HttpResponse::Created().json(CartItemResponse::from(line)))
}

/// PUT /cart/{id}
#[utoipa::path(
    put,
    path = "/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart line UUID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity replaced", body = CartItemResponse),
        (status = 404, description = "Line not in the caller's cart"),
        (status = 409, description = "Not enough stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn update_cart_item(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let line_id = path.into_inner();
    let quantity = body.quantity;
    let line = web::block(move || state.carts.update_item(user.user_id, line_id, quantity))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Ok().json(CartItemResponse::from(line)))
}

/// DELETE /cart/{id}
#[utoipa::path(
    delete,
    path = "/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart line UUID"),
    ),
    responses(
        (status = 204, description = "Line removed"),
        (status = 404, description = "Line not in the caller's cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn remove_cart_item(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let line_id = path.into_inner();
    web::block(move || state.carts.remove_item(user.user_id, line_id))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /cart
#[utoipa::path(
    delete,
    path = "/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ClearCartResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn clear_cart(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, AppError> {
    let removed = web::block(move || state.carts.clear(user.user_id))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Ok().json(ClearCartResponse { removed }))
}
