use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::errors::DomainError;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking_failed, parse_amount};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub shop_id: Option<Uuid>,
    pub name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<String>,
    pub stock: Option<i32>,
}

impl UpdateProductRequest {
    fn into_changes(self) -> Result<ProductChanges, AppError> {
        Ok(ProductChanges {
            name: self.name.map(|n| n.trim().to_string()),
            price: self
                .price
                .as_deref()
                .map(|p| parse_amount("price", p))
                .transpose()?,
            stock: self.stock,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub shop_id: Option<Uuid>,
    pub name: String,
    pub price: String,
    pub stock: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            shop_id: p.shop_id,
            name: p.name,
            price: p.price.to_string(),
            stock: p.stock,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid name, price or stock"),
        (status = 403, description = "Caller neither owns the shop nor is staff"),
        (status = 404, description = "Shop not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let product = NewProduct {
        shop_id: body.shop_id,
        price: parse_amount("price", &body.price)?,
        name: body.name,
        stock: body.stock,
    };

    let actor = user.actor();
    let created = web::block(move || state.products.create_product(&actor, product))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let product = web::block(move || state.products.get_product(product_id))
        .await
        .map_err(blocking_failed)??
        .ok_or(DomainError::NotFound("Product"))?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
///
/// Partial update; omitted fields keep their value.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Nothing to update or invalid values"),
        (status = 403, description = "Caller neither owns the shop nor is staff"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let changes = body.into_inner().into_changes()?;
    let actor = user.actor();

    let updated = web::block(move || state.products.update_product(&actor, product_id, changes))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(updated)))
}
