use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::errors::DomainError;
use crate::domain::shop::{Shop, ShopChanges};
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking_failed;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShopRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub moto: String,
    /// Defaults to the caller
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateShopRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub moto: Option<String>,
}

impl From<UpdateShopRequest> for ShopChanges {
    fn from(r: UpdateShopRequest) -> Self {
        ShopChanges {
            name: r.name,
            description: r.description,
            moto: r.moto,
            slug: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub moto: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Shop> for ShopResponse {
    fn from(s: Shop) -> Self {
        ShopResponse {
            id: s.id,
            owner_id: s.owner_id,
            name: s.name,
            slug: s.slug,
            description: s.description,
            moto: s.moto,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

/// POST /shops
#[utoipa::path(
    post,
    path = "/shops",
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop opened", body = ShopResponse),
        (status = 400, description = "Invalid name or moto"),
        (status = 403, description = "Caller is not staff"),
        (status = 409, description = "Shop name already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "shops"
)]
pub async fn create_shop(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<CreateShopRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let actor = user.actor();

    let shop = web::block(move || {
        state.shops.create_shop(
            &actor,
            body.owner_id,
            &body.name,
            &body.description,
            &body.moto,
        )
    })
    .await
    .map_err(blocking_failed)??;
    Ok(HttpResponse::Created().json(ShopResponse::from(shop)))
}

/// GET /shops/{id}
#[utoipa::path(
    get,
    path = "/shops/{id}",
    params(
        ("id" = Uuid, Path, description = "Shop UUID"),
    ),
    responses(
        (status = 200, description = "Shop found", body = ShopResponse),
        (status = 404, description = "Shop not found"),
    ),
    tag = "shops"
)]
pub async fn get_shop(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let shop_id = path.into_inner();
    let shop = web::block(move || state.shops.get_shop(shop_id))
        .await
        .map_err(blocking_failed)??
        .ok_or(DomainError::NotFound("Shop"))?;
    Ok(HttpResponse::Ok().json(ShopResponse::from(shop)))
}

/// PUT /shops/{id}
///
/// Owner or staff only. Renaming also regenerates the slug.
#[utoipa::path(
    put,
    path = "/shops/{id}",
    params(
        ("id" = Uuid, Path, description = "Shop UUID"),
    ),
    request_body = UpdateShopRequest,
    responses(
        (status = 200, description = "Shop updated", body = ShopResponse),
        (status = 400, description = "Nothing to update or invalid values"),
        (status = 403, description = "Caller neither owns the shop nor is staff"),
        (status = 404, description = "Shop not found"),
        (status = 409, description = "Shop name already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "shops"
)]
pub async fn update_shop(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateShopRequest>,
) -> Result<HttpResponse, AppError> {
    let shop_id = path.into_inner();
    let changes = ShopChanges::from(body.into_inner());
    let actor = user.actor();

    let shop = web::block(move || state.shops.update_shop(&actor, shop_id, changes))
        .await
        .map_err(blocking_failed)??;
    Ok(HttpResponse::Ok().json(ShopResponse::from(shop)))
}
