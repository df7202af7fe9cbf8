use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_service::{normalize_paging, DEFAULT_PAGE_SIZE};
use crate::auth::AuthUser;
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order, OrderFilter, OrderItem, OrderStatus, ShippingInfo};
use crate::domain::roles::STAFF;
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking_failed;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShippingRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl From<ShippingRequest> for ShippingInfo {
    fn from(s: ShippingRequest) -> Self {
        ShippingInfo {
            name: s.name.trim().to_string(),
            email: s.email.trim().to_string(),
            phone: s.phone.trim().to_string(),
            address: s.address.trim().to_string(),
            city: s.city.trim().to_string(),
            postal_code: s.postal_code.trim().to_string(),
            country: s.country.trim().to_string(),
            tracking_number: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub shipping: ShippingRequest,
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price_at_time: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        OrderItemResponse {
            id: i.id,
            product_id: i.product_id,
            quantity: i.quantity,
            price_at_time: i.price_at_time.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: String,
    pub total_amount: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingResponse {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub method: String,
    pub amount: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: String,
    pub total_amount: String,
    pub shipping: ShippingResponse,
    pub payment: PaymentResponse,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            order_number: o.order_number,
            user_id: o.user_id,
            status: o.status.to_string(),
            total_amount: o.total_amount.to_string(),
            shipping: ShippingResponse {
                name: o.shipping.name,
                email: o.shipping.email,
                phone: o.shipping.phone,
                address: o.shipping.address,
                city: o.shipping.city,
                postal_code: o.shipping.postal_code,
                country: o.shipping.country,
                tracking_number: o.shipping.tracking_number,
            },
            payment: PaymentResponse {
                method: o.payment.method,
                amount: o.payment.amount.to_string(),
                status: o.payment.status,
            },
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of pending, paid, processing, shipped, delivered, cancelled
    pub status: String,
    /// Only accepted together with `shipped`
    pub tracking_number: Option<String>,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 10, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Only orders in this status.
    pub status: Option<String>,
    /// Only orders of this user (staff listing only).
    pub user_id: Option<Uuid>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl ListOrdersResponse {
    fn new(result: ListResult, page: i64, limit: i64) -> Self {
        ListOrdersResponse {
            items: result.items.into_iter().map(OrderResponse::from).collect(),
            total: result.total,
            page,
            limit,
        }
    }
}

fn status_filter(status: Option<&str>) -> Result<Option<OrderStatus>, AppError> {
    status
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(AppError::from)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checks out the caller's cart. Stock decrement, order insert, outbox event
/// and cart clearing commit together or not at all.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created from the cart", body = CheckoutResponse),
        (status = 400, description = "Empty cart or invalid shipping/payment input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "A product in the cart no longer exists"),
        (status = 409, description = "Insufficient stock"),
        (status = 500, description = "Checkout failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let shipping = ShippingInfo::from(body.shipping);

    let order = web::block(move || {
        state
            .checkout
            .create_order_from_cart(user.user_id, shipping, &body.payment_method)
    })
    .await
    .map_err(blocking_failed)?
    .map_err(AppError::checkout)?;

    Ok(HttpResponse::Created().json(CheckoutResponse {
        order_id: order.id,
        order_number: order.order_number,
        status: order.status.to_string(),
        total_amount: order.total_amount.to_string(),
        items: order.items.into_iter().map(OrderItemResponse::from).collect(),
    }))
}

/// GET /orders/user
///
/// The caller's own orders, newest first.
#[utoipa::path(
    get,
    path = "/orders/user",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of the caller's orders", body = ListOrdersResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_my_orders(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, limit) = normalize_paging(params.page, params.limit);
    let filter = OrderFilter {
        status: status_filter(params.status.as_deref())?,
        user_id: Some(user.user_id),
    };

    let result = web::block(move || state.orders.list_orders(&filter, page, limit))
        .await
        .map_err(blocking_failed)??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse::new(result, page, limit)))
}

/// GET /orders
///
/// Every order, optionally filtered by status and user. Staff only.
#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not staff"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    user.require_any_role(STAFF)?;
    let params = query.into_inner();
    let (page, limit) = normalize_paging(params.page, params.limit);
    let filter = OrderFilter {
        status: status_filter(params.status.as_deref())?,
        user_id: params.user_id,
    };

    let result = web::block(move || state.orders.list_orders(&filter, page, limit))
        .await
        .map_err(blocking_failed)??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse::new(result, page, limit)))
}

/// GET /orders/{id}
///
/// Visible to the order's owner and to staff. Anyone else gets 404 so order
/// ids reveal nothing.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || state.orders.get_order(order_id))
        .await
        .map_err(blocking_failed)??;

    match order {
        Some(order) if order.user_id == user.user_id || user.is_any_of(STAFF) => {
            Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
        }
        _ => Err(DomainError::NotFound("Order").into()),
    }
}

/// PUT /orders/{id}/status
///
/// Moves an order to the next fulfilment step or cancels it. Staff only.
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status or misplaced tracking number"),
        (status = 403, description = "Caller is not staff"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_any_role(STAFF)?;
    let order_id = path.into_inner();
    let body = body.into_inner();
    let status: OrderStatus = body.status.parse()?;

    let order = web::block(move || {
        state
            .orders
            .update_status(order_id, status, body.tracking_number)
    })
    .await
    .map_err(blocking_failed)??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
