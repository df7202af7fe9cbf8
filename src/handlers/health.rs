use actix_web::{web, HttpResponse};
use diesel::connection::SimpleConnection;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking_failed;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// GET /health
///
/// Liveness plus a round trip to the database.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 500, description = "Database unreachable"),
    ),
    tag = "health"
)]
pub async fn health(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    web::block(move || {
        let mut conn = state.pool.get().map_err(DomainError::from)?;
        conn.batch_execute("SELECT 1").map_err(DomainError::from)?;
        Ok::<_, DomainError>(())
    })
    .await
    .map_err(blocking_failed)??;

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        database: "ok".to_string(),
    }))
}
