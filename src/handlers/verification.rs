use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::domain::verification::{Channel, VerifiedChannel};
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking_failed;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendCodeRequest {
    /// Email address or phone number the code is delivered to
    pub target: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendCodeResponse {
    pub expires_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmCodeRequest {
    pub code: String,
}

/// Verification state of one channel for the caller.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerificationStatusResponse {
    pub channel: String,
    pub verified: bool,
    pub target: Option<String>,
    pub verified_at: Option<String>,
}

impl VerificationStatusResponse {
    fn new(channel: Channel, verified: Option<VerifiedChannel>) -> Self {
        VerificationStatusResponse {
            channel: channel.to_string(),
            verified: verified.is_some(),
            target: verified.as_ref().map(|v| v.target.clone()),
            verified_at: verified.map(|v| v.verified_at.to_rfc3339()),
        }
    }
}

/// POST /auth/verify/{channel}/send
#[utoipa::path(
    post,
    path = "/auth/verify/{channel}/send",
    params(
        ("channel" = String, Path, description = "email or phone"),
    ),
    request_body = SendCodeRequest,
    responses(
        (status = 200, description = "Code issued", body = SendCodeResponse),
        (status = 400, description = "Unknown channel or invalid target"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "verification"
)]
pub async fn send_code(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<SendCodeRequest>,
) -> Result<HttpResponse, AppError> {
    let channel: Channel = path.into_inner().parse()?;
    let target = body.into_inner().target;

    let expires_at = web::block(move || {
        state
            .verification
            .issue(user.user_id, channel, &target, Utc::now())
    })
    .await
    .map_err(blocking_failed)??;

    Ok(HttpResponse::Ok().json(SendCodeResponse {
        expires_at: expires_at.to_rfc3339(),
    }))
}

/// POST /auth/verify/{channel}/confirm
#[utoipa::path(
    post,
    path = "/auth/verify/{channel}/confirm",
    params(
        ("channel" = String, Path, description = "email or phone"),
    ),
    request_body = ConfirmCodeRequest,
    responses(
        (status = 200, description = "Code accepted", body = VerificationStatusResponse),
        (status = 400, description = "Wrong or expired code"),
        (status = 404, description = "No pending code"),
        (status = 429, description = "Too many failed attempts"),
    ),
    security(("bearer_auth" = [])),
    tag = "verification"
)]
pub async fn confirm_code(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<ConfirmCodeRequest>,
) -> Result<HttpResponse, AppError> {
    let channel: Channel = path.into_inner().parse()?;
    let code = body.into_inner().code;

    let verified = web::block(move || {
        state
            .verification
            .confirm(user.user_id, channel, &code, Utc::now())
    })
    .await
    .map_err(blocking_failed)??;

    Ok(HttpResponse::Ok().json(VerificationStatusResponse::new(channel, Some(verified))))
}

/// GET /auth/verify/{channel}/status
#[utoipa::path(
    get,
    path = "/auth/verify/{channel}/status",
    params(
        ("channel" = String, Path, description = "email or phone"),
    ),
    responses(
        (status = 200, description = "Whether the caller verified this channel", body = VerificationStatusResponse),
        (status = 400, description = "Unknown channel"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "verification"
)]
pub async fn verification_status(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let channel: Channel = path.into_inner().parse()?;

    let verified = web::block(move || state.verification.status(user.user_id, channel))
        .await
        .map_err(blocking_failed)??;

    Ok(HttpResponse::Ok().json(VerificationStatusResponse::new(channel, verified)))
}
