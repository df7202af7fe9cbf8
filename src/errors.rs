use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(DomainError),

    /// Checkout rolled back for a reason the caller cannot fix.
    #[error("Checkout failed: {0}")]
    CheckoutFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::Domain(e)
    }
}

impl AppError {
    /// Mapping used by the checkout endpoint: storage failures surface as
    /// `CheckoutFailed`, business rejections keep their own kind.
    pub fn checkout(e: DomainError) -> Self {
        match e {
            DomainError::Internal(msg) => AppError::CheckoutFailed(msg),
            other => AppError::Domain(other),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Domain(e) => match e {
                DomainError::EmptyCart => "EmptyCart",
                DomainError::ProductNotFound { .. } => "ProductNotFound",
                DomainError::InsufficientStock { .. } => "InsufficientStock",
                DomainError::NotFound(_) => "NotFound",
                DomainError::InvalidTransition { .. } => "InvalidTransition",
                DomainError::VerificationExpired => "VerificationExpired",
                DomainError::VerificationMismatch => "VerificationMismatch",
                DomainError::TooManyAttempts => "TooManyAttempts",
                DomainError::InvalidInput(_) => "InvalidInput",
                DomainError::Forbidden(_) => "Forbidden",
                DomainError::Conflict(_) => "Conflict",
                DomainError::Internal(_) => "Internal",
            },
            AppError::CheckoutFailed(_) => "CheckoutFailed",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden => "Forbidden",
            AppError::BadRequest(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
        }
    }

    fn detail(&self) -> Option<Value> {
        match self {
            AppError::Domain(DomainError::ProductNotFound { product_id }) => {
                Some(json!({ "product_id": product_id }))
            }
            AppError::Domain(DomainError::InsufficientStock {
                product_id,
                available,
                requested,
            }) => Some(json!({
                "product_id": product_id,
                "available": available,
                "requested": requested,
            })),
            AppError::Domain(DomainError::InvalidTransition { from, to }) => Some(json!({
                "from": from.as_str(),
                "to": to.as_str(),
            })),
            _ => None,
        }
    }

    /// Message shown to the client. Storage details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::Internal(_)) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            AppError::CheckoutFailed(_) => "Checkout failed, please try again".to_string(),
            other => other.to_string(),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(e) => match e {
                DomainError::EmptyCart
                | DomainError::InvalidInput(_)
                | DomainError::VerificationExpired
                | DomainError::VerificationMismatch => StatusCode::BAD_REQUEST,
                DomainError::ProductNotFound { .. } | DomainError::NotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                DomainError::InsufficientStock { .. }
                | DomainError::InvalidTransition { .. }
                | DomainError::Conflict(_) => StatusCode::CONFLICT,
                DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                DomainError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::CheckoutFailed(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "kind": self.kind(),
            "error": self.public_message(),
        });
        if let Some(detail) = self.detail() {
            body["detail"] = detail;
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;
    use uuid::Uuid;

    async fn body_of(err: AppError) -> Value {
        let bytes = to_bytes(err.error_response().into_body())
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::from(DomainError::NotFound("Order")).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display() {
        assert_eq!(
            AppError::from(DomainError::NotFound("Order")).to_string(),
            "Order not found"
        );
    }

    #[test]
    fn business_rejections_keep_their_status() {
        assert_eq!(
            AppError::from(DomainError::EmptyCart).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(DomainError::ProductNotFound {
                product_id: Uuid::new_v4()
            })
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(DomainError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Paid
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(DomainError::TooManyAttempts).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::from(DomainError::Forbidden("not the shop owner".to_string())).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(DomainError::Conflict("shop name taken".to_string())).kind(),
            "Conflict"
        );
    }

    #[test]
    fn checkout_maps_storage_failures_to_checkout_failed() {
        let err = AppError::checkout(DomainError::Internal("deadlock detected".to_string()));
        assert!(matches!(err, AppError::CheckoutFailed(_)));
        assert_eq!(err.kind(), "CheckoutFailed");

        let err = AppError::checkout(DomainError::EmptyCart);
        assert_eq!(err.kind(), "EmptyCart");
    }

    #[actix_web::test]
    async fn insufficient_stock_body_carries_detail() {
        let product_id = Uuid::new_v4();
        let body = body_of(AppError::checkout(DomainError::InsufficientStock {
            product_id,
            available: 1,
            requested: 2,
        }))
        .await;

        assert_eq!(body["kind"], "InsufficientStock");
        assert_eq!(body["detail"]["product_id"], product_id.to_string());
        assert_eq!(body["detail"]["available"], 1);
        assert_eq!(body["detail"]["requested"], 2);
    }

    #[actix_web::test]
    async fn storage_details_are_not_leaked() {
        let body = body_of(AppError::checkout(DomainError::Internal(
            "password authentication failed for user \"app\"".to_string(),
        )))
        .await;

        assert_eq!(body["kind"], "CheckoutFailed");
        assert!(!body["error"].as_str().unwrap().contains("password"));
        assert!(body.get("detail").is_none());
    }
}
