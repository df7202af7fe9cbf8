pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod shops;
pub mod verification;

use crate::errors::AppError;

/// Error mapping for the blocking pool itself (cancelled or panicked task).
pub(crate) fn blocking_failed(e: actix_web::error::BlockingError) -> AppError {
    AppError::Internal(e.to_string())
}

/// Decimal amounts travel as strings, e.g. "9.99".
pub(crate) fn parse_amount(field: &str, value: &str) -> Result<bigdecimal::BigDecimal, AppError> {
    value
        .trim()
        .parse()
        .map_err(|e| AppError::BadRequest(format!("invalid {} '{}': {}", field, value, e)))
}
