//! Unified error handling for the checkout service.
//!
//! `AppError` collects every error a handler can return and maps it to an
//! HTTP response with a `{"error": "..."}` body.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::{BillingApiError, CatalogError, CheckoutError};

/// Unified application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Checkout state machine errors
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Plan catalog load errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Billing client construction errors
    #[error("Billing client error: {0}")]
    Billing(#[from] BillingApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::Validation(_) | CheckoutError::InvalidPromo => StatusCode::BAD_REQUEST,
        CheckoutError::Card { .. } | CheckoutError::Billing { .. } => StatusCode::PAYMENT_REQUIRED,
        CheckoutError::NotFound(_) | CheckoutError::UnknownPlan(_) => StatusCode::NOT_FOUND,
        CheckoutError::InvalidTransition { .. }
        | CheckoutError::AlreadySubmitting
        | CheckoutError::Superseded
        | CheckoutError::Discarded => StatusCode::CONFLICT,
        CheckoutError::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CheckoutError::PromoUnavailable(_)
        | CheckoutError::Network(_)
        | CheckoutError::Reconcile(_) => StatusCode::BAD_GATEWAY,
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Checkout(e) => checkout_status(e),
            AppError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Billing(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = match self {
            // Checkout errors already carry the visitor-facing message
            AppError::Checkout(e) => e.user_message(),
            // Don't expose internal details
            AppError::Catalog(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Billing(_) => "Billing service error".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "error": error_message
        });

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckoutPhase;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("Missing field".to_string());
        assert_eq!(format!("{}", err), "Bad request: Missing field");

        let err = AppError::Checkout(CheckoutError::InvalidPromo);
        assert_eq!(format!("{}", err), "Checkout error: Invalid promo code");
    }

    #[test]
    fn test_checkout_status_codes() {
        let cases = [
            (
                CheckoutError::Validation("Name is required".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CheckoutError::Card {
                    reason: "card_declined".to_string(),
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (CheckoutError::NotFound(uuid::Uuid::nil()), StatusCode::NOT_FOUND),
            (CheckoutError::AlreadySubmitting, StatusCode::CONFLICT),
            (
                CheckoutError::InvalidTransition {
                    action: "submit",
                    phase: CheckoutPhase::Success,
                },
                StatusCode::CONFLICT,
            ),
            (
                CheckoutError::GatewayUnavailable("timeout".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CheckoutError::Network("reset".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_config_error_conversion() {
        let config_err = ConfigError::MissingVar("TEST_VAR".to_string());
        let app_err: AppError = config_err.into();
        assert!(matches!(app_err, AppError::Config(_)));
    }

    #[test]
    fn test_error_response_hides_internal_details() {
        let err = AppError::Internal("sensitive details".to_string());
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_uses_checkout_message() {
        let err = AppError::Checkout(CheckoutError::Network("connection reset".to_string()));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
