use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        // A failure while fulfilling a payment must stay a 5xx so the provider
        // redelivers, whatever the underlying cause.
        if matches!(e, DomainError::Payment { .. }) {
            return match e.kind() {
                DomainError::MalformedEvent(msg) => AppError::BadRequest(msg.clone()),
                DomainError::Provider(_) | DomainError::NotFound => AppError::Provider(e.to_string()),
                _ => AppError::Internal(e.to_string()),
            };
        }
        match e.kind() {
            DomainError::InvalidInput(msg) | DomainError::MalformedEvent(msg) => {
                AppError::BadRequest(msg.clone())
            }
            DomainError::NotFound => AppError::NotFound("Not found".to_string()),
            DomainError::VariantNotFound(_) => AppError::NotFound(e.kind().to_string()),
            DomainError::Provider(_) => AppError::Provider(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": msg
            })),
            AppError::Provider(msg) => {
                log::error!("{msg}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "success": false,
                    "error": msg
                }))
            }
            AppError::Internal(msg) => {
                log::error!("{msg}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "success": false,
                    "error": "Internal server error"
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn bad_request_returns_400() {
        let err = AppError::BadRequest("cart must not be empty".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_while_fulfilling_a_payment_is_a_500() {
        let app_err: AppError = DomainError::NotFound.for_payment("31337").into();
        assert!(matches!(app_err, AppError::Provider(_)));
        assert_eq!(
            app_err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn untagged_not_found_stays_404() {
        let app_err: AppError = DomainError::NotFound.into();
        assert_eq!(
            app_err.error_response().status(),
            actix_web::http::StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn tagged_data_integrity_error_is_internal() {
        let app_err: AppError = DomainError::VariantNotFound(7).for_payment("1").into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn domain_invalid_input_maps_to_bad_request() {
        let app_err: AppError = DomainError::InvalidInput("bad value".to_string()).into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
    }

    #[test]
    fn domain_variant_not_found_names_the_variant() {
        let app_err: AppError = DomainError::VariantNotFound(17).into();
        assert_eq!(app_err.to_string(), "Product variant 17 not found");
    }

    #[test]
    fn domain_provider_error_keeps_provider_message() {
        let app_err: AppError = DomainError::Provider("invalid token".to_string()).into();
        assert!(matches!(app_err, AppError::Provider(_)));
        assert_eq!(app_err.to_string(), "Payment provider error: invalid token");
    }

    #[test]
    fn tagged_data_integrity_error_maps_to_internal_with_payment_id() {
        let app_err: AppError = DomainError::DataIntegrity("cart is empty".to_string())
            .for_payment("321")
            .into();
        match app_err {
            AppError::Internal(msg) => assert!(msg.contains("321")),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn tagged_provider_error_on_webhook_still_returns_500() {
        let app_err: AppError = DomainError::Provider("timeout".to_string())
            .for_payment("5")
            .into();
        assert_eq!(
            app_err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_not_found_maps_to_404() {
        let app_err: AppError = DomainError::NotFound.into();
        assert_eq!(
            app_err.error_response().status(),
            actix_web::http::StatusCode::NOT_FOUND
        );
    }
}
