use crate::domain::cart::ValidatedCart;
use crate::domain::checkout::FieldError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error body returned by every route: `{error, details?, cart?}`.
///
/// Only the generic message leaves the process. Internal causes are logged by
/// the handler before the `ApiError` is built.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cart: Option<Box<ValidatedCart>>,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str) -> Self {
        Self {
            status,
            error,
            details: None,
            cart: None,
        }
    }

    pub fn invalid_fields(error: &'static str, details: Vec<FieldError>) -> Self {
        Self {
            details: serde_json::to_value(details).ok(),
            ..Self::new(StatusCode::BAD_REQUEST, error)
        }
    }

    pub fn cart_rejected(cart: Box<ValidatedCart>) -> Self {
        Self {
            details: serde_json::to_value(&cart.errors).ok(),
            cart: Some(cart),
            ..Self::new(StatusCode::BAD_REQUEST, "Cart validation failed")
        }
    }

    pub fn not_found(error: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn internal(error: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
