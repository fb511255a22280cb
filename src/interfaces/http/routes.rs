use super::AppState;
use super::error::ApiError;
use crate::application::checkout::CheckoutError;
use crate::domain::checkout::{CartRequest, CheckoutRequest, FieldError, validate_claims};
use crate::domain::order::SessionId;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonDataError, JsonRejection},
    },
};
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /checkout/validate`: re-prices a cart without creating anything.
///
/// A cart that fails business rules is still a `200`; the verdict is inside
/// the returned cart.
#[instrument(skip_all)]
pub async fn validate_cart_handler(
    State(state): State<AppState>,
    payload: Result<Json<CartRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload
        .map_err(|rejection| reject_body(rejection, "Invalid cart data", "Internal server error"))?;

    let claims = validate_claims(&request.items)
        .map_err(|details| ApiError::invalid_fields("Invalid cart data", details))?;

    let cart = state
        .validator
        .validate_cart(&claims, None)
        .await
        .map_err(|e| {
            error!(error = %e, "cart validation failed");
            ApiError::internal("Internal server error")
        })?;

    Ok(Json(json!({ "cart": cart })))
}

/// `POST /checkout`: validates, re-prices and authorizes payment.
#[instrument(skip_all)]
pub async fn checkout_handler(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        reject_body(rejection, "Invalid checkout data", "Failed to create payment intent")
    })?;

    match state.checkout.create_checkout_intent(request).await {
        Ok(authorization) => Ok(Json(json!(authorization))),
        Err(CheckoutError::InvalidCheckoutData(details)) => {
            Err(ApiError::invalid_fields("Invalid checkout data", details))
        }
        Err(CheckoutError::CartValidationFailed(cart)) => Err(ApiError::cart_rejected(cart)),
        Err(e) => {
            error!(error = %e, "checkout failed");
            Err(ApiError::internal("Failed to create payment intent"))
        }
    }
}

/// `GET /checkout/session/{id}`: the order recorded for a payment session.
#[instrument(skip(state))]
pub async fn order_by_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session_id = SessionId::new(id).map_err(|_| ApiError::not_found("Order not found"))?;

    match state.orders.get_order_by_session_id(&session_id).await {
        Ok(Some(order)) => {
            info!(order = %order.id, "order found");
            Ok(Json(json!({ "order": order })))
        }
        Ok(None) => {
            warn!(%session_id, "no order for session yet");
            Err(ApiError::not_found("Order not found"))
        }
        Err(e) => {
            error!(error = %e, "order lookup failed");
            Err(ApiError::internal("Failed to fetch order"))
        }
    }
}

/// Well-formed JSON of the wrong shape is a field problem; anything else is
/// an unreadable body.
fn reject_body(
    rejection: JsonRejection,
    invalid: &'static str,
    unreadable: &'static str,
) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            warn!(error = %e, "request body has the wrong shape");
            ApiError::invalid_fields(invalid, vec![field_error(&e)])
        }
        other => {
            error!(error = %other, "unreadable request body");
            ApiError::internal(unreadable)
        }
    }
}

/// Splits `<prefix>: <path>: <message>` into a `FieldError`.
fn field_error(rejection: &JsonDataError) -> FieldError {
    let text = rejection.body_text();
    let detail = text
        .split_once("target type: ")
        .map_or(text.as_str(), |(_, rest)| rest);
    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(' ') => {
            FieldError::new(path, message)
        }
        _ => FieldError::new("body", detail),
    }
}
