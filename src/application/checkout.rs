use super::cart_validator::CartValidator;
use crate::domain::cart::ValidatedCart;
use crate::domain::checkout::{CheckoutDetails, CheckoutRequest, FieldError};
use crate::domain::payment::{PaymentAuthorityError, PaymentAuthorization, PaymentMetadata};
use crate::domain::ports::PaymentAuthorityRef;
use crate::error::StorefrontError;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Invalid checkout data")]
    InvalidCheckoutData(Vec<FieldError>),
    #[error("Cart validation failed")]
    CartValidationFailed(Box<ValidatedCart>),
    #[error("Failed to create payment intent: {0}")]
    PaymentIntentCreationFailed(#[source] PaymentAuthorityError),
    #[error("Checkout infrastructure failure: {0}")]
    Infrastructure(#[from] StorefrontError),
}

/// Turns a checkout request into a payment authorization.
///
/// The cart is always re-priced before the payment authority is contacted,
/// and the authority only ever sees the catalog-derived total.
pub struct CheckoutIntentBuilder {
    validator: Arc<CartValidator>,
    payments: PaymentAuthorityRef,
}

impl CheckoutIntentBuilder {
    pub fn new(validator: Arc<CartValidator>, payments: PaymentAuthorityRef) -> Self {
        Self {
            validator,
            payments,
        }
    }

    #[instrument(skip_all, fields(lines = request.items.len()))]
    pub async fn create_checkout_intent(
        &self,
        request: CheckoutRequest,
    ) -> Result<PaymentAuthorization, CheckoutError> {
        let details = request.validate().map_err(|errors| {
            warn!(problems = errors.len(), "structurally invalid checkout");
            CheckoutError::InvalidCheckoutData(errors)
        })?;

        let cart = self
            .validator
            .validate_cart(&details.items, Some(&details.shipping_address))
            .await?;
        if !cart.is_valid {
            warn!(errors = ?cart.errors, "checkout cart rejected");
            return Err(CheckoutError::CartValidationFailed(Box::new(cart)));
        }

        let metadata = build_metadata(&details, &cart)?;

        let taxed = self
            .payments
            .create_payment_intent_with_tax(cart.total, &details.shipping_address, &metadata)
            .await
            .map_err(|e| {
                error!(error = %e, "payment intent creation failed");
                CheckoutError::PaymentIntentCreationFailed(e)
            })?;

        info!(
            payment_intent = %taxed.payment_intent.id,
            amount = %cart.total,
            tax = %taxed.tax_amount,
            total = %taxed.total,
            "payment intent created"
        );

        Ok(PaymentAuthorization {
            client_secret: taxed.payment_intent.client_secret,
            amount: cart.total,
            tax_amount: taxed.tax_amount,
            total: taxed.total,
        })
    }
}

#[derive(Serialize)]
struct MetadataItem<'a> {
    id: String,
    title: &'a str,
    price: String,
    quantity: u32,
}

/// Flattens the checkout into the authority's string-only metadata channel.
fn build_metadata(
    details: &CheckoutDetails,
    cart: &ValidatedCart,
) -> Result<PaymentMetadata, StorefrontError> {
    let items: Vec<MetadataItem<'_>> = cart
        .items
        .iter()
        .map(|line| MetadataItem {
            id: line.item_id.to_string(),
            title: &line.title,
            price: line.price.to_string(),
            quantity: line.quantity,
        })
        .collect();

    let mut metadata = PaymentMetadata::new();
    metadata.insert("customer_name".into(), details.customer_name.clone());
    metadata.insert("customer_email".into(), details.customer_email.clone());
    metadata.insert(
        "shipping_address".into(),
        serde_json::to_string(&details.shipping_address)?,
    );
    metadata.insert(
        "billing_address".into(),
        serde_json::to_string(&details.billing_address)?,
    );
    metadata.insert(
        "order_notes".into(),
        details.order_notes.clone().unwrap_or_default(),
    );
    metadata.insert("items".into(), serde_json::to_string(&items)?);
    metadata.insert("subtotal".into(), cart.subtotal.to_string());
    metadata.insert("shipping_cost".into(), cart.shipping_cost.to_string());
    metadata.insert("total".into(), cart.total.to_string());
    Ok(metadata)
}
