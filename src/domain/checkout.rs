//! Checkout request shapes and their structural validation.
//!
//! Requests arrive as loosely typed `*Input` records whose fields all have
//! defaults, so that a missing field is reported as a field-level problem
//! rather than a parse failure. `CheckoutRequest::validate` turns them into
//! the typed `CheckoutDetails` used by the pricing pipeline.

use super::cart::{CartLineClaim, ItemId};
use super::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

const MAX_NAME_LEN: usize = 200;
const MAX_NOTES_LEN: usize = 1000;
const MAX_EMAIL_LEN: usize = 254;

/// A single structural problem with a request, addressed by its JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A validated postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2, upper case.
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressInput {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
}

/// A cart line as posted by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartClaimInput {
    pub id: String,
    pub title: String,
    /// Untyped so that a wrong JSON type is reported against this field.
    pub price: Option<Value>,
    pub quantity: Option<Value>,
    pub slug: String,
}

/// A cart submitted for pricing only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartRequest {
    pub items: Vec<CartClaimInput>,
}

/// The body of a checkout request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutRequest {
    pub items: Vec<CartClaimInput>,
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: Option<AddressInput>,
    pub billing_address: Option<AddressInput>,
    pub same_as_shipping: bool,
    pub order_notes: Option<String>,
}

/// A structurally valid checkout request.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub order_notes: Option<String>,
    pub items: Vec<CartLineClaim>,
}

impl CheckoutRequest {
    /// Checks the shape of the request without touching the catalog.
    ///
    /// Collects every problem instead of stopping at the first one.
    pub fn validate(&self) -> Result<CheckoutDetails, Vec<FieldError>> {
        let mut errors = Vec::new();

        let customer_name = self.customer_name.trim().to_string();
        if customer_name.is_empty() {
            errors.push(FieldError::new("customerName", "Name is required"));
        } else if customer_name.chars().count() > MAX_NAME_LEN {
            errors.push(FieldError::new("customerName", "Name is too long"));
        }

        let customer_email = self.customer_email.trim().to_lowercase();
        if !is_well_formed_email(&customer_email) {
            errors.push(FieldError::new("customerEmail", "Invalid email address"));
        }

        let shipping_address = match &self.shipping_address {
            Some(input) => input.validate("shippingAddress", &mut errors),
            None => {
                errors.push(FieldError::new(
                    "shippingAddress",
                    "Shipping address is required",
                ));
                None
            }
        };

        let billing_address = if self.same_as_shipping {
            shipping_address.clone()
        } else {
            match &self.billing_address {
                Some(input) => input.validate("billingAddress", &mut errors),
                None => {
                    errors.push(FieldError::new(
                        "billingAddress",
                        "Billing address is required",
                    ));
                    None
                }
            }
        };

        let order_notes = self
            .order_notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string);
        if order_notes
            .as_ref()
            .is_some_and(|notes| notes.chars().count() > MAX_NOTES_LEN)
        {
            errors.push(FieldError::new("orderNotes", "Order notes are too long"));
        }

        let items = match validate_claims(&self.items) {
            Ok(items) => items,
            Err(item_errors) => {
                errors.extend(item_errors);
                Vec::new()
            }
        };

        match (shipping_address, billing_address) {
            (Some(shipping_address), Some(billing_address)) if errors.is_empty() => {
                Ok(CheckoutDetails {
                    customer_name,
                    customer_email,
                    shipping_address,
                    billing_address,
                    order_notes,
                    items,
                })
            }
            _ => Err(errors),
        }
    }
}

impl AddressInput {
    fn validate(&self, path: &str, errors: &mut Vec<FieldError>) -> Option<Address> {
        let before = errors.len();
        let mut required = |field: &str, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                errors.push(FieldError::new(
                    format!("{path}.{field}"),
                    format!("{field} is required"),
                ));
            }
            value.to_string()
        };

        let name = required("name", &self.name);
        let line1 = required("line1", &self.line1);
        let city = required("city", &self.city);
        let postal_code = required("postalCode", &self.postal_code);

        let country = self.country.trim().to_ascii_uppercase();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.push(FieldError::new(
                format!("{path}.country"),
                "country must be a two-letter ISO code",
            ));
        }

        if errors.len() > before {
            return None;
        }

        Some(Address {
            name,
            line1,
            line2: non_blank(self.line2.as_deref()),
            city,
            state: non_blank(self.state.as_deref()),
            postal_code,
            country,
        })
    }
}

/// Checks every posted cart line and converts the well-formed ones.
///
/// An empty list is structurally fine; the cart validator reports it.
pub fn validate_claims(items: &[CartClaimInput]) -> Result<Vec<CartLineClaim>, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut claims = Vec::with_capacity(items.len());

    for (index, input) in items.iter().enumerate() {
        let path = format!("items[{index}]");
        let before = errors.len();

        let item_id = Uuid::parse_str(input.id.trim()).map(ItemId).ok();
        if item_id.is_none() {
            errors.push(FieldError::new(format!("{path}.id"), "Invalid item id"));
        }

        if input.title.trim().is_empty() {
            errors.push(FieldError::new(format!("{path}.title"), "Title is required"));
        }

        let claimed_price = match input.price.as_ref().map(decimal_from_json) {
            Some(Some(price)) => match Money::new(price) {
                Ok(price) => Some(price),
                Err(e) => {
                    errors.push(FieldError::new(format!("{path}.price"), e.to_string()));
                    None
                }
            },
            Some(None) => {
                errors.push(FieldError::new(format!("{path}.price"), "Price must be a number"));
                None
            }
            None => {
                errors.push(FieldError::new(format!("{path}.price"), "Price is required"));
                None
            }
        };

        let quantity = match &input.quantity {
            Some(value) => match value.as_u64().and_then(|q| u32::try_from(q).ok()) {
                Some(quantity) if quantity >= 1 => Some(quantity),
                _ => {
                    errors.push(FieldError::new(
                        format!("{path}.quantity"),
                        "Quantity must be a positive integer",
                    ));
                    None
                }
            },
            None => {
                errors.push(FieldError::new(
                    format!("{path}.quantity"),
                    "Quantity is required",
                ));
                None
            }
        };

        if errors.len() > before {
            continue;
        }
        if let (Some(item_id), Some(claimed_price), Some(quantity)) =
            (item_id, claimed_price, quantity)
        {
            claims.push(CartLineClaim {
                item_id,
                claimed_title: input.title.trim().to_string(),
                claimed_price,
                quantity,
                slug: input.slug.trim().to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(claims)
    } else {
        Err(errors)
    }
}

/// Reads a JSON number, or a numeric string, as an exact decimal.
fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_well_formed_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}
