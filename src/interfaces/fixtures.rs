//! JSON seed and input files used by the CLI.

use crate::domain::checkout::CartRequest;
use crate::domain::order::Order;
use crate::error::Result;
use std::io::Read;

/// Reads a JSON array of orders, as recorded by the payment webhook.
pub fn read_orders<R: Read>(source: R) -> Result<Vec<Order>> {
    Ok(serde_json::from_reader(source)?)
}

/// Reads a cart file: `{"items": [...]}`.
pub fn read_cart<R: Read>(source: R) -> Result<CartRequest> {
    Ok(serde_json::from_reader(source)?)
}
