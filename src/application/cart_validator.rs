use crate::domain::cart::{CartLineClaim, CartLineItem, CatalogItem, ItemId, ValidatedCart};
use crate::domain::checkout::Address;
use crate::domain::ports::CatalogLookupRef;
use crate::domain::pricing::ShippingPolicy;
use crate::error::Result;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Re-prices client carts against the live catalog.
///
/// Every call fetches catalog rows afresh; nothing is cached between calls,
/// so a result always reflects the prices and stock at validation time.
pub struct CartValidator {
    catalog: CatalogLookupRef,
    shipping: Arc<dyn ShippingPolicy>,
}

impl CartValidator {
    /// Creates a new `CartValidator`.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Source of current prices, stock and titles.
    /// * `shipping` - Strategy used to price shipping for valid carts.
    pub fn new(catalog: CatalogLookupRef, shipping: Arc<dyn ShippingPolicy>) -> Self {
        Self { catalog, shipping }
    }

    /// Validates `claims` and prices the cart.
    ///
    /// Stock shortfalls, price drift and unknown items are reported in the
    /// returned cart's `errors`, in claim order. Only a catalog failure
    /// produces an `Err`.
    #[instrument(skip_all, fields(lines = claims.len()))]
    pub async fn validate_cart(
        &self,
        claims: &[CartLineClaim],
        destination: Option<&Address>,
    ) -> Result<ValidatedCart> {
        if claims.is_empty() {
            return Ok(ValidatedCart::rejected(vec!["Cart is empty".to_string()]));
        }

        let ids: Vec<ItemId> = claims
            .iter()
            .map(|claim| claim.item_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let catalog: HashMap<ItemId, CatalogItem> = self
            .catalog
            .get_items_by_ids(&ids)
            .await?
            .into_iter()
            .map(|item| (item.item_id, item))
            .collect();

        let mut errors = Vec::new();
        let mut items = Vec::with_capacity(claims.len());
        // Quantity already accepted per item, so repeated lines share one stock.
        let mut reserved: HashMap<ItemId, u32> = HashMap::new();

        for claim in claims {
            let Some(item) = catalog.get(&claim.item_id) else {
                warn!(item_id = %claim.item_id, "cart references unknown item");
                errors.push(format!("Item \"{}\" not found", claim.claimed_title));
                continue;
            };

            let already = reserved.get(&item.item_id).copied().unwrap_or(0);
            let remaining = item.available_stock.saturating_sub(already);
            if claim.quantity > remaining {
                warn!(
                    item_id = %item.item_id,
                    requested = claim.quantity,
                    stock = item.available_stock,
                    "insufficient stock"
                );
                errors.push(format!(
                    "Only {} of \"{}\" available",
                    item.available_stock, item.title
                ));
                continue;
            }

            if claim.claimed_price.cents() != item.current_price.cents() {
                warn!(
                    item_id = %item.item_id,
                    claimed = %claim.claimed_price,
                    current = %item.current_price,
                    "price drift"
                );
                errors.push(format!(
                    "Price for \"{}\" has changed. Please refresh your cart.",
                    item.title
                ));
                continue;
            }

            reserved.insert(item.item_id, already + claim.quantity);
            items.push(CartLineItem {
                item_id: item.item_id,
                title: item.title.clone(),
                price: item.current_price,
                quantity: claim.quantity,
                slug: item.slug.clone(),
            });
        }

        if !errors.is_empty() {
            debug!(errors = errors.len(), "cart rejected");
            return Ok(ValidatedCart::rejected(errors));
        }

        let cart = ValidatedCart::accepted(items, self.shipping.as_ref(), destination);
        debug!(total = %cart.total, "cart accepted");
        Ok(cart)
    }
}
