//! Purpose: Define the cart-item entity and its validated request body.
//! Exports: `CartItem`, `NewCartItem`.
//! Invariants: `id` is service-assigned; a body-supplied id is never honored.
//! Invariants: Validated bodies have a non-empty product and a finite,
//! non-negative price.

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind};

/// A stored cart item. Ids are unique, assigned by the store, and never
/// reused after deletion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u64,
    pub product: String,
    pub price: f64,
    pub quantity: i64,
}

/// Request body for create and replace. All fields are required; any `id`
/// in the payload is ignored (the store or the route path decides the id).
#[derive(Clone, Debug, Deserialize)]
pub struct NewCartItem {
    pub product: String,
    pub price: f64,
    pub quantity: i64,
}

impl NewCartItem {
    pub fn validate(&self) -> Result<(), Error> {
        if self.product.trim().is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("product must not be empty")
                .with_hint("Provide a non-empty product name."));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("price must be a non-negative number")
                .with_hint("Use a price of 0 or more."));
        }
        Ok(())
    }

    pub fn into_item(self, id: u64) -> CartItem {
        CartItem {
            id,
            product: self.product,
            price: self.price,
            quantity: self.quantity,
        }
    }
}
