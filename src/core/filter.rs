//! Purpose: Conjunctive listing filters over cart items.
//! Exports: `ItemFilter`.
//! Invariants: Absent or empty criteria always pass; supplied criteria
//! must all pass (AND across filters).
//! Notes: Prefix matching trims the filter value and compares
//! case-insensitively.

use crate::core::item::CartItem;

/// Optional criteria for the list operation. The `quantity` filter matches
/// items whose quantity equals the value exactly; on the wire it arrives as
/// the legacy `pageSize` query parameter.
#[derive(Clone, Debug, Default)]
pub struct ItemFilter {
    pub max_price: Option<f64>,
    pub prefix: Option<String>,
    pub quantity: Option<i64>,
}

impl ItemFilter {
    pub fn matches(&self, item: &CartItem) -> bool {
        if let Some(max_price) = self.max_price {
            if item.price > max_price {
                return false;
            }
        }
        if let Some(prefix) = &self.prefix {
            let needle = prefix.trim().to_lowercase();
            if !needle.is_empty() && !item.product.to_lowercase().starts_with(&needle) {
                return false;
            }
        }
        if let Some(quantity) = self.quantity {
            if item.quantity != quantity {
                return false;
            }
        }
        true
    }
}
