//! Purpose: Own the in-memory cart-item collection and its id counter.
//! Exports: `CartStore`.
//! Invariants: Ids are unique, monotonically increasing, and never reused
//! or renumbered after deletion.
//! Invariants: The collection preserves insertion order; replace keeps the
//! item's position.
//! Notes: State lives for the process lifetime and is never persisted.

use crate::core::error::{Error, ErrorKind};
use crate::core::filter::ItemFilter;
use crate::core::item::{CartItem, NewCartItem};

/// The cart-item collection. Owned by whoever constructs it (the server
/// holds one behind a mutex; tests build a fresh store each).
#[derive(Debug)]
pub struct CartStore {
    items: Vec<CartItem>,
    next_id: u64,
}

impl CartStore {
    /// An empty store; the first created item gets id 1.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// A store pre-loaded with the fixed sample set. The counter starts
    /// above the highest seeded id.
    pub fn with_sample_items() -> Self {
        let items = vec![
            CartItem {
                id: 1,
                product: "Vaseline".to_string(),
                price: 7.0,
                quantity: 4,
            },
            CartItem {
                id: 2,
                product: "Water".to_string(),
                price: 3.0,
                quantity: 20,
            },
            CartItem {
                id: 3,
                product: "Hairbrush".to_string(),
                price: 6.0,
                quantity: 1,
            },
            CartItem {
                id: 4,
                product: "Toothpicks".to_string(),
                price: 1.0,
                quantity: 1,
            },
            CartItem {
                id: 5,
                product: "Lysol".to_string(),
                price: 30.0,
                quantity: 20,
            },
        ];
        let next_id = items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        Self { items, next_id }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items passing the filter, in insertion order. Never errors; an
    /// empty result is valid.
    pub fn list(&self, filter: &ItemFilter) -> Vec<CartItem> {
        self.items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: u64) -> Result<CartItem, Error> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Assigns the next id, appends, and returns the stored record.
    pub fn create(&mut self, body: NewCartItem) -> CartItem {
        let item = body.into_item(self.next_id);
        self.next_id += 1;
        self.items.push(item.clone());
        item
    }

    /// Overwrites the record with the given id in place. The id stays the
    /// caller-supplied value regardless of anything in the body.
    pub fn replace(&mut self, id: u64, body: NewCartItem) -> Result<CartItem, Error> {
        let slot = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| not_found(id))?;
        *slot = body.into_item(id);
        Ok(slot.clone())
    }

    pub fn remove(&mut self, id: u64) -> Result<(), Error> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| not_found(id))?;
        self.items.remove(index);
        Ok(())
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: u64) -> Error {
    Error::new(ErrorKind::NotFound).with_message(format!("No item found with id: {id}"))
}

#[cfg(test)]
mod tests {
    use super::CartStore;
    use crate::core::error::ErrorKind;
    use crate::core::filter::ItemFilter;
    use crate::core::item::NewCartItem;

    fn body(product: &str, price: f64, quantity: i64) -> NewCartItem {
        NewCartItem {
            product: product.to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn sample_store_seeds_counter_above_max_id() {
        let mut store = CartStore::with_sample_items();
        assert_eq!(store.len(), 5);
        let created = store.create(body("Soap", 2.0, 5));
        assert_eq!(created.id, 6);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = CartStore::with_sample_items();
        let all = store.list(&ItemFilter::default());
        let ids: Vec<u64> = all.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn list_is_a_pure_subset() {
        let store = CartStore::with_sample_items();
        let filter = ItemFilter {
            max_price: Some(5.0),
            ..ItemFilter::default()
        };
        let first = store.list(&filter);
        let second = store.list(&filter);
        assert_eq!(first, second);
        let all = store.list(&ItemFilter::default());
        assert!(first.iter().all(|item| all.contains(item)));
        let products: Vec<&str> = first.iter().map(|item| item.product.as_str()).collect();
        assert_eq!(products, vec!["Water", "Toothpicks"]);
    }

    #[test]
    fn create_then_get_round_trips() {
        let mut store = CartStore::new();
        let created = store.create(body("Soap", 2.0, 5));
        assert_eq!(created.id, 1);
        let fetched = store.get(created.id).expect("created item");
        assert_eq!(fetched, created);
    }

    #[test]
    fn consecutive_creates_yield_strictly_increasing_ids() {
        let mut store = CartStore::with_sample_items();
        let first = store.create(body("Soap", 2.0, 5));
        let second = store.create(body("Sponge", 1.0, 3));
        assert!(second.id > first.id);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = CartStore::with_sample_items();
        store.remove(5).expect("seeded item");
        let created = store.create(body("Soap", 2.0, 5));
        assert_eq!(created.id, 6);
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = CartStore::with_sample_items();
        let err = store.get(99).expect_err("missing item");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), Some("No item found with id: 99"));
    }

    #[test]
    fn replace_pins_id_and_position() {
        let mut store = CartStore::with_sample_items();
        let replaced = store
            .replace(2, body("Sparkling Water", 4.0, 10))
            .expect("seeded item");
        assert_eq!(replaced.id, 2);
        assert_eq!(replaced.product, "Sparkling Water");

        let all = store.list(&ItemFilter::default());
        assert_eq!(all[1].id, 2);
        assert_eq!(all[1].product, "Sparkling Water");
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn replace_unknown_id_is_not_found() {
        let mut store = CartStore::with_sample_items();
        let err = store
            .replace(99, body("Soap", 2.0, 5))
            .expect_err("missing item");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn remove_then_get_is_not_found() {
        let mut store = CartStore::with_sample_items();
        store.remove(3).expect("seeded item");
        let err = store.get(3).expect_err("deleted item");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let ids: Vec<u64> = store
            .list(&ItemFilter::default())
            .iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
    }

    #[test]
    fn remove_unknown_id_leaves_store_untouched() {
        let mut store = CartStore::with_sample_items();
        let err = store.remove(99).expect_err("missing item");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.len(), 5);
    }
}
