//! Cart store

use std::fmt;

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use tracing::{debug, error, warn};

use crate::{
    cart::{CartError, CartState, persisted},
    config::CartConfig,
    items::{LineItem, LineItemKey},
    products::{Product, ProductId},
    storage::Storage,
};

new_key_type! {
    /// Subscription Key
    pub struct SubscriptionKey;
}

/// A mutation that has been applied to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// Units of a product were added, merged into an existing item if the key matched.
    Added {
        /// Key of the added or merged item
        key: LineItemKey,

        /// Units added
        quantity: u32,
    },

    /// An item removal was requested.
    Removed {
        /// Key of the item
        key: LineItemKey,

        /// Whether an item matched
        found: bool,
    },

    /// An item quantity change was requested.
    QuantityUpdated {
        /// Key of the item
        key: LineItemKey,

        /// Requested quantity
        quantity: u32,

        /// Whether an item matched
        found: bool,
    },

    /// Every item was removed.
    Cleared,
}

type Subscriber = Box<dyn FnMut(&CartEvent, &CartState)>;

/// Cart state with persistence and change notification.
///
/// Every mutation recomputes the derived totals, writes the whole item list to storage under
/// the configured key and then notifies subscribers. Storage is only read when the store is
/// hydrated.
pub struct CartStore<S: Storage> {
    state: CartState,
    storage: S,
    storage_key: String,
    subscribers: SlotMap<SubscriptionKey, Subscriber>,
}

impl<S: Storage> CartStore<S> {
    /// Create a store from whatever was last persisted under the configured key.
    ///
    /// Missing, unreadable or malformed data gives an empty cart; the problem is logged.
    #[tracing::instrument(
        name = "cart.store.hydrate",
        skip(storage, config),
        fields(storage_key = %config.storage_key)
    )]
    pub fn hydrate(storage: S, config: &CartConfig) -> Self {
        let state = match storage.get(&config.storage_key) {
            Ok(Some(blob)) => restore(&blob, config.currency),
            Ok(None) => CartState::new(config.currency),
            Err(err) => {
                warn!(error = %err, "failed to read persisted cart; starting empty");
                CartState::new(config.currency)
            }
        };

        debug!(items = state.len(), count = state.count(), "hydrated cart");

        Self {
            state,
            storage,
            storage_key: config.storage_key.clone(),
            subscribers: SlotMap::with_key(),
        }
    }

    /// Add `quantity` units of `product` with the given selections.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::CurrencyMismatch` if the product is priced in another currency;
    /// the cart is left untouched and nothing is persisted.
    pub fn add_to_cart(
        &mut self,
        product: &Product,
        quantity: u32,
        variant: Option<&str>,
        metal_option: Option<&str>,
    ) -> Result<(), CartError> {
        self.state.add(product, quantity, variant, metal_option)?;

        self.commit(CartEvent::Added {
            key: LineItemKey::from_parts(&product.id, variant, metal_option),
            quantity: quantity.max(1),
        });

        Ok(())
    }

    /// Remove the item matching the product and selections, if there is one.
    pub fn remove_from_cart(
        &mut self,
        product_id: &ProductId,
        variant: Option<&str>,
        metal_option: Option<&str>,
    ) {
        let key = LineItemKey::from_parts(product_id, variant, metal_option);
        let found = self.state.remove(&key);

        self.commit(CartEvent::Removed { key, found });
    }

    /// Set the quantity of the matching item. Zero removes it; a missing item is not created.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::Pricing` error if the new total cannot be represented; the cart is
    /// left untouched and nothing is persisted.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        variant: Option<&str>,
        metal_option: Option<&str>,
    ) -> Result<(), CartError> {
        let key = LineItemKey::from_parts(product_id, variant, metal_option);

        if quantity == 0 {
            let found = self.state.remove(&key);
            self.commit(CartEvent::Removed { key, found });
            return Ok(());
        }

        let found = self.state.update_quantity(&key, quantity)?;

        self.commit(CartEvent::QuantityUpdated {
            key,
            quantity,
            found,
        });

        Ok(())
    }

    /// Remove every item.
    pub fn clear_cart(&mut self) {
        self.state.clear();
        self.commit(CartEvent::Cleared);
    }

    /// Register a callback run after every mutation.
    ///
    /// The callback receives the cart as it stands after the mutation. When the store is shared
    /// through a [`CartHandle`](super::CartHandle), the callback must read from that argument:
    /// the handle is borrowed for the duration and rejects every call with `CartError::Busy`.
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&CartEvent, &CartState) + 'static,
    ) -> SubscriptionKey {
        self.subscribers.insert(Box::new(subscriber))
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.remove(key).is_some()
    }

    /// The current cart.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        self.state.items()
    }

    /// Total number of units.
    pub fn count(&self) -> u64 {
        self.state.count()
    }

    /// Sum of unit price multiplied by quantity.
    pub fn total(&self) -> &Money<'static, Currency> {
        self.state.total()
    }

    fn commit(&mut self, event: CartEvent) {
        self.persist();

        for subscriber in self.subscribers.values_mut() {
            subscriber(&event, &self.state);
        }
    }

    fn persist(&mut self) {
        let blob = match persisted::encode(self.state.items()) {
            Ok(blob) => blob,
            Err(err) => {
                error!(error = %err, "failed to serialize cart");
                return;
            }
        };

        if let Err(err) = self.storage.set(&self.storage_key, &blob) {
            error!(
                error = %err,
                storage_key = %self.storage_key,
                "failed to persist cart"
            );
        }
    }
}

fn restore(blob: &str, currency: &'static Currency) -> CartState {
    let items = match persisted::decode(blob, currency) {
        Ok(items) => items,
        Err(err) => {
            warn!(error = %err, "persisted cart is malformed; starting empty");
            return CartState::new(currency);
        }
    };

    CartState::with_items(items, currency).unwrap_or_else(|err| {
        warn!(error = %err, "persisted cart is inconsistent; starting empty");
        CartState::new(currency)
    })
}

impl<S: Storage> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("storage_key", &self.storage_key)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use mockall::predicate::{always, eq};
    use rust_decimal::Decimal;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::storage::{MemoryStorage, MockStorage, StorageError};

    use super::*;

    fn ring() -> Product {
        Product::new("r1", "Solitaire Ring", Money::from_minor(100_00, USD), "rings")
    }

    #[test]
    fn hydrate_reads_configured_key_once() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .with(eq("auraJewelsCart"))
            .times(1)
            .returning(|_| Ok(None));

        let store = CartStore::hydrate(storage, &CartConfig::default());

        assert!(store.state().is_empty());
    }

    #[test]
    fn hydrate_read_failure_starts_empty() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .returning(|_| Err(StorageError::InvalidKey("auraJewelsCart".to_string())));

        let store = CartStore::hydrate(storage, &CartConfig::default());

        assert!(store.state().is_empty());
    }

    #[test]
    fn every_mutation_writes_once() -> TestResult {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage
            .expect_set()
            .with(eq("auraJewelsCart"), always())
            .times(5)
            .returning(|_, _| Ok(()));

        let mut store = CartStore::hydrate(storage, &CartConfig::default());
        let ring = ring();

        store.add_to_cart(&ring, 1, None, None)?;
        store.update_quantity(&ring.id, 3, None, None)?;
        store.update_quantity(&ProductId::new("missing"), 3, None, None)?;
        store.remove_from_cart(&ring.id, None, None);
        store.clear_cart();

        Ok(())
    }

    #[test]
    fn rejected_add_does_not_write() {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage.expect_set().never();

        let mut store = CartStore::hydrate(storage, &CartConfig::default());
        let euro_ring = Product::new(
            "r1",
            "Ring",
            Money::from_minor(100_00, rusty_money::iso::EUR),
            "rings",
        );

        let result = store.add_to_cart(&euro_ring, 1, None, None);

        assert!(matches!(result, Err(CartError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn overflowing_merge_in_blob_starts_empty() {
        let record = r#"{"id":"r1","name":"Ring","price":1,"image":null,"quantity":4294967295,"variant":null,"metalOption":null}"#;
        let blob = format!("[{record},{record}]");

        let store = CartStore::hydrate(
            MemoryStorage::with_entry("auraJewelsCart", blob),
            &CartConfig::default(),
        );

        assert!(store.state().is_empty());
    }

    #[test]
    fn rejected_update_does_not_write() -> TestResult {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage.expect_set().times(1).returning(|_, _| Ok(()));

        let mut store = CartStore::hydrate(storage, &CartConfig::default());
        let vault = Product::new("vault", "Vault", Money::from_decimal(Decimal::MAX, USD), "rings");

        store.add_to_cart(&vault, 1, Some("7"), None)?;

        let result = store.update_quantity(&vault.id, 2, Some("7"), None);

        assert!(matches!(result, Err(CartError::Pricing(_))));
        assert_eq!(store.items().first().map(LineItem::quantity), Some(1));

        Ok(())
    }

    #[test]
    fn write_failure_keeps_mutation() -> TestResult {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage
            .expect_set()
            .returning(|_, _| Err(StorageError::Io(std::io::Error::other("disk full"))));

        let mut store = CartStore::hydrate(storage, &CartConfig::default());

        store.add_to_cart(&ring(), 2, None, None)?;

        assert_eq!(store.count(), 2);

        Ok(())
    }

    #[test]
    fn written_blob_contains_items() -> TestResult {
        let storage = MemoryStorage::new();
        let mut store = CartStore::hydrate(storage.clone(), &CartConfig::default());

        store.add_to_cart(&ring(), 2, Some("7"), Some("Gold"))?;

        let blob = storage.get("auraJewelsCart")?.ok_or("nothing persisted")?;

        assert!(blob.contains(r#""metalOption":"Gold""#));
        assert!(blob.contains(r#""quantity":2"#));

        Ok(())
    }

    #[test]
    fn subscribers_see_each_mutation() -> TestResult {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = CartStore::hydrate(MemoryStorage::new(), &CartConfig::default());

        let seen = Rc::clone(&events);
        store.subscribe(move |event, state| {
            seen.borrow_mut().push((event.clone(), state.count()));
        });

        let ring = ring();

        store.add_to_cart(&ring, 2, None, None)?;
        store.update_quantity(&ring.id, 0, None, None)?;
        store.clear_cart();

        let key = LineItemKey::from_parts(&ring.id, None, None);

        assert_eq!(
            *events.borrow(),
            vec![
                (
                    CartEvent::Added {
                        key: key.clone(),
                        quantity: 2
                    },
                    2
                ),
                (CartEvent::Removed { key, found: true }, 0),
                (CartEvent::Cleared, 0),
            ]
        );

        Ok(())
    }

    #[test]
    fn unsubscribed_callbacks_are_not_called() -> TestResult {
        let calls = Rc::new(RefCell::new(0_u32));
        let mut store = CartStore::hydrate(MemoryStorage::new(), &CartConfig::default());

        let counter = Rc::clone(&calls);
        let key = store.subscribe(move |_, _| *counter.borrow_mut() += 1);

        store.add_to_cart(&ring(), 1, None, None)?;

        assert!(store.unsubscribe(key));
        assert!(!store.unsubscribe(key));

        store.clear_cart();

        assert_eq!(*calls.borrow(), 1);

        Ok(())
    }
}
