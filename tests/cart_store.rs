//! Integration tests for the persistent cart store.
//!
//! Walks the storefront scenario: a ring added in size 7 and gold, topped up, then added again in
//! size 8, and finally the size 7 line set to zero.

use std::{cell::RefCell, rc::Rc};

use aura::prelude::*;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

/// Memory storage that records every write.
#[derive(Debug, Clone, Default)]
struct RecordingStorage {
    inner: MemoryStorage,
    writes: Rc<RefCell<Vec<String>>>,
}

impl RecordingStorage {
    fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }
}

impl Storage for RecordingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.borrow_mut().push(key.to_string());
        self.inner.set(key, value)
    }
}

fn ring() -> Product {
    Product::new("r1", "Solitaire Ring", Money::from_minor(100_00, USD), "rings")
}

fn pendant() -> Product {
    let mut product = Product::new("n1", "Pearl Pendant", Money::from_minor(45_50, USD), "necklaces");
    product.images.push("/images/n1.jpg".to_string());
    product
}

fn assert_aggregates(state: &CartState) {
    let count: u64 = state.iter().map(|item| u64::from(item.quantity())).sum();
    let total: i64 = state
        .iter()
        .map(|item| item.unit_price().to_minor_units() * i64::from(item.quantity()))
        .sum();

    assert_eq!(state.count(), count, "count should be the sum of quantities");
    assert_eq!(
        state.total().to_minor_units(),
        total,
        "total should be the sum of line totals"
    );
    assert!(
        state.iter().all(|item| item.quantity() >= 1),
        "every item should have a positive quantity"
    );
}

#[test]
fn storefront_scenario() -> TestResult {
    let mut store = CartStore::hydrate(MemoryStorage::new(), &CartConfig::default());
    let ring = ring();
    let r1 = ProductId::new("r1");

    store.add_to_cart(&ring, 2, Some("7"), Some("Gold"))?;

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items().first().map(LineItem::quantity), Some(2));
    assert_eq!(store.total(), &Money::from_minor(200_00, USD));

    store.add_to_cart(&ring, 1, Some("7"), Some("Gold"))?;

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items().first().map(LineItem::quantity), Some(3));
    assert_eq!(store.total(), &Money::from_minor(300_00, USD));

    store.add_to_cart(&ring, 1, Some("8"), Some("Gold"))?;

    assert_eq!(store.items().len(), 2);
    assert_eq!(store.count(), 4);
    assert_eq!(store.total(), &Money::from_minor(400_00, USD));

    store.update_quantity(&r1, 0, Some("7"), Some("Gold"))?;

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.count(), 1);
    assert_eq!(
        store.items().first().and_then(LineItem::variant),
        Some("8")
    );
    assert_aggregates(store.state());

    Ok(())
}

#[test]
fn absent_selections_are_distinct_from_present_ones() -> TestResult {
    let mut store = CartStore::hydrate(MemoryStorage::new(), &CartConfig::default());
    let ring = ring();

    store.add_to_cart(&ring, 1, None, None)?;
    store.add_to_cart(&ring, 1, Some("7"), None)?;
    store.add_to_cart(&ring, 1, None, Some("Gold"))?;
    store.add_to_cart(&ring, 1, None, None)?;

    assert_eq!(store.items().len(), 3);
    assert_eq!(store.count(), 4);
    assert_aggregates(store.state());

    Ok(())
}

#[test]
fn update_to_zero_matches_remove() -> TestResult {
    let ring = ring();
    let r1 = ProductId::new("r1");

    let mut updated = CartStore::hydrate(MemoryStorage::new(), &CartConfig::default());
    let mut removed = CartStore::hydrate(MemoryStorage::new(), &CartConfig::default());

    for store in [&mut updated, &mut removed] {
        store.add_to_cart(&ring, 2, Some("7"), None)?;
        store.add_to_cart(&pendant(), 1, None, None)?;
    }

    updated.update_quantity(&r1, 0, Some("7"), None)?;
    removed.remove_from_cart(&r1, Some("7"), None);

    assert_eq!(updated.state(), removed.state());

    Ok(())
}

#[test]
fn absent_items_are_left_alone() -> TestResult {
    let mut store = CartStore::hydrate(MemoryStorage::new(), &CartConfig::default());

    store.add_to_cart(&ring(), 1, Some("7"), None)?;

    let before = store.state().clone();
    let missing = ProductId::new("missing");

    store.remove_from_cart(&missing, None, None);
    store.update_quantity(&missing, 5, None, None)?;
    store.update_quantity(&ProductId::new("r1"), 5, Some("8"), None)?;

    assert_eq!(store.state(), &before);

    Ok(())
}

#[test]
fn clear_is_idempotent() -> TestResult {
    let storage = MemoryStorage::new();
    let mut store = CartStore::hydrate(storage.clone(), &CartConfig::default());

    store.add_to_cart(&ring(), 3, None, None)?;
    store.clear_cart();
    store.clear_cart();

    assert!(store.state().is_empty());
    assert_eq!(store.count(), 0);
    assert_eq!(store.total(), &Money::from_minor(0, USD));
    assert_eq!(
        storage.get(DEFAULT_STORAGE_KEY)?.as_deref(),
        Some("[]")
    );

    Ok(())
}

#[test]
fn cart_survives_a_fresh_store() -> TestResult {
    let storage = MemoryStorage::new();
    let config = CartConfig::default();

    let mut store = CartStore::hydrate(storage.clone(), &config);

    store.add_to_cart(&ring(), 2, Some("7"), Some("Gold"))?;
    store.add_to_cart(&pendant(), 1, Some("18 in"), None)?;

    let restored = CartStore::hydrate(storage, &config);

    assert_eq!(restored.state(), store.state());
    assert_eq!(
        restored.items().get(1).and_then(LineItem::image),
        Some("/images/n1.jpg")
    );

    Ok(())
}

#[test]
fn file_storage_round_trip() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = CartConfig::default();

    let mut store = CartStore::hydrate(FileStorage::new(dir.path()), &config);
    store.add_to_cart(&ring(), 1, Some("6"), Some("Platinum"))?;

    assert!(dir.path().join("auraJewelsCart.json").exists());

    let restored = CartStore::hydrate(FileStorage::new(dir.path()), &config);

    assert_eq!(restored.state(), store.state());

    Ok(())
}

#[test]
fn corrupt_blobs_start_an_empty_cart() {
    let blobs = [
        "not json",
        "{\"id\":\"r1\"}",
        r#"[{"id":"r1","name":"Ring","price":100,"image":null,"quantity":0,"variant":null,"metalOption":null}]"#,
        r#"[{"id":"r1","name":"Ring","price":"abc","image":null,"quantity":1,"variant":null,"metalOption":null}]"#,
    ];

    for blob in blobs {
        let storage = MemoryStorage::with_entry(DEFAULT_STORAGE_KEY, blob);
        let store = CartStore::hydrate(storage, &CartConfig::default());

        assert!(store.state().is_empty(), "{blob} should hydrate to an empty cart");
    }
}

#[test]
fn every_mutation_writes_once() -> TestResult {
    let storage = RecordingStorage::default();
    let mut store = CartStore::hydrate(storage.clone(), &CartConfig::default());
    let r1 = ProductId::new("r1");

    assert_eq!(storage.write_count(), 0);

    store.add_to_cart(&ring(), 1, None, None)?;
    assert_eq!(storage.write_count(), 1);

    store.update_quantity(&r1, 4, None, None)?;
    assert_eq!(storage.write_count(), 2);

    store.remove_from_cart(&ProductId::new("missing"), None, None);
    assert_eq!(storage.write_count(), 3);

    store.remove_from_cart(&r1, None, None);
    assert_eq!(storage.write_count(), 4);

    store.clear_cart();
    assert_eq!(storage.write_count(), 5);

    assert!(
        storage
            .writes
            .borrow()
            .iter()
            .all(|key| key == DEFAULT_STORAGE_KEY),
        "every write should use the configured key"
    );

    Ok(())
}

#[test]
fn subscribers_see_each_mutation() -> TestResult {
    let handle = CartHandle::new(CartStore::hydrate(
        MemoryStorage::new(),
        &CartConfig::default(),
    ));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let recorder = Rc::clone(&seen);
    let key = handle.subscribe(move |event, state| {
        recorder.borrow_mut().push((event.clone(), state.count()));
    })?;

    handle.add_to_cart(&ring(), 2, Some("7"), None)?;
    handle.clear_cart()?;

    assert!(handle.unsubscribe(key)?);

    handle.add_to_cart(&ring(), 1, None, None)?;

    let seen = seen.borrow();

    assert_eq!(seen.len(), 2);
    assert!(matches!(seen.first(), Some((CartEvent::Added { quantity: 2, .. }, 2))));
    assert!(matches!(seen.get(1), Some((CartEvent::Cleared, 0))));
    assert_eq!(handle.count()?, 1);

    Ok(())
}
