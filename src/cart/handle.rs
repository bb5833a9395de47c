//! Shared cart handle

use std::{cell::RefCell, rc::Rc};

use rusty_money::{Money, iso::Currency};

use crate::{
    cart::{CartError, CartEvent, CartState, CartStore, SubscriptionKey},
    items::LineItem,
    products::{Product, ProductId},
    storage::Storage,
};

/// A cloneable handle to one cart store, shared by everything rendered under it.
///
/// Calls are rejected with [`CartError::Busy`] while the store is already borrowed, which is
/// the case inside a subscriber callback.
#[derive(Debug)]
pub struct CartHandle<S: Storage> {
    store: Rc<RefCell<CartStore<S>>>,
}

impl<S: Storage> Clone for CartHandle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
        }
    }
}

impl<S: Storage> CartHandle<S> {
    /// Wrap a store.
    pub fn new(store: CartStore<S>) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
        }
    }

    /// See [`CartStore::add_to_cart`].
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the store is busy or the product currency does not match.
    pub fn add_to_cart(
        &self,
        product: &Product,
        quantity: u32,
        variant: Option<&str>,
        metal_option: Option<&str>,
    ) -> Result<(), CartError> {
        self.with_store_mut(|store| store.add_to_cart(product, quantity, variant, metal_option))?
    }

    /// See [`CartStore::remove_from_cart`].
    ///
    /// # Errors
    ///
    /// Returns `CartError::Busy` if the store is already borrowed.
    pub fn remove_from_cart(
        &self,
        product_id: &ProductId,
        variant: Option<&str>,
        metal_option: Option<&str>,
    ) -> Result<(), CartError> {
        self.with_store_mut(|store| store.remove_from_cart(product_id, variant, metal_option))
    }

    /// See [`CartStore::update_quantity`].
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the store is busy or the new quantity overflows the total.
    pub fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
        variant: Option<&str>,
        metal_option: Option<&str>,
    ) -> Result<(), CartError> {
        self.with_store_mut(|store| {
            store.update_quantity(product_id, quantity, variant, metal_option)
        })?
    }

    /// See [`CartStore::clear_cart`].
    ///
    /// # Errors
    ///
    /// Returns `CartError::Busy` if the store is already borrowed.
    pub fn clear_cart(&self) -> Result<(), CartError> {
        self.with_store_mut(CartStore::clear_cart)
    }

    /// See [`CartStore::subscribe`].
    ///
    /// The callback runs while this handle's store is mutably borrowed, so any call it makes
    /// through a `CartHandle` to the same store, reads included, returns [`CartError::Busy`].
    /// Read the cart from the `&CartState` passed to the callback instead.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Busy` if the store is already borrowed.
    pub fn subscribe(
        &self,
        subscriber: impl FnMut(&CartEvent, &CartState) + 'static,
    ) -> Result<SubscriptionKey, CartError> {
        self.with_store_mut(|store| store.subscribe(subscriber))
    }

    /// See [`CartStore::unsubscribe`].
    ///
    /// # Errors
    ///
    /// Returns `CartError::Busy` if the store is already borrowed.
    pub fn unsubscribe(&self, key: SubscriptionKey) -> Result<bool, CartError> {
        self.with_store_mut(|store| store.unsubscribe(key))
    }

    /// Read the current cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Busy` if the store is being mutated.
    pub fn with_state<R>(&self, f: impl FnOnce(&CartState) -> R) -> Result<R, CartError> {
        let store = self.store.try_borrow().map_err(|_err| CartError::Busy)?;

        Ok(f(store.state()))
    }

    /// A copy of the items in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Busy` if the store is being mutated.
    pub fn items(&self) -> Result<Vec<LineItem>, CartError> {
        self.with_state(|state| state.items().to_vec())
    }

    /// Total number of units.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Busy` if the store is being mutated.
    pub fn count(&self) -> Result<u64, CartError> {
        self.with_state(CartState::count)
    }

    /// Sum of unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Busy` if the store is being mutated.
    pub fn total(&self) -> Result<Money<'static, Currency>, CartError> {
        self.with_state(|state| *state.total())
    }

    fn with_store_mut<R>(&self, f: impl FnOnce(&mut CartStore<S>) -> R) -> Result<R, CartError> {
        let mut store = self.store.try_borrow_mut().map_err(|_err| CartError::Busy)?;

        Ok(f(&mut store))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{config::CartConfig, storage::MemoryStorage};

    use super::*;

    fn handle() -> CartHandle<MemoryStorage> {
        CartHandle::new(CartStore::hydrate(
            MemoryStorage::new(),
            &CartConfig::default(),
        ))
    }

    #[test]
    fn clones_share_one_cart() -> TestResult {
        let header = handle();
        let product_page = header.clone();
        let ring = Product::new("r1", "Ring", Money::from_minor(100_00, USD), "rings");

        product_page.add_to_cart(&ring, 2, Some("7"), None)?;

        assert_eq!(header.count()?, 2);
        assert_eq!(header.total()?, Money::from_minor(200_00, USD));
        assert_eq!(header.items()?.len(), 1);

        header.clear_cart()?;

        assert_eq!(product_page.count()?, 0);

        Ok(())
    }

    #[test]
    fn read_from_subscriber_is_rejected() -> TestResult {
        let cart = handle();
        let inner = cart.clone();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);

        cart.subscribe(move |_, state| {
            sink.set(Some((inner.count(), state.count())));
        })?;

        let ring = Product::new("r1", "Ring", Money::from_minor(100_00, USD), "rings");
        cart.add_to_cart(&ring, 3, None, None)?;

        assert_eq!(seen.take(), Some((Err(CartError::Busy), 3)));

        Ok(())
    }

    #[test]
    fn mutation_from_subscriber_is_rejected() -> TestResult {
        let cart = handle();
        let inner = cart.clone();
        let rejected = Rc::new(Cell::new(false));
        let flag = Rc::clone(&rejected);

        cart.subscribe(move |event, _| {
            if matches!(event, CartEvent::Added { .. }) {
                flag.set(inner.clear_cart() == Err(CartError::Busy));
            }
        })?;

        let ring = Product::new("r1", "Ring", Money::from_minor(100_00, USD), "rings");
        cart.add_to_cart(&ring, 1, None, None)?;

        assert!(rejected.get());
        assert_eq!(cart.count()?, 1);

        Ok(())
    }
}
