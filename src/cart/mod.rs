//! Cart
//!
//! [`CartState`] is the aggregate root: an ordered list of line items with no two sharing a
//! [`LineItemKey`], plus the item count and monetary total derived from them.
//! [`CartStore`] wraps it with persistence and change notification, and [`CartHandle`] shares
//! one store between several consumers.

use std::num::NonZeroU32;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::{LineItem, LineItemKey},
    pricing::{PricingError, item_count, total_price},
    products::Product,
};

mod handle;
pub(crate) mod persisted;
mod store;

pub use handle::CartHandle;
pub use persisted::DecodeError;
pub use store::{CartEvent, CartStore, SubscriptionKey};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The product is priced in a different currency from the cart (product currency, cart currency).
    #[error("product is priced in {0}, but the cart is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The cart is already being mutated, e.g. from inside a change subscriber.
    #[error("cart is busy")]
    Busy,

    /// Merging would take an item past the largest supported quantity.
    #[error("quantity is too large")]
    QuantityOverflow,

    /// The cart total cannot be represented.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Cart
#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
    items: Vec<LineItem>,
    currency: &'static Currency,
    count: u64,
    total: Money<'static, Currency>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        CartState {
            items: Vec::new(),
            currency,
            count: 0,
            total: Money::from_minor(0, currency),
        }
    }

    /// Create a cart from existing line items.
    ///
    /// Items sharing a key are merged into the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if an item is priced in a different currency, or if the merged
    /// quantities or the total grow too large.
    pub fn with_items(
        items: impl IntoIterator<Item = LineItem>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Self::new(currency);
        let mut merged = Vec::new();

        for item in items {
            cart.check_currency(item.unit_price().currency())?;
            merge(&mut merged, item)?;
        }

        cart.replace_items(merged)?;

        Ok(cart)
    }

    /// Add `quantity` units of a product with the given selections.
    ///
    /// An existing item with the same key has its quantity increased and keeps the name, price
    /// and image captured when it was first added. A zero quantity is treated as one.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::CurrencyMismatch` if the product is priced in another currency, or
    /// an overflow error if the quantity or total would grow too large. The cart is left
    /// unchanged on error.
    pub fn add(
        &mut self,
        product: &Product,
        quantity: u32,
        variant: Option<&str>,
        metal_option: Option<&str>,
    ) -> Result<(), CartError> {
        self.check_currency(product.price.currency())?;

        let quantity = NonZeroU32::new(quantity).unwrap_or(NonZeroU32::MIN);
        let key = LineItemKey::from_parts(&product.id, variant, metal_option);

        let mut items = self.items.clone();
        merge(&mut items, LineItem::from_product(product, key, quantity))?;

        self.replace_items(items)
    }

    /// Remove the item with the given key. Returns whether an item was removed.
    pub fn remove(&mut self, key: &LineItemKey) -> bool {
        let Some(position) = self.position(key) else {
            return false;
        };

        self.items.remove(position);
        self.count = item_count(&self.items);

        // Dropping a line cannot overflow a sum that already fit.
        if let Ok(total) = total_price(&self.items, self.currency) {
            self.total = total;
        }

        true
    }

    /// Set the quantity of the item with the given key; zero removes it.
    ///
    /// Never creates an item. Returns whether an item was changed.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::Pricing` error, leaving the cart unchanged, if the new total
    /// cannot be represented.
    pub fn update_quantity(&mut self, key: &LineItemKey, quantity: u32) -> Result<bool, CartError> {
        let Some(quantity) = NonZeroU32::new(quantity) else {
            return Ok(self.remove(key));
        };

        let Some(position) = self.position(key) else {
            return Ok(false);
        };

        let mut items = self.items.clone();

        if let Some(item) = items.get_mut(position) {
            item.set_quantity(quantity);
        }

        self.replace_items(items)?;

        Ok(true)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.count = 0;
        self.total = Money::from_minor(0, self.currency);
    }

    /// Get the item with the given key.
    pub fn get(&self, key: &LineItemKey) -> Option<&LineItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of unit price multiplied by quantity.
    pub fn total(&self) -> &Money<'static, Currency> {
        &self.total
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn check_currency(&self, currency: &Currency) -> Result<(), CartError> {
        if currency == self.currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch(
                currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }

    fn position(&self, key: &LineItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    fn replace_items(&mut self, items: Vec<LineItem>) -> Result<(), CartError> {
        self.total = total_price(&items, self.currency)?;
        self.count = item_count(&items);
        self.items = items;

        Ok(())
    }
}

fn merge(items: &mut Vec<LineItem>, item: LineItem) -> Result<(), CartError> {
    match items.iter_mut().find(|existing| existing.key() == item.key()) {
        Some(existing) => {
            let quantity = NonZeroU32::new(item.quantity()).unwrap_or(NonZeroU32::MIN);

            if existing.add_quantity(quantity) {
                Ok(())
            } else {
                Err(CartError::QuantityOverflow)
            }
        }
        None => {
            items.push(item);
            Ok(())
        }
    }
}
