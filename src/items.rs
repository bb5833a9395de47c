//! Items

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    pricing::PricingError,
    products::{Product, ProductId},
};

/// The identity of a line item: product plus the optional variant and metal selections.
///
/// `None` is a value in its own right; a key without a variant never matches a key with one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineItemKey {
    product_id: ProductId,
    variant: Option<String>,
    metal_option: Option<String>,
}

impl LineItemKey {
    /// Creates a new key.
    pub fn new(
        product_id: ProductId,
        variant: Option<String>,
        metal_option: Option<String>,
    ) -> Self {
        Self {
            product_id,
            variant,
            metal_option,
        }
    }

    /// Creates a key from borrowed selections.
    pub fn from_parts(
        product_id: &ProductId,
        variant: Option<&str>,
        metal_option: Option<&str>,
    ) -> Self {
        Self::new(
            product_id.clone(),
            variant.map(str::to_owned),
            metal_option.map(str::to_owned),
        )
    }

    /// Returns the product id.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the variant selection.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Returns the metal selection.
    pub fn metal_option(&self) -> Option<&str> {
        self.metal_option.as_deref()
    }
}

/// A single cart row, with the product fields captured when it was added.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    key: LineItemKey,
    name: String,
    unit_price: Money<'static, Currency>,
    image: Option<String>,
    quantity: NonZeroU32,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(
        key: LineItemKey,
        name: impl Into<String>,
        unit_price: Money<'static, Currency>,
        image: Option<String>,
        quantity: NonZeroU32,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            unit_price,
            image,
            quantity,
        }
    }

    /// Snapshots a catalog product into a line item.
    pub fn from_product(product: &Product, key: LineItemKey, quantity: NonZeroU32) -> Self {
        Self::new(
            key,
            product.name.clone(),
            product.price,
            product.primary_image().map(str::to_owned),
            quantity,
        )
    }

    /// Returns the identity of the item.
    pub fn key(&self) -> &LineItemKey {
        &self.key
    }

    /// Returns the product id
    pub fn product_id(&self) -> &ProductId {
        self.key.product_id()
    }

    /// Returns the variant selection
    pub fn variant(&self) -> Option<&str> {
        self.key.variant()
    }

    /// Returns the metal selection
    pub fn metal_option(&self) -> Option<&str> {
        self.key.metal_option()
    }

    /// Returns the product name at the time the item was added
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price at the time the item was added
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Returns the image reference, if the product had one
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the product does not fit in a decimal amount.
    pub fn line_total(&self) -> Result<Money<'static, Currency>, PricingError> {
        let amount = self
            .unit_price
            .amount()
            .checked_mul(Decimal::from(self.quantity.get()))
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_decimal(amount, self.unit_price.currency()))
    }

    /// Adds units to the item. Returns `false`, leaving the quantity alone, if it would overflow.
    #[must_use]
    pub(crate) fn add_quantity(&mut self, quantity: NonZeroU32) -> bool {
        match self.quantity.checked_add(quantity.get()) {
            Some(total) => {
                self.quantity = total;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn keys_with_and_without_variant_differ() {
        let id = ProductId::new("r1");

        let bare = LineItemKey::from_parts(&id, None, None);
        let sized = LineItemKey::from_parts(&id, Some("7"), None);

        assert_ne!(bare, sized);
        assert_eq!(bare, LineItemKey::new(id, None, None));
    }

    #[test]
    fn line_total_multiplies_unit_price() -> TestResult {
        let key = LineItemKey::from_parts(&ProductId::new("r1"), Some("7"), Some("Gold"));
        let quantity = NonZeroU32::new(3).ok_or("zero quantity")?;
        let item = LineItem::new(key, "Ring", Money::from_minor(100_00, USD), None, quantity);

        assert_eq!(item.line_total()?, Money::from_minor(300_00, USD));
        assert_eq!(item.variant(), Some("7"));
        assert_eq!(item.metal_option(), Some("Gold"));

        Ok(())
    }

    #[test]
    fn add_quantity_refuses_overflow() -> TestResult {
        let key = LineItemKey::from_parts(&ProductId::new("r1"), None, None);
        let max = NonZeroU32::new(u32::MAX).ok_or("zero quantity")?;
        let mut item = LineItem::new(key, "Ring", Money::from_minor(1, USD), None, max);

        assert!(!item.add_quantity(NonZeroU32::MIN));
        assert_eq!(item.quantity(), u32::MAX);

        Ok(())
    }

    #[test]
    fn line_total_is_exact_for_largest_quantity() -> TestResult {
        let key = LineItemKey::from_parts(&ProductId::new("r1"), None, None);
        let max = NonZeroU32::new(u32::MAX).ok_or("zero quantity")?;
        let item = LineItem::new(key, "Ring", Money::from_minor(50_000_000_00, USD), None, max);

        assert_eq!(
            item.line_total()?.amount(),
            &(Decimal::new(50_000_000, 0) * Decimal::from(u32::MAX))
        );

        Ok(())
    }

    #[test]
    fn from_product_snapshots_primary_image() -> TestResult {
        let mut product = Product::new("e1", "Hoops", Money::from_minor(80_00, USD), "earrings");
        product.images.push("hoops-front.jpg".to_string());
        product.images.push("hoops-side.jpg".to_string());

        let key = LineItemKey::from_parts(&product.id, None, None);
        let item = LineItem::from_product(&product, key, NonZeroU32::new(1).ok_or("zero")?);

        assert_eq!(item.name(), "Hoops");
        assert_eq!(item.image(), Some("hoops-front.jpg"));
        assert_eq!(item.unit_price(), &Money::from_minor(80_00, USD));

        Ok(())
    }
}
