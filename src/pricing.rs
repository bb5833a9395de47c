//! Pricing
//!
//! Derived monetary views over cart items: counts, subtotals and the order summary shown
//! at checkout (flat-rate tax plus threshold-based shipping).

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::ToPrimitive,
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{cart::CartState, items::LineItem};

/// Errors that can occur while pricing an order.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The tax rate could not be applied to the subtotal.
    #[error("tax rate could not be applied to the subtotal")]
    PercentConversion,

    /// An amount grew beyond what a decimal can hold.
    #[error("amount is too large")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Total number of units across all items.
pub fn item_count(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity())).sum()
}

/// Sum of unit price multiplied by quantity across all items.
///
/// Items are assumed to share `currency`; the cart guarantees this on insertion.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if a line total or the sum does not fit in a decimal amount.
pub fn total_price(
    items: &[LineItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let amount = items.iter().try_fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(*item.line_total()?.amount())
            .ok_or(PricingError::Overflow)
    })?;

    Ok(Money::from_decimal(amount, currency))
}

/// Converts a decimal amount in major units (e.g. `12.99`) to minor units of `currency`.
///
/// Returns `None` if the amount does not fit.
pub fn minor_units_from_decimal(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = Decimal::from(10_i64.checked_pow(currency.exponent)?);

    amount
        .checked_mul(scale)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Applies a percentage to an amount, rounding half away from zero to the currency's minor unit.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the calculation overflows.
pub fn percent_of(
    percent: &Percentage,
    amount: &Money<'static, Currency>,
) -> Result<Money<'static, Currency>, PricingError> {
    let currency = amount.currency();

    let applied = ((*percent) * Decimal::ONE)
        .checked_mul(*amount.amount())
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

    Ok(Money::from_decimal(applied, currency))
}

/// Flat-rate tax and shipping rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    /// Tax applied to the subtotal
    pub tax_rate: Percentage,

    /// Subtotal at or above which shipping is free
    pub free_shipping_threshold: Money<'static, Currency>,

    /// Shipping charged below the threshold
    pub shipping_fee: Money<'static, Currency>,
}

impl PricingPolicy {
    /// Creates a new pricing policy.
    pub fn new(
        tax_rate: Percentage,
        free_shipping_threshold: Money<'static, Currency>,
        shipping_fee: Money<'static, Currency>,
    ) -> Self {
        Self {
            tax_rate,
            free_shipping_threshold,
            shipping_fee,
        }
    }

    /// The storefront's rules: 7% tax, free shipping from 500.00, otherwise 9.95.
    ///
    /// Amounts are given in minor units, so `currency` should have two decimal places.
    pub fn storefront(currency: &'static Currency) -> Self {
        Self::new(
            Percentage::from(0.07),
            Money::from_minor(500_00, currency),
            Money::from_minor(9_95, currency),
        )
    }

    /// Shipping charged for an order with the given subtotal.
    ///
    /// Nothing ships for an empty cart, so a zero subtotal is charged nothing.
    pub fn shipping_for(&self, subtotal: &Money<'static, Currency>) -> Money<'static, Currency> {
        let amount = subtotal.amount();

        if amount.is_zero() || amount >= self.free_shipping_threshold.amount() {
            Money::from_minor(0, subtotal.currency())
        } else {
            self.shipping_fee
        }
    }

    /// Tax due on the given subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::PercentConversion`] if the calculation overflows.
    pub fn tax_for(
        &self,
        subtotal: &Money<'static, Currency>,
    ) -> Result<Money<'static, Currency>, PricingError> {
        percent_of(&self.tax_rate, subtotal)
    }
}

/// Subtotal, shipping, tax and grand total for a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSummary {
    /// Number of units in the cart
    pub item_count: u64,

    /// Sum of line totals
    pub subtotal: Money<'static, Currency>,

    /// Shipping charge
    pub shipping: Money<'static, Currency>,

    /// Tax charge
    pub tax: Money<'static, Currency>,

    /// Amount payable
    pub total: Money<'static, Currency>,
}

impl OrderSummary {
    /// Prices a cart under the given policy.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the policy is in a different currency from the cart,
    /// or if the tax calculation overflows.
    pub fn calculate(cart: &CartState, policy: &PricingPolicy) -> Result<Self, PricingError> {
        let subtotal = *cart.total();
        let shipping = policy.shipping_for(&subtotal);
        let tax = policy.tax_for(&subtotal)?;

        subtotal
            .amount()
            .checked_add(*shipping.amount())
            .and_then(|amount| amount.checked_add(*tax.amount()))
            .ok_or(PricingError::Overflow)?;

        let total = subtotal.add(shipping)?.add(tax)?;

        Ok(Self {
            item_count: cart.count(),
            subtotal,
            shipping,
            tax,
            total,
        })
    }

    /// Whether the order qualifies for free shipping.
    pub fn ships_free(&self) -> bool {
        self.shipping.amount().is_zero()
    }
}
