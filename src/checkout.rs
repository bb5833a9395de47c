//! Checkout
//!
//! Simulated order placement. Nothing is charged or reserved: a valid order gets a display
//! order number, and the cart is cleared.

use std::fmt;

use jiff::Timestamp;
use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::CartStore,
    items::LineItem,
    pricing::{OrderSummary, PricingError, PricingPolicy},
    storage::Storage,
};

/// Errors that prevent an order from being placed.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// There is nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The email address is not plausible.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The order could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PaymentMethod {
    /// Credit or debit card
    #[default]
    CreditCard,

    /// `PayPal`
    Paypal,
}

/// Country preselected at checkout.
pub const DEFAULT_COUNTRY: &str = "United States";

/// Contact and shipping details entered at checkout.
///
/// The default leaves every field blank except `country`, which is [`DEFAULT_COUNTRY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    /// Confirmation email address
    pub email: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// State or region
    pub state: String,

    /// Postal code
    pub zip: String,

    /// Country
    pub country: String,

    /// Payment method
    pub payment_method: PaymentMethod,
}

impl Default for CheckoutDetails {
    fn default() -> Self {
        Self {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            payment_method: PaymentMethod::default(),
        }
    }
}

impl CheckoutDetails {
    /// Check every field is filled in and the email address is plausible.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            ("email", &self.email),
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ];

        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CheckoutError::MissingField(*field));
        }

        let plausible = self
            .email
            .trim()
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            });

        if plausible {
            Ok(())
        } else {
            Err(CheckoutError::InvalidEmail(self.email.clone()))
        }
    }
}

/// Display order number, `ORD-` followed by six digits. Not unique and not a real order reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    /// Generate an order number from `rng`.
    pub fn generate(rng: &mut impl Rng) -> Self {
        Self(format!("ORD-{}", rng.gen_range(100_000..=999_999)))
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    /// Display order number
    pub order_id: OrderId,

    /// Where the confirmation is sent
    pub email: String,

    /// Items ordered
    pub items: Vec<LineItem>,

    /// Amounts charged
    pub summary: OrderSummary,

    /// When the order was placed
    pub placed_at: Timestamp,
}

/// Place an order for everything in the cart, then clear it.
///
/// # Errors
///
/// Returns a `CheckoutError` if the cart is empty, the details are invalid or the order cannot
/// be priced. The cart is left untouched on error.
pub fn checkout<S: Storage>(
    store: &mut CartStore<S>,
    details: &CheckoutDetails,
    policy: &PricingPolicy,
) -> Result<OrderConfirmation, CheckoutError> {
    checkout_with_rng(store, details, policy, &mut rand::thread_rng())
}

/// [`checkout`] with a caller-supplied random source for the order number.
///
/// # Errors
///
/// See [`checkout`].
#[tracing::instrument(
    name = "checkout.place_order",
    skip_all,
    fields(items = store.state().len(), count = store.count()),
    err
)]
pub fn checkout_with_rng<S: Storage>(
    store: &mut CartStore<S>,
    details: &CheckoutDetails,
    policy: &PricingPolicy,
    rng: &mut impl Rng,
) -> Result<OrderConfirmation, CheckoutError> {
    if store.state().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    details.validate()?;

    let summary = OrderSummary::calculate(store.state(), policy)?;
    let items = store.items().to_vec();
    let order_id = OrderId::generate(rng);

    store.clear_cart();

    info!(order_id = %order_id, total = %summary.total, "order placed");

    Ok(OrderConfirmation {
        order_id,
        email: details.email.trim().to_string(),
        items,
        summary,
        placed_at: Timestamp::now(),
    })
}
