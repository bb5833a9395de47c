//! Persisted cart format
//!
//! A JSON array of `{ id, name, price, image, quantity, variant, metalOption }` records with
//! `price` in major units, as written by the storefront's browser cart.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    items::{LineItem, LineItemKey},
    pricing::minor_units_from_decimal,
    products::ProductId,
};

/// Errors decoding a persisted cart.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The blob is not a JSON array of line item records.
    #[error("malformed cart JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record's price is negative or out of range.
    #[error("invalid price for product {0}")]
    InvalidPrice(ProductId),

    /// A record's quantity is zero.
    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedLineItem {
    id: ProductId,
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(default)]
    image: Option<String>,
    quantity: u32,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    metal_option: Option<String>,
}

impl From<&LineItem> for PersistedLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.product_id().clone(),
            name: item.name().to_string(),
            price: *item.unit_price().amount(),
            image: item.image().map(str::to_owned),
            quantity: item.quantity(),
            variant: item.variant().map(str::to_owned),
            metal_option: item.metal_option().map(str::to_owned),
        }
    }
}

impl PersistedLineItem {
    fn into_line_item(self, currency: &'static Currency) -> Result<LineItem, DecodeError> {
        let Some(quantity) = NonZeroU32::new(self.quantity) else {
            return Err(DecodeError::InvalidQuantity(self.id));
        };

        let price_minor = match minor_units_from_decimal(self.price, currency) {
            Some(minor) if minor >= 0 => minor,
            _ => return Err(DecodeError::InvalidPrice(self.id)),
        };

        Ok(LineItem::new(
            LineItemKey::new(self.id, self.variant, self.metal_option),
            self.name,
            Money::from_minor(price_minor, currency),
            self.image,
            quantity,
        ))
    }
}

/// Serializes items to the persisted JSON array.
pub(crate) fn encode(items: &[LineItem]) -> Result<String, serde_json::Error> {
    let records: Vec<PersistedLineItem> = items.iter().map(PersistedLineItem::from).collect();

    serde_json::to_string(&records)
}

/// Parses a persisted JSON array, pricing every item in `currency`.
pub(crate) fn decode(blob: &str, currency: &'static Currency) -> Result<Vec<LineItem>, DecodeError> {
    let records: Vec<PersistedLineItem> = serde_json::from_str(blob)?;

    records
        .into_iter()
        .map(|record| record.into_line_item(currency))
        .collect()
}
