//! Catalog
//!
//! The read-only product catalog, loaded from the storefront's JSON document.

use std::{fs, io, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::minor_units_from_decimal,
    products::{Product, ProductId, ProductVariant},
};

pub mod filters;
pub mod placeholders;

pub use filters::{CatalogFilters, NamedPriceRange, PriceRange, ProductFilter, SortOrder};
pub use placeholders::placeholder_image;

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("failed to read catalog: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing error
    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// A product price is negative or out of range
    #[error("invalid price for product {0}")]
    InvalidPrice(ProductId),

    /// Two products share an id
    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),

    /// A price bracket is negative or its minimum is above its maximum
    #[error("invalid price range {0}")]
    InvalidPriceRange(String),
}

/// Wrapper for the catalog document
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    categories: Vec<Category>,

    #[serde(default)]
    filters: FiltersRecord,

    products: Vec<ProductRecord>,
}

/// Filter values as they appear in the catalog document
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FiltersRecord {
    #[serde(default)]
    materials: Vec<String>,
    #[serde(default)]
    gemstones: Vec<String>,
    #[serde(default)]
    price_ranges: Vec<PriceRangeRecord>,
}

/// Price bracket in major units; a missing `max` leaves the bracket open-ended
#[derive(Debug, Deserialize)]
struct PriceRangeRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    min: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    max: Option<Decimal>,
}

impl FiltersRecord {
    fn into_filters(self, currency: &'static Currency) -> Result<CatalogFilters, CatalogError> {
        let price_ranges = self
            .price_ranges
            .into_iter()
            .map(|record| record.into_named_range(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CatalogFilters {
            materials: self.materials,
            gemstones: self.gemstones,
            price_ranges,
        })
    }
}

impl PriceRangeRecord {
    fn into_named_range(self, currency: &'static Currency) -> Result<NamedPriceRange, CatalogError> {
        let max = self.max.unwrap_or(Decimal::MAX);

        if self.min.is_sign_negative() || self.min > max {
            return Err(CatalogError::InvalidPriceRange(self.id));
        }

        let name = self.name.unwrap_or_else(|| self.id.clone());

        Ok(NamedPriceRange {
            id: self.id,
            name,
            range: PriceRange::new(
                Money::from_decimal(self.min, currency),
                Money::from_decimal(max, currency),
            ),
        })
    }
}

/// Product record as it appears in the catalog document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    id: ProductId,
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(default)]
    images: Vec<String>,
    category: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    materials: Vec<String>,
    #[serde(default)]
    variants: Vec<ProductVariant>,
    #[serde(default)]
    metal_options: Vec<String>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    new: bool,
}

impl ProductRecord {
    fn into_product(self, currency: &'static Currency) -> Result<Product, CatalogError> {
        let price_minor = match minor_units_from_decimal(self.price, currency) {
            Some(minor) if minor >= 0 => minor,
            _ => return Err(CatalogError::InvalidPrice(self.id)),
        };

        Ok(Product {
            id: self.id,
            name: self.name,
            price: Money::from_minor(price_minor, currency),
            images: SmallVec::from_vec(self.images),
            category: self.category,
            description: self.description,
            materials: self.materials,
            variants: self.variants,
            metal_options: self.metal_options,
            featured: self.featured,
            new: self.new,
        })
    }
}

/// A product category
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Category id, as referenced by products
    pub id: String,

    /// Display name
    pub name: String,

    /// Display description
    #[serde(default)]
    pub description: Option<String>,
}

/// Catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
    categories: Vec<Category>,
    filters: CatalogFilters,
    currency: &'static Currency,
}

impl Catalog {
    /// Build a catalog from products, in featured order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateProduct` if two products share an id.
    pub fn new(
        products: Vec<Product>,
        categories: Vec<Category>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();

        for (position, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }

        Ok(Self {
            products,
            index,
            categories,
            filters: CatalogFilters::default(),
            currency,
        })
    }

    /// Replace the filter values offered for listing products.
    #[must_use]
    pub fn with_filters(mut self, filters: CatalogFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Parse a catalog document, pricing products in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the document is malformed, a price is invalid or ids repeat.
    pub fn from_json(json: &str, currency: &'static Currency) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;

        let products = document
            .products
            .into_iter()
            .map(|record| record.into_product(currency))
            .collect::<Result<Vec<_>, _>>()?;

        let filters = document.filters.into_filters(currency)?;

        Ok(Self::new(products, document.categories, currency)?.with_filters(filters))
    }

    /// Read and parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>, currency: &'static Currency) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;

        Self::from_json(&json, currency)
    }

    /// Get a product by id.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|&position| self.products.get(position))
    }

    /// Iterate over the products in featured order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Categories as listed in the document.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Get a category by id.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Materials, gemstones and price brackets offered for filtering.
    pub fn filters(&self) -> &CatalogFilters {
        &self.filters
    }

    /// Products flagged as featured.
    pub fn featured(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|product| product.featured)
    }

    /// Products matching a filter, in the filter's sort order.
    pub fn filter(&self, filter: &ProductFilter) -> Vec<&Product> {
        filter.apply(self.products.iter())
    }

    /// Up to `limit` other products in the same category.
    pub fn related(&self, id: &ProductId, limit: usize) -> Vec<&Product> {
        let Some(product) = self.get(id) else {
            return Vec::new();
        };

        self.products
            .iter()
            .filter(|other| other.category == product.category && other.id != product.id)
            .take(limit)
            .collect()
    }

    /// Image to show for a cart line: its own image, or a placeholder for its category.
    pub fn image_for<'a>(&'a self, item: &'a LineItem) -> &'a str {
        if let Some(image) = item.image() {
            return image;
        }

        let category = self
            .get(item.product_id())
            .map_or(placeholders::FALLBACK_CATEGORY, |product| {
                product.category.as_str()
            });

        placeholder_image(category, 0)
    }

    /// Get the currency of the catalog.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
