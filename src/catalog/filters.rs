//! Catalog filters

use rusty_money::{Money, iso::Currency};

use crate::products::Product;

/// Product listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    /// Catalog order
    #[default]
    Featured,

    /// Cheapest first
    PriceAsc,

    /// Most expensive first
    PriceDesc,

    /// New arrivals first, otherwise catalog order
    Newest,
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    min: Money<'static, Currency>,
    max: Money<'static, Currency>,
}

impl PriceRange {
    /// Creates a new price range.
    pub fn new(min: Money<'static, Currency>, max: Money<'static, Currency>) -> Self {
        Self { min, max }
    }

    /// Lower bound.
    pub fn min(&self) -> &Money<'static, Currency> {
        &self.min
    }

    /// Upper bound.
    pub fn max(&self) -> &Money<'static, Currency> {
        &self.max
    }

    /// Whether `price` lies within the range.
    pub fn contains(&self, price: &Money<'static, Currency>) -> bool {
        let amount = price.amount();

        amount >= self.min.amount() && amount <= self.max.amount()
    }
}

/// A price bracket offered as a listing filter, e.g. `Under $250`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedPriceRange {
    /// Identifier used to select the bracket
    pub id: String,

    /// Display name
    pub name: String,

    /// Bounds of the bracket
    pub range: PriceRange,
}

/// Filter values the catalog offers for listing products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilters {
    /// Materials to choose from
    pub materials: Vec<String>,

    /// Gemstones to choose from
    pub gemstones: Vec<String>,

    /// Price brackets to choose from
    pub price_ranges: Vec<NamedPriceRange>,
}

impl CatalogFilters {
    /// Get a price bracket by id.
    pub fn price_range(&self, id: &str) -> Option<&NamedPriceRange> {
        self.price_ranges.iter().find(|range| range.id == id)
    }

    /// Whether the catalog offers no filter values at all.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.gemstones.is_empty() && self.price_ranges.is_empty()
    }
}

/// Criteria for listing catalog products.
///
/// Materials and gemstones each match if the product lists any of the given values; gemstones
/// are recorded among a product's materials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Only products in this category
    pub category: Option<String>,

    /// Products made of any of these materials
    pub materials: Vec<String>,

    /// Products set with any of these gemstones
    pub gemstones: Vec<String>,

    /// Products priced within this range
    pub price_range: Option<PriceRange>,

    /// Listing order
    pub sort: SortOrder,
}

impl ProductFilter {
    /// A filter matching every product, in catalog order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Toggle a material on or off.
    #[must_use]
    pub fn toggle_material(mut self, material: &str) -> Self {
        toggle(&mut self.materials, material);
        self
    }

    /// Toggle a gemstone on or off.
    #[must_use]
    pub fn toggle_gemstone(mut self, gemstone: &str) -> Self {
        toggle(&mut self.gemstones, gemstone);
        self
    }

    /// Restrict to a price range.
    #[must_use]
    pub fn price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(range);
        self
    }

    /// Set the listing order.
    #[must_use]
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Whether a product passes every criterion.
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_ref()
            .is_none_or(|category| &product.category == category)
            && lists_any(&product.materials, &self.materials)
            && lists_any(&product.materials, &self.gemstones)
            && self
                .price_range
                .is_none_or(|range| range.contains(&product.price))
    }

    /// Filter and sort products.
    pub fn apply<'a>(&self, products: impl Iterator<Item = &'a Product>) -> Vec<&'a Product> {
        let mut matched: Vec<&Product> = products.filter(|product| self.matches(product)).collect();

        match self.sort {
            SortOrder::Featured => {}
            SortOrder::PriceAsc => matched.sort_by_key(|product| *product.price.amount()),
            SortOrder::PriceDesc => {
                matched.sort_by_key(|product| std::cmp::Reverse(*product.price.amount()));
            }
            SortOrder::Newest => matched.sort_by_key(|product| !product.new),
        }

        matched
    }
}

fn toggle(values: &mut Vec<String>, value: &str) {
    if let Some(position) = values.iter().position(|existing| existing == value) {
        values.remove(position);
    } else {
        values.push(value.to_string());
    }
}

fn lists_any(listed: &[String], wanted: &[String]) -> bool {
    wanted.is_empty() || wanted.iter().any(|value| listed.contains(value))
}
