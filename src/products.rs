//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Catalog product identifier.
///
/// Catalog documents use either strings or integers for ids; both are held as text, so the
/// number `10` and the string `"10"` name the same product. Ids always serialize as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawProductId", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Text(String),
    Number(u64),
}

impl From<RawProductId> for ProductId {
    fn from(raw: RawProductId) -> Self {
        match raw {
            RawProductId::Text(id) => Self(id),
            RawProductId::Number(id) => Self(id.to_string()),
        }
    }
}

/// A purchasable variant of a product, e.g. a ring size or a chain length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Ring size
    #[serde(default)]
    pub size: Option<String>,

    /// Chain length
    #[serde(default)]
    pub length: Option<String>,

    /// Whether the variant is in stock
    #[serde(default = "in_stock")]
    pub available: bool,
}

fn in_stock() -> bool {
    true
}

impl ProductVariant {
    /// The label used as the cart selection: the size, or failing that the length.
    pub fn label(&self) -> Option<&str> {
        self.size.as_deref().or(self.length.as_deref())
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product price
    pub price: Money<'static, Currency>,

    /// Image references, primary image first
    pub images: SmallVec<[String; 4]>,

    /// Category id (e.g. `rings`)
    pub category: String,

    /// Long-form description
    pub description: Option<String>,

    /// Materials and gemstones
    pub materials: Vec<String>,

    /// Size or length variants
    pub variants: Vec<ProductVariant>,

    /// Metal finishes the product is offered in
    pub metal_options: Vec<String>,

    /// Shown on the home page
    pub featured: bool,

    /// New arrival
    pub new: bool,
}

impl Product {
    /// Creates a product with no images, variants or metal options.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money<'static, Currency>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            images: SmallVec::new(),
            category: category.into(),
            description: None,
            materials: Vec::new(),
            variants: Vec::new(),
            metal_options: Vec::new(),
            featured: false,
            new: false,
        }
    }

    /// Returns the primary image, if the product has any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product must be added with a variant selection.
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Returns the first available variant label and the first metal option.
    pub fn default_selection(&self) -> (Option<&str>, Option<&str>) {
        let variant = self
            .variants
            .iter()
            .filter(|variant| variant.available)
            .find_map(ProductVariant::label);

        let metal = self.metal_options.first().map(String::as_str);

        (variant, metal)
    }

    /// Checks whether `label` names an in-stock variant of this product.
    pub fn variant_available(&self, label: &str) -> bool {
        self.variants
            .iter()
            .any(|variant| variant.available && variant.label() == Some(label))
    }
}
