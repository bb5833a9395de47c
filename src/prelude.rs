//! Aura prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartError, CartEvent, CartHandle, CartState, CartStore, DecodeError, SubscriptionKey},
    catalog::{
        Catalog, CatalogError, CatalogFilters, Category, NamedPriceRange, PriceRange,
        ProductFilter, SortOrder, placeholder_image,
    },
    checkout::{
        CheckoutDetails, CheckoutError, DEFAULT_COUNTRY, OrderConfirmation, OrderId, PaymentMethod,
        checkout,
    },
    config::{CartConfig, DEFAULT_STORAGE_KEY},
    items::{LineItem, LineItemKey},
    pricing::{OrderSummary, PricingError, PricingPolicy},
    products::{Product, ProductId, ProductVariant},
    receipt::{ReceiptError, write_cart, write_confirmation},
    storage::{FileStorage, MemoryStorage, Storage, StorageError},
};
