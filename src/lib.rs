//! Aura
//!
//! Aura is the cart and checkout core of a jewelry storefront: a read-only product catalog, a
//! persistent shopping cart with change notifications, order pricing and a simulated checkout.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod items;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod storage;
