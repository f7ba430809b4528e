//! Core types for the catalog.
//!
//! This module provides type-safe wrappers for the product domain.

pub mod id;
pub mod price;
pub mod product;

pub use id::ProductId;
pub use price::{Price, PriceError};
pub use product::{NewProduct, Product, ProductPatch, UPLOADS_PREFIX};
