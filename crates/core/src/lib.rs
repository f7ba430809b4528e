//! Catalog Core - Shared product types.
//!
//! This crate provides the types used across all catalog components:
//! - `server` - REST API and admin page
//! - `cli` - Migrations and seeding tools
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Both record stores and the HTTP layer exchange these types,
//! so a product looks the same no matter which store produced it.
//!
//! # Modules
//!
//! - [`types`] - Product identifier, price, and the product record shapes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
