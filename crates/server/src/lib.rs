//! Product catalog server library.
//!
//! A REST API and admin page over a product catalog. Records live in
//! `PostgreSQL` when it is reachable at startup and in process memory
//! otherwise; callers go through [`services::DataSource`] either way.
//!
//! The binary in `main.rs` wires this library to configuration, logging and
//! Sentry. Tests build the router directly with [`routes::build_router`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
