//! Product identifiers.
//!
//! The fallback store generates UUIDs while the database assigns its own
//! keys. Both are surfaced as an opaque string so callers never branch on
//! where a product came from.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, store-independent product identifier.
///
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - Conversions from `String`, `&str` and database `i64` keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create an ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random (v4 UUID) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the ID, returning the underlying string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Interpret the ID as a numeric database key.
    ///
    /// Returns `None` for IDs that did not come from the database
    /// (for example UUIDs from the fallback store).
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl ::core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}
