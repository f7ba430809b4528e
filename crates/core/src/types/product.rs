//! Product records and the payloads that create or modify them.
//!
//! [`Product`] is the normalized shape every store returns: the identifier is
//! always a string, a missing description serializes as `null` and a missing
//! image serializes as an empty string.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Web path prefix for images uploaded to this server.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "empty_string_as_none")]
    pub image_url: Option<String>,
}

impl Product {
    /// Build a product from a creation payload and an identifier.
    #[must_use]
    pub fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            price: new.price,
            color: new.color,
            description: new.description,
            image_url: non_empty(new.image_url),
        }
    }

    /// Replace the business fields with those of `new`.
    ///
    /// The identifier never changes. The image is only replaced when `new`
    /// carries one.
    pub fn replace_with(&mut self, new: NewProduct) {
        self.name = new.name;
        self.price = new.price;
        self.color = new.color;
        self.description = new.description;
        if let Some(url) = non_empty(new.image_url) {
            self.image_url = Some(url);
        }
    }

    /// Apply the fields present in `patch`, leaving all others untouched.
    ///
    /// An empty description clears it.
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(description) = patch.description {
            self.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(url) = non_empty(patch.image_url) {
            self.image_url = Some(url);
        }
    }

    /// File name of the image if it was uploaded to this server.
    #[must_use]
    pub fn local_upload_name(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .and_then(|url| url.strip_prefix(UPLOADS_PREFIX))
            .filter(|name| !name.is_empty())
    }

    /// Whether the image points at a file uploaded to this server.
    #[must_use]
    pub fn has_local_upload(&self) -> bool {
        self.local_upload_name().is_some()
    }
}

/// Payload for creating a product or fully replacing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "empty_string_as_none")]
    pub image_url: Option<String>,
}

/// Partial update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// True when the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.color.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Serde adapter: `None` <-> `""`, and `null` reads as `None`.
mod empty_string_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|s| !s.is_empty()))
    }
}
