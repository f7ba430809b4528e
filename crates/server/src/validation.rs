//! Request field validation for product payloads.
//!
//! Fields arrive as loosely-typed JSON values (form submissions are strings,
//! JSON bodies may carry numbers). Validation turns them into [`NewProduct`]
//! or [`ProductPatch`], or reports every failing field at once.

use serde::Serialize;
use serde_json::{Map, Value};

use catalog_core::{NewProduct, Price, ProductPatch};

/// Maximum description length, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 5000;

/// Maximum length of an `imageUrl` body field, in characters.
pub const IMAGE_URL_MAX_CHARS: usize = 500_000;

/// A single field-level validation failure.
///
/// Serializes as `{"type": "field", "msg": ..., "path": ..., "location": "body"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub msg: String,
    pub path: &'static str,
    pub location: &'static str,
}

impl FieldError {
    fn new(path: &'static str, msg: String) -> Self {
        Self {
            kind: "field",
            msg,
            path,
            location: "body",
        }
    }

    /// The field was required but missing.
    #[must_use]
    pub fn required(path: &'static str) -> Self {
        Self::new(path, format!("{path} is required"))
    }

    fn not_string(path: &'static str) -> Self {
        Self::new(path, format!("{path} must be a string"))
    }

    fn empty(path: &'static str) -> Self {
        Self::new(path, format!("{path} must not be empty"))
    }

    fn too_long(path: &'static str, max: usize) -> Self {
        Self::new(path, format!("{path} must be at most {max} characters"))
    }

    fn not_numeric(path: &'static str) -> Self {
        Self::new(path, format!("{path} must be numeric"))
    }
}

/// Raw product fields as received, before validation.
///
/// `None` means the field was not sent at all. A JSON `null` for an optional
/// field is treated the same as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProductFields {
    pub name: Option<Value>,
    pub price: Option<Value>,
    pub color: Option<Value>,
    pub description: Option<Value>,
    pub image_url: Option<Value>,
}

impl RawProductFields {
    /// Pick the known fields out of a body map; unknown keys are ignored.
    #[must_use]
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            name: map.remove("name"),
            price: map.remove("price"),
            color: map.remove("color"),
            description: map.remove("description"),
            image_url: map.remove("imageUrl"),
        }
    }
}

/// Validate a full payload (create or replace).
///
/// `name`, `price` and `color` must be present. The body `imageUrl` is
/// checked but never copied into the result; only uploads set the image.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_new(raw: &RawProductFields) -> Result<NewProduct, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = required(&mut errors, "name", raw.name.as_ref(), non_empty_string);
    let price = required(&mut errors, "price", raw.price.as_ref(), numeric);
    let color = required(&mut errors, "color", raw.color.as_ref(), non_empty_string);
    let description = optional(&mut errors, raw.description.as_ref(), |v| {
        bounded_string(v, "description", DESCRIPTION_MAX_CHARS)
    });
    optional(&mut errors, raw.image_url.as_ref(), |v| {
        bounded_string(v, "imageUrl", IMAGE_URL_MAX_CHARS)
    });

    match (name, price, color) {
        (Some(name), Some(price), Some(color)) if errors.is_empty() => Ok(NewProduct {
            name,
            price,
            color,
            description: description.filter(|d| !d.is_empty()),
            image_url: None,
        }),
        _ => Err(errors),
    }
}

/// Validate a partial payload. Only fields that are present are checked.
///
/// # Errors
///
/// Returns every failing field.
pub fn validate_patch(raw: &RawProductFields) -> Result<ProductPatch, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = optional(&mut errors, raw.name.as_ref(), |v| {
        non_empty_string(v, "name")
    });
    let price = optional(&mut errors, raw.price.as_ref(), |v| numeric(v, "price"));
    let color = optional(&mut errors, raw.color.as_ref(), |v| {
        non_empty_string(v, "color")
    });
    let description = optional(&mut errors, raw.description.as_ref(), |v| {
        bounded_string(v, "description", DESCRIPTION_MAX_CHARS)
    });
    optional(&mut errors, raw.image_url.as_ref(), |v| {
        bounded_string(v, "imageUrl", IMAGE_URL_MAX_CHARS)
    });

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ProductPatch {
        name,
        price,
        color,
        description,
        image_url: None,
    })
}

fn required<T>(
    errors: &mut Vec<FieldError>,
    path: &'static str,
    value: Option<&Value>,
    check: impl FnOnce(&Value, &'static str) -> Result<T, FieldError>,
) -> Option<T> {
    match value {
        None | Some(Value::Null) => {
            errors.push(FieldError::required(path));
            None
        }
        Some(value) => check(value, path).map_err(|e| errors.push(e)).ok(),
    }
}

fn optional<T>(
    errors: &mut Vec<FieldError>,
    value: Option<&Value>,
    check: impl FnOnce(&Value) -> Result<T, FieldError>,
) -> Option<T> {
    match value {
        None | Some(Value::Null) => None,
        Some(value) => check(value).map_err(|e| errors.push(e)).ok(),
    }
}

fn non_empty_string(value: &Value, path: &'static str) -> Result<String, FieldError> {
    let Value::String(s) = value else {
        return Err(FieldError::not_string(path));
    };
    if s.is_empty() {
        return Err(FieldError::empty(path));
    }
    Ok(s.clone())
}

fn bounded_string(value: &Value, path: &'static str, max: usize) -> Result<String, FieldError> {
    let Value::String(s) = value else {
        return Err(FieldError::not_string(path));
    };
    if s.chars().count() > max {
        return Err(FieldError::too_long(path, max));
    }
    Ok(s.clone())
}

fn numeric(value: &Value, path: &'static str) -> Result<Price, FieldError> {
    match value {
        Value::Number(_) | Value::String(_) => {
            serde_json::from_value(value.clone()).map_err(|_| FieldError::not_numeric(path))
        }
        _ => Err(FieldError::not_numeric(path)),
    }
}
