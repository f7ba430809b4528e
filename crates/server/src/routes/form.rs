//! Product form extractor.
//!
//! Product writes accept JSON, URL-encoded forms and multipart forms. The
//! multipart variant may carry an image in the `imageFile` field. Whatever the
//! encoding, the handler receives the same [`ProductForm`].

use std::collections::HashMap;

use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::validation::RawProductFields;

/// Multipart field holding the uploaded image.
pub const IMAGE_FIELD: &str = "imageFile";

/// An image received with the form, not yet written to disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Decoded product form body.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub fields: RawProductFields,
    pub image: Option<UploadedFile>,
}

enum BodyKind {
    Json,
    UrlEncoded,
    Multipart,
    Unspecified,
    Unsupported(String),
}

fn body_kind(request: &Request) -> BodyKind {
    let Some(content_type) = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return BodyKind::Unspecified;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/json" => BodyKind::Json,
        "application/x-www-form-urlencoded" => BodyKind::UrlEncoded,
        "multipart/form-data" => BodyKind::Multipart,
        m if m.ends_with("+json") => BodyKind::Json,
        _ => BodyKind::Unsupported(mime),
    }
}

impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Json => {
                let Json(value) = Json::<Value>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                from_json(value)
            }
            BodyKind::UrlEncoded => {
                let Form(pairs) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                Ok(Self {
                    fields: fields_from_strings(pairs),
                    image: None,
                })
            }
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                from_multipart(multipart).await
            }
            BodyKind::Unspecified => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Self::default());
                }
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
                from_json(value)
            }
            BodyKind::Unsupported(mime) => Err(AppError::BadRequest(format!(
                "Unsupported content type: {mime}"
            ))),
        }
    }
}

fn from_json(value: Value) -> Result<ProductForm, AppError> {
    match value {
        Value::Object(map) => Ok(ProductForm {
            fields: RawProductFields::from_map(map),
            image: None,
        }),
        _ => Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

fn fields_from_strings(pairs: impl IntoIterator<Item = (String, String)>) -> RawProductFields {
    let map: Map<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    RawProductFields::from_map(map)
}

async fn from_multipart(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut text_fields = Vec::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            // Browsers send an empty part when no file was chosen.
            if !file_name.is_empty() || !bytes.is_empty() {
                image = Some(UploadedFile { file_name, bytes });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            text_fields.push((name, text));
        }
    }

    Ok(ProductForm {
        fields: fields_from_strings(text_fields),
        image,
    })
}
