//! Product REST handlers.
//!
//! Every response carries the serving `hostname` and the active `source`.
//! Successful responses wrap the record(s) in `data`; a missing product is a
//! 404 with `message` and no `data`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use catalog_core::{Product, ProductId};

use super::form::{ProductForm, UploadedFile};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::StoreKind;
use crate::validation::{validate_new, validate_patch};

/// Success body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub hostname: String,
    pub source: StoreKind,
}

impl<T> Envelope<T> {
    fn new(state: &AppState, data: T) -> Self {
        Self {
            data,
            hostname: state.hostname().to_owned(),
            source: state.source(),
        }
    }
}

/// Body of a 404 for an unknown product.
#[derive(Debug, Serialize)]
pub struct NotFound {
    pub message: &'static str,
    pub hostname: String,
    pub source: StoreKind,
}

impl NotFound {
    fn new(state: &AppState) -> Self {
        Self {
            message: "Not found",
            hostname: state.hostname().to_owned(),
            source: state.source(),
        }
    }
}

fn found_or_404(state: &AppState, product: Option<Product>) -> Response {
    match product {
        Some(product) => Json(Envelope::new(state, product)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(NotFound::new(state))).into_response(),
    }
}

/// Write the uploaded image, if any, and return its web path.
async fn store_image(
    state: &AppState,
    image: Option<&UploadedFile>,
) -> Result<Option<String>, AppError> {
    match image {
        Some(image) => Ok(Some(
            state.uploads().save(&image.file_name, &image.bytes).await?,
        )),
        None => Ok(None),
    }
}

/// Drop an upload that did not end up attached to any product.
fn discard_image(state: &AppState, image_url: Option<&str>) {
    if let Some(url) = image_url {
        tracing::debug!(%url, "Discarding unattached upload");
        state.uploads().remove_detached(url);
    }
}

/// List all products.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Product>>>, AppError> {
    let products = state.data_source().get_all().await?;
    Ok(Json(Envelope::new(&state, products)))
}

/// Show a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let product = state.data_source().get_by_id(&ProductId::new(id)).await?;
    Ok(found_or_404(&state, product))
}

/// Create a product.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    form: ProductForm,
) -> Result<(StatusCode, Json<Envelope<Product>>), AppError> {
    let mut new = validate_new(&form.fields).map_err(AppError::Validation)?;
    new.image_url = store_image(&state, form.image.as_ref()).await?;
    let image_url = new.image_url.clone();

    match state.data_source().create(new).await {
        Ok(product) => {
            tracing::info!(id = %product.id, "Product created");
            Ok((StatusCode::CREATED, Json(Envelope::new(&state, product))))
        }
        Err(e) => {
            discard_image(&state, image_url.as_deref());
            Err(e.into())
        }
    }
}

/// Replace a product's fields.
#[instrument(skip(state, form))]
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: ProductForm,
) -> Result<Response, AppError> {
    let mut new = validate_new(&form.fields).map_err(AppError::Validation)?;
    new.image_url = store_image(&state, form.image.as_ref()).await?;
    let image_url = new.image_url.clone();

    let result = state.data_source().replace(&ProductId::new(id), new).await;
    if !matches!(result, Ok(Some(_))) {
        discard_image(&state, image_url.as_deref());
    }
    Ok(found_or_404(&state, result?))
}

/// Update the supplied fields of a product.
#[instrument(skip(state, form))]
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: ProductForm,
) -> Result<Response, AppError> {
    let mut patch = validate_patch(&form.fields).map_err(AppError::Validation)?;
    patch.image_url = store_image(&state, form.image.as_ref()).await?;
    let image_url = patch.image_url.clone();

    let result = state.data_source().patch(&ProductId::new(id), patch).await;
    if !matches!(result, Ok(Some(_))) {
        discard_image(&state, image_url.as_deref());
    }
    Ok(found_or_404(&state, result?))
}

/// Delete a product and return it.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let removed = state.data_source().remove(&ProductId::new(id)).await?;
    if let Some(product) = &removed {
        tracing::info!(id = %product.id, "Product deleted");
    }
    Ok(found_or_404(&state, removed))
}
