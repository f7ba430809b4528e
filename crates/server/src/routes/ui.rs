//! Admin page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use catalog_core::Product;

use crate::error::AppError;
use crate::state::AppState;

/// Product row for the admin table.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    /// Formatted for display, e.g. `$19.99`.
    pub price: String,
    /// Raw amount used to prefill the edit form.
    pub price_value: String,
    pub color: String,
    pub description: String,
    pub image_url: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            price_value: product.price.to_string(),
            color: product.color.clone(),
            description: product.description.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Admin page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub products: Vec<ProductView>,
    pub hostname: String,
    pub source: String,
}

/// Render the admin page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<IndexTemplate, AppError> {
    let products = state.data_source().get_all().await?;

    Ok(IndexTemplate {
        products: products.iter().map(ProductView::from).collect(),
        hostname: state.hostname().to_owned(),
        source: state.source().to_string(),
    })
}
