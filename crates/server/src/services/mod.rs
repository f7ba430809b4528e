//! Services that sit between the HTTP layer and storage.
//!
//! - [`data_source`] - facade over the persistent and fallback stores
//! - [`uploads`] - image files written to and removed from disk

pub mod data_source;
pub mod uploads;

pub use data_source::DataSource;
pub use uploads::{UploadError, UploadStore};
