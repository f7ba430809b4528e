//! Integration tests for the catalog server.
//!
//! Each test spawns its own server on an ephemeral port, running on the
//! in-memory store with a temporary public directory, and talks to it over
//! HTTP with `reqwest`. No database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p catalog-integration-tests
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use catalog_server::config::CatalogConfig;
use catalog_server::routes::build_router;
use catalog_server::state::AppState;
use reqwest::Client;
use tempfile::TempDir;

/// A running server plus an HTTP client pointed at it.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    public_dir: TempDir,
}

impl TestApp {
    /// Start a server in fallback mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory, listener or client
    /// cannot be created.
    pub async fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
        let public_dir = TempDir::new()?;
        let config = CatalogConfig {
            database_url: None,
            public_dir: public_dir.path().to_path_buf(),
            hostname: "integration-host".to_string(),
            ..CatalogConfig::default()
        };

        let state = AppState::bootstrap(config).await?;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        // The server lives until the test runtime shuts down.
        tokio::spawn(async move {
            let _ = axum::serve(listener, build_router(state)).await;
        });

        Ok(Self {
            addr,
            client: Client::builder().build()?,
            public_dir,
        })
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Directory uploaded images are written to.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.path().join("uploads")
    }

    /// On-disk path for an `/uploads/...` image URL.
    #[must_use]
    pub fn upload_path(&self, image_url: &str) -> PathBuf {
        self.uploads_dir()
            .join(image_url.trim_start_matches("/uploads/"))
    }
}

/// Wait for a detached file removal to land.
pub async fn wait_until_removed(path: &Path) -> bool {
    for _ in 0..100 {
        if !path.exists() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    !path.exists()
}
