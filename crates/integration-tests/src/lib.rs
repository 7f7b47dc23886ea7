//! Integration tests for the E-Computer Store cart.
//!
//! Every test runs the storefront against a [`FileStore`] in a fresh
//! temporary directory, the way the CLI does.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p estore-integration-tests
//! ```

use std::sync::Arc;

use estore_core::ProductId;
use estore_storefront::auth::CurrentUser;
use estore_storefront::config::StorefrontConfig;
use estore_storefront::notify::RecordingNotifier;
use estore_storefront::product::Product;
use estore_storefront::state::AppState;
use estore_storefront::storage::FileStore;
use serde_json::json;
use tempfile::TempDir;

/// State type used by the tests.
pub type TestState = AppState<FileStore, Arc<RecordingNotifier>>;

/// A storefront backed by a temporary directory.
///
/// The directory lives as long as the context.
pub struct TestContext {
    pub dir: TempDir,
    pub config: StorefrontConfig,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    /// Create a context with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory can't be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = StorefrontConfig::defaults().expect("Default config is valid");
        config.data_dir = dir.path().to_path_buf();
        Self {
            dir,
            config,
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    /// A fresh application state over the context's directory.
    ///
    /// Each call simulates a new process start: nothing is shared with
    /// earlier states except the files on disk.
    #[must_use]
    pub fn state(&self) -> TestState {
        AppState::new(
            self.config.clone(),
            FileStore::new(self.dir.path()),
            Arc::clone(&self.notifier),
        )
    }

    /// A state with [`test_user`] signed in.
    ///
    /// # Panics
    ///
    /// Panics if the session can't be written.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn signed_in_state(&self) -> TestState {
        let state = self.state();
        state
            .session()
            .sign_in(&test_user())
            .expect("Failed to sign in");
        state
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The user the tests sign in as.
#[must_use]
pub fn test_user() -> CurrentUser {
    CurrentUser {
        first_name: "Nimal".to_string(),
        last_name: "Perera".to_string(),
        email: "nimal@example.lk".to_string(),
        phone: "0771234567".to_string(),
    }
}

/// A product document as the products API returns it.
///
/// # Panics
///
/// Panics if `price` doesn't make a valid product.
#[must_use]
#[allow(clippy::expect_used)]
pub fn api_product(id: &str, name: &str, price: f64) -> Product {
    Product::from_api(&json!({
        "_id": format!("mongo-{id}"),
        "productId": id,
        "name": name,
        "price": price,
        "labelledPrice": price * 1.2,
        "image": [format!("/images/{id}.png")],
        "stock": 10
    }))
    .expect("Test product is valid")
}

/// Parse a product id.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::expect_used)]
pub fn id(id: &str) -> ProductId {
    ProductId::parse(id).expect("Test product id is valid")
}
