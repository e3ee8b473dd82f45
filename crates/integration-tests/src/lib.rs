//! End-to-end tests for the food delivery storefront.
//!
//! Each test drives a [`Storefront`] against a `wiremock` backend, with the
//! session persisted to a temporary file so restarts can be simulated.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p food-delivery-integration-tests
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use food_delivery_storefront::storage::FileTokenStore;
use food_delivery_storefront::{Storefront, StorefrontConfig};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token the mocked backend hands out on login.
pub const TEST_TOKEN: &str = "test-token";

/// A mocked backend and a storefront pointed at it.
pub struct TestContext {
    pub server: MockServer,
    pub storefront: Storefront,
    pub token_path: PathBuf,
    _dir: TempDir,
}

impl TestContext {
    /// Start a backend with nothing mounted.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or the client cannot be created.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let token_path = dir.path().join("session.json");
        let storefront = storefront_at(&server, &token_path);

        Self {
            server,
            storefront,
            token_path,
            _dir: dir,
        }
    }

    /// A second storefront over the same backend and session file, as after
    /// a process restart.
    #[must_use]
    pub fn restart(&self) -> Storefront {
        storefront_at(&self.server, &self.token_path)
    }

    /// Mount `POST auth/login` and `GET auth/profile` for the test user.
    pub async fn mount_auth(&self) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "token": TEST_TOKEN, "user": user_json() })),
            )
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/auth/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .mount(&self.server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }
}

fn storefront_at(server: &MockServer, token_path: &std::path::Path) -> Storefront {
    let config = StorefrontConfig::for_base_url(&format!("{}/api", server.uri()))
        .expect("Mock server URL is valid");
    let storage = Arc::new(FileTokenStore::new(token_path));
    Storefront::new(config, storage).expect("Failed to create storefront")
}

/// The test user as the backend returns it.
#[must_use]
pub fn user_json() -> Value {
    json!({
        "id": 7,
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "5551234567"
    })
}

/// A restaurant with a two-dish menu.
#[must_use]
pub fn restaurant_json() -> Value {
    json!({
        "id": 1,
        "name": "Pizza Palace",
        "cuisine": "Italian",
        "rating": 4.5,
        "deliveryTime": "25-35 min",
        "menu": [
            { "id": 1, "name": "Margherita Pizza", "price": 12.99, "category": "Pizzas" },
            { "id": 4, "name": "Garlic Bread", "price": 4.99, "category": "Sides" }
        ]
    })
}
