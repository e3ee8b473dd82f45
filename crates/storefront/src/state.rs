//! Storefront context shared by every surface.

use std::sync::Arc;

use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::cart::CartStore;
use crate::checkout::CheckoutFlow;
use crate::config::StorefrontConfig;
use crate::session::{AuthContext, SessionState, SessionStore};
use crate::storage::{FileTokenStore, TokenStore};

/// Everything a storefront surface needs: configuration, the API client,
/// the session and the cart.
///
/// This struct is cheaply cloneable via `Arc`; clones share one session and
/// one cart.
#[derive(Debug, Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

#[derive(Debug)]
struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: SessionStore,
    cart: CartStore,
}

impl Storefront {
    /// Wire the stores together over `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, storage: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let auth = Arc::new(AuthContext::new(storage));
        let api = ApiClient::new(&config, auth)?;
        let session = SessionStore::new(api.clone());
        let cart = CartStore::new(api.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                session,
                cart,
            }),
        })
    }

    /// Like [`Self::new`], with the session kept in the configured token file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(FileTokenStore::new(config.token_path.clone()));
        Self::new(config, storage)
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// A fresh checkout using the configured confirmation delay.
    #[must_use]
    pub fn checkout(&self) -> CheckoutFlow {
        CheckoutFlow::new(self.inner.config.confirmation_reset_delay)
    }

    /// Restore a saved session and, when signed in, load its cart.
    ///
    /// A cart that fails to load is left empty with its error recorded.
    pub async fn start(&self) -> SessionState {
        let state = self.session().hydrate().await;
        if state.is_authenticated()
            && let Err(e) = self.cart().refresh().await
        {
            info!(error = %e, "Cart not loaded at startup");
        }
        state
    }

    /// Sign out and forget the local cart.
    pub async fn logout(&self) {
        self.session().logout().await;
        self.cart().discard();
    }
}
