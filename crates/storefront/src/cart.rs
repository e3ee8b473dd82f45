//! Server-synced cart store.
//!
//! Every mutation is applied to the local [`Cart`] first, then sent to the
//! backend, then reconciled by re-fetching the server cart. A rejected
//! mutation rolls the local cart back to its pre-mutation snapshot. Mutations
//! are serialized so snapshots never interleave.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use food_delivery_core::{Cart, LineItem, MenuItemId, NewLineItem, Price};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::api::{AddCartItem, ApiClient, ApiError};
use crate::error::{AppError, add_breadcrumb};

/// Shared cart state, cheap to clone.
#[derive(Debug, Clone)]
pub struct CartStore {
    api: ApiClient,
    inner: Arc<CartInner>,
}

#[derive(Debug, Default)]
struct CartInner {
    cart: RwLock<Cart>,
    last_error: RwLock<Option<String>>,
    loading: AtomicBool,
    mutation: Mutex<()>,
}

/// Clears the loading flag when dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CartStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            inner: Arc::new(CartInner::default()),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.inner
            .cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.snapshot().items().to_vec()
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.read(Cart::total)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.read(Cart::count)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read(Cart::is_empty)
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    /// Message from the most recent failed operation, cleared on success.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn read<T>(&self, f: impl FnOnce(&Cart) -> T) -> T {
        f(&self.inner.cart.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write(&self, f: impl FnOnce(&mut Cart)) {
        f(&mut self
            .inner
            .cart
            .write()
            .unwrap_or_else(PoisonError::into_inner));
    }

    fn replace(&self, cart: Cart) {
        self.write(|current| *current = cart);
    }

    fn set_last_error(&self, message: Option<String>) {
        *self
            .inner
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = message;
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Forget the local cart without touching the backend, e.g. on logout.
    pub fn discard(&self) {
        self.replace(Cart::new());
        self.set_last_error(None);
    }

    /// Replace the local cart with the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be fetched; the local cart is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), AppError> {
        let _guard = self.inner.mutation.lock().await;
        let _loading = LoadingGuard::new(&self.inner.loading);

        match self.api.cart().await {
            Ok(cart) => {
                self.replace(cart);
                self.set_last_error(None);
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to load cart", e)),
        }
    }

    /// Add one unit of `item`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the item; the cart is rolled
    /// back.
    #[instrument(skip(self, item), fields(menu_item_id = %item.id))]
    pub async fn add(&self, item: NewLineItem) -> Result<(), AppError> {
        let request = AddCartItem {
            menu_item_id: item.id,
            quantity: 1,
            price: item.unit_price.amount,
        };
        let id = item.id.to_string();
        add_breadcrumb("cart", "Added item", Some(&[("menu_item_id", id.as_str())][..]));

        self.mutate(
            "Failed to add item to cart",
            |cart| {
                cart.add(item).map_err(|e| {
                    AppError::InvalidState(format!("Cannot mix currencies in one cart: {e}"))
                })
            },
            move |api| async move { api.add_cart_item(&request).await },
        )
        .await
    }

    /// Overwrite the quantity of line `id`. A quantity of zero or below
    /// removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update; the cart is rolled
    /// back.
    #[instrument(skip(self), fields(menu_item_id = %id))]
    pub async fn set_quantity(&self, id: MenuItemId, quantity: i64) -> Result<(), AppError> {
        let Ok(quantity) = u32::try_from(quantity) else {
            return if quantity <= 0 {
                self.remove(id).await
            } else {
                Err(AppError::InvalidState("Quantity is too large".to_string()))
            };
        };
        if quantity == 0 {
            return self.remove(id).await;
        }
        if self.read(|cart| cart.get(id).is_none()) {
            debug!("Item not in cart, nothing to update");
            return Ok(());
        }

        self.mutate(
            "Failed to update cart item",
            |cart| {
                cart.set_quantity(id, i64::from(quantity));
                Ok(())
            },
            move |api| async move { api.update_cart_item(id, quantity).await },
        )
        .await
    }

    /// Remove line `id`. Removing an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal; the cart is
    /// rolled back.
    #[instrument(skip(self), fields(menu_item_id = %id))]
    pub async fn remove(&self, id: MenuItemId) -> Result<(), AppError> {
        if self.read(|cart| cart.get(id).is_none()) {
            debug!("Item not in cart, nothing to remove");
            return Ok(());
        }

        self.mutate(
            "Failed to remove item from cart",
            |cart| {
                cart.remove(id);
                Ok(())
            },
            move |api| async move { api.remove_cart_item(id).await },
        )
        .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request; the cart is
    /// rolled back.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), AppError> {
        self.mutate(
            "Failed to clear cart",
            |cart| {
                cart.clear();
                Ok(())
            },
            |api| async move { api.clear_cart().await },
        )
        .await
    }

    /// Apply `local`, run `remote`, then reconcile with the server cart.
    async fn mutate<L, R, Fut>(
        &self,
        action: &'static str,
        local: L,
        remote: R,
    ) -> Result<(), AppError>
    where
        L: FnOnce(&mut Cart) -> Result<(), AppError>,
        R: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let _guard = self.inner.mutation.lock().await;
        let _loading = LoadingGuard::new(&self.inner.loading);

        let snapshot = self.snapshot();
        let mut patched = Ok(());
        self.write(|cart| patched = local(cart));
        if let Err(e) = patched {
            self.set_last_error(Some(e.user_message()));
            return Err(e);
        }

        if let Err(e) = remote(self.api.clone()).await {
            if !e.is_unauthorized() {
                self.replace(snapshot);
            }
            return Err(self.fail(action, e));
        }
        self.set_last_error(None);

        // The mutation is committed; a failed re-fetch keeps the local patch.
        match self.api.cart().await {
            Ok(cart) => self.replace(cart),
            Err(e) => {
                warn!(error = %e, "Cart re-fetch failed after mutation");
                let _ = self.fail("Failed to load cart", e);
            }
        }

        Ok(())
    }

    /// Record a failure. A 401/403 also empties the local cart, since the
    /// session that owned it is gone.
    fn fail(&self, action: &'static str, source: ApiError) -> AppError {
        if source.is_unauthorized() {
            self.replace(Cart::new());
        }
        let err = AppError::request(action, source);
        self.set_last_error(Some(err.user_message()));
        err
    }
}
