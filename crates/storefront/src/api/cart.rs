//! Server-side cart endpoints.

use food_delivery_core::{Cart, MenuItemId};
use reqwest::Method;
use tracing::instrument;

use super::conversions::convert_cart;
use super::types::{AddCartItem, CartResponse, UpdateCartItem};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn cart(&self) -> Result<Cart, ApiError> {
        let response: Option<CartResponse> =
            self.execute(Method::GET, self.url("cart")?, None).await?;
        Ok(convert_cart(response.unwrap_or_default()))
    }

    /// `POST cart/items`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the item.
    #[instrument(skip(self, item), fields(menu_item_id = %item.menu_item_id))]
    pub async fn add_cart_item(&self, item: &AddCartItem) -> Result<(), ApiError> {
        let body = serde_json::to_value(item)?;
        self.execute_unit(Method::POST, self.url("cart/items")?, Some(body))
            .await
    }

    /// `PUT cart/items/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(menu_item_id = %id))]
    pub async fn update_cart_item(&self, id: MenuItemId, quantity: u32) -> Result<(), ApiError> {
        let body = serde_json::to_value(UpdateCartItem { quantity })?;
        self.execute_unit(
            Method::PUT,
            self.url(&format!("cart/items/{id}"))?,
            Some(body),
        )
        .await
    }

    /// `DELETE cart/items/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(menu_item_id = %id))]
    pub async fn remove_cart_item(&self, id: MenuItemId) -> Result<(), ApiError> {
        self.execute_unit(Method::DELETE, self.url(&format!("cart/items/{id}"))?, None)
            .await
    }

    /// `DELETE cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        self.execute_unit(Method::DELETE, self.url("cart")?, None)
            .await
    }
}
