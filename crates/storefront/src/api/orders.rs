//! Order endpoints.

use food_delivery_core::{OrderId, OrderStatus};
use reqwest::Method;
use tracing::instrument;

use super::types::{CreateOrderRequest, Order, OrderReceipt, OrdersBody, UpdateOrderStatus};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `POST orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order.
    #[instrument(skip(self, request), fields(address_id = %request.address_id))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderReceipt, ApiError> {
        let body = serde_json::to_value(request)?;
        let receipt: Option<OrderReceipt> = self
            .execute(Method::POST, self.url("orders")?, Some(body))
            .await?;
        Ok(receipt.unwrap_or_default())
    }

    /// `GET orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let body: Option<OrdersBody> = self.execute(Method::GET, self.url("orders")?, None).await?;
        Ok(body.unwrap_or_default().orders)
    }

    /// `GET orders/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.execute(Method::GET, self.url(&format!("orders/{id}"))?, None)
            .await
    }

    /// `PUT orders/:id/status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<(), ApiError> {
        let body = serde_json::to_value(UpdateOrderStatus { status })?;
        self.execute_unit(
            Method::PUT,
            self.url(&format!("orders/{id}/status"))?,
            Some(body),
        )
        .await
    }
}
