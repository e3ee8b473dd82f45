//! Order history and order detail.

use food_delivery_core::{OrderId, OrderStatus};
use tracing::{info, instrument};

use super::Loadable;
use crate::api::{ApiClient, Order};
use crate::error::AppError;

/// The signed-in user's orders, newest first as the backend returns them.
#[derive(Debug, Clone, Default)]
pub struct OrderListing {
    state: Loadable<Vec<Order>>,
}

impl OrderListing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<Vec<Order>> {
        &self.state
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        self.state.data().map_or(&[], Vec::as_slice)
    }

    /// # Errors
    ///
    /// Returns the backend error; the previous list is dropped.
    #[instrument(skip_all)]
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), AppError> {
        self.state.begin();
        let result = api
            .orders()
            .await
            .map_err(|e| AppError::request("Failed to load orders. Please try again.", e));
        self.state.settle(result)
    }
}

/// Position of an order on the delivery timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineProgress {
    /// Steps reached so far, counting the current one.
    pub reached: usize,
    pub total: usize,
}

/// A single order.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    id: OrderId,
    state: Loadable<Order>,
}

impl OrderDetail {
    #[must_use]
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            state: Loadable::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<Order> {
        &self.state
    }

    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        self.state.data()
    }

    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, api), fields(order_id = %self.id))]
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), AppError> {
        self.state.begin();
        let result = api
            .order(self.id)
            .await
            .map_err(|e| AppError::request("Failed to load order details. Please try again.", e));
        self.state.settle(result)
    }

    /// Timeline position, or `None` for a cancelled or unloaded order.
    #[must_use]
    pub fn progress(&self) -> Option<TimelineProgress> {
        let index = self.order()?.status.timeline_index()?;
        Some(TimelineProgress {
            reached: index + 1,
            total: OrderStatus::TIMELINE.len(),
        })
    }

    /// Whether the loaded order can still be cancelled.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.order().is_some_and(|o| o.status.is_cancellable())
    }

    /// Cancel the order, then reload it.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the order is not loaded or no longer cancellable;
    /// otherwise the backend error.
    #[instrument(skip(self, api), fields(order_id = %self.id))]
    pub async fn cancel(&mut self, api: &ApiClient) -> Result<(), AppError> {
        if !self.can_cancel() {
            return Err(AppError::InvalidState(
                "This order can no longer be cancelled".to_string(),
            ));
        }

        api.update_order_status(self.id, OrderStatus::Cancelled)
            .await
            .map_err(|e| AppError::request("Failed to cancel order. Please try again.", e))?;
        info!("Order cancelled");

        self.load(api).await
    }
}
