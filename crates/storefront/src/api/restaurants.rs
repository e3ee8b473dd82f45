//! Restaurant and review endpoints.

use food_delivery_core::RestaurantId;
use reqwest::Method;
use tracing::instrument;

use super::types::{
    NewReview, Restaurant, RestaurantBody, RestaurantPage, RestaurantQuery, Review, ReviewsBody,
};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET restaurants?search&cuisine&sort&page&limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn restaurants(&self, query: &RestaurantQuery) -> Result<RestaurantPage, ApiError> {
        let mut url = self.url("restaurants")?;
        query.apply(&mut url);
        self.execute(Method::GET, url, None).await
    }

    /// `GET restaurants/:id`, including the menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the restaurant is not found or the request fails.
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn restaurant(&self, id: RestaurantId) -> Result<Restaurant, ApiError> {
        let body: RestaurantBody = self
            .execute(Method::GET, self.url(&format!("restaurants/{id}"))?, None)
            .await?;
        Ok(body.into_restaurant())
    }

    /// `GET restaurants/:id/reviews`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn reviews(&self, id: RestaurantId) -> Result<Vec<Review>, ApiError> {
        let body: Option<ReviewsBody> = self
            .execute(
                Method::GET,
                self.url(&format!("restaurants/{id}/reviews"))?,
                None,
            )
            .await?;
        Ok(body.unwrap_or_default().reviews)
    }

    /// `POST restaurants/:id/reviews`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the review.
    #[instrument(skip(self, review), fields(restaurant_id = %id))]
    pub async fn add_review(&self, id: RestaurantId, review: &NewReview) -> Result<(), ApiError> {
        let body = serde_json::to_value(review)?;
        self.execute_unit(
            Method::POST,
            self.url(&format!("restaurants/{id}/reviews"))?,
            Some(body),
        )
        .await
    }
}
