//! Address book endpoints.

use food_delivery_core::AddressId;
use reqwest::Method;
use tracing::instrument;

use super::types::{Address, AddressesBody, CreatedAddress, NewAddress};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET addresses`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn addresses(&self) -> Result<Vec<Address>, ApiError> {
        let body: Option<AddressesBody> =
            self.execute(Method::GET, self.url("addresses")?, None).await?;
        Ok(body.unwrap_or_default().addresses)
    }

    /// `POST addresses`, returning the new address id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the address.
    #[instrument(skip_all)]
    pub async fn create_address(&self, address: &NewAddress) -> Result<AddressId, ApiError> {
        let body = serde_json::to_value(address)?;
        let created: CreatedAddress = self
            .execute(Method::POST, self.url("addresses")?, Some(body))
            .await?;
        Ok(created.address_id)
    }

    /// `PUT addresses/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, address), fields(address_id = %id))]
    pub async fn update_address(&self, id: AddressId, address: &NewAddress) -> Result<(), ApiError> {
        let body = serde_json::to_value(address)?;
        self.execute_unit(Method::PUT, self.url(&format!("addresses/{id}"))?, Some(body))
            .await
    }

    /// `DELETE addresses/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        self.execute_unit(Method::DELETE, self.url(&format!("addresses/{id}"))?, None)
            .await
    }

    /// `PUT addresses/:id/default`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn set_default_address(&self, id: AddressId) -> Result<(), ApiError> {
        self.execute_unit(
            Method::PUT,
            self.url(&format!("addresses/{id}/default"))?,
            None,
        )
        .await
    }
}
