//! Saved delivery addresses.
//!
//! Every change is validated locally, sent, and followed by a reload, so
//! which address is the default is always what the backend says.

use food_delivery_core::AddressId;
use tracing::{instrument, warn};

use super::Loadable;
use crate::api::{Address, ApiClient, NewAddress};
use crate::error::AppError;
use crate::validation::validate_address;

#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    state: Loadable<Vec<Address>>,
}

impl AddressBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<Vec<Address>> {
        &self.state
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        self.state.data().map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn get(&self, id: AddressId) -> Option<&Address> {
        self.addresses().iter().find(|a| a.id == id)
    }

    /// The address flagged as default by the backend.
    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses().iter().find(|a| a.is_default)
    }

    /// # Errors
    ///
    /// Returns the backend error; the previous list is dropped.
    #[instrument(skip_all)]
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), AppError> {
        self.state.begin();
        let result = api
            .addresses()
            .await
            .map_err(|e| AppError::request("Failed to load addresses. Please try again.", e));
        self.state.settle(result)
    }

    /// Save a new address and return its id.
    ///
    /// # Errors
    ///
    /// `Validation` for missing fields; otherwise the backend error.
    #[instrument(skip_all)]
    pub async fn create(&mut self, api: &ApiClient, form: &NewAddress) -> Result<AddressId, AppError> {
        validate_address(form).map_err(AppError::Validation)?;
        let id = api
            .create_address(form)
            .await
            .map_err(|e| AppError::request("Failed to save address. Please try again.", e))?;
        self.reload(api).await;
        Ok(id)
    }

    /// # Errors
    ///
    /// `Validation` for missing fields; otherwise the backend error.
    #[instrument(skip(self, api, form), fields(address_id = %id))]
    pub async fn update(
        &mut self,
        api: &ApiClient,
        id: AddressId,
        form: &NewAddress,
    ) -> Result<(), AppError> {
        validate_address(form).map_err(AppError::Validation)?;
        api.update_address(id, form)
            .await
            .map_err(|e| AppError::request("Failed to save address. Please try again.", e))?;
        self.reload(api).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, api), fields(address_id = %id))]
    pub async fn delete(&mut self, api: &ApiClient, id: AddressId) -> Result<(), AppError> {
        api.delete_address(id)
            .await
            .map_err(|e| AppError::request("Failed to delete address", e))?;
        self.reload(api).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, api), fields(address_id = %id))]
    pub async fn set_default(&mut self, api: &ApiClient, id: AddressId) -> Result<(), AppError> {
        api.set_default_address(id)
            .await
            .map_err(|e| AppError::request("Failed to set default address", e))?;
        self.reload(api).await;
        Ok(())
    }

    /// Reload after a committed change. A failure is kept in the state
    /// rather than failing the change itself.
    async fn reload(&mut self, api: &ApiClient) {
        if let Err(e) = self.load(api).await {
            warn!(error = %e, "Address change saved but the list could not be reloaded");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use food_delivery_core::AddressLabel;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::session::AuthContext;
    use crate::storage::MemoryTokenStore;

    fn api(server: &MockServer) -> ApiClient {
        let config = StorefrontConfig::for_base_url(&format!("{}/api", server.uri())).unwrap();
        let auth = Arc::new(AuthContext::new(Arc::new(MemoryTokenStore::new())));
        ApiClient::new(&config, auth).unwrap()
    }

    fn work_address() -> NewAddress {
        NewAddress {
            address_line1: "1 Office Park".to_string(),
            address_line2: Some("Floor 3".to_string()),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62704".to_string(),
            label: AddressLabel::Work,
        }
    }

    #[tokio::test]
    async fn test_load_reads_default_from_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/addresses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "addresses": [
                    { "id": 1, "street": "12 High St", "city": "Springfield", "state": "IL",
                      "pincode": "62701", "type": "home", "is_default": false },
                    { "id": 2, "addressLine1": "1 Office Park", "city": "Springfield",
                      "state": "IL", "postalCode": "62704", "label": "work", "isDefault": true }
                ]
            })))
            .mount(&server)
            .await;

        let mut book = AddressBook::new();
        book.load(&api(&server)).await.unwrap();

        assert_eq!(book.addresses().len(), 2);
        assert_eq!(book.default_address().unwrap().id, AddressId::new(2));
        assert_eq!(book.get(AddressId::new(1)).unwrap().postal_code, "62701");
    }

    #[tokio::test]
    async fn test_create_validates_before_sending() {
        let server = MockServer::start().await;
        let mut book = AddressBook::new();

        let err = book
            .create(&api(&server), &NewAddress::default())
            .await
            .unwrap_err();

        assert_eq!(err.field_errors().unwrap().len(), 4);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_reload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/addresses"))
            .and(body_json(json!({
                "addressLine1": "1 Office Park",
                "addressLine2": "Floor 3",
                "city": "Springfield",
                "state": "IL",
                "postalCode": "62704",
                "label": "work"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "addressId": 8 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/addresses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "addresses": [{ "id": 8, "addressLine1": "1 Office Park", "city": "Springfield",
                                "state": "IL", "postalCode": "62704", "label": "work" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut book = AddressBook::new();
        let id = book.create(&api(&server), &work_address()).await.unwrap();

        assert_eq!(id, AddressId::new(8));
        assert_eq!(book.addresses().len(), 1);
    }

    #[tokio::test]
    async fn test_set_default_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/addresses/3/default"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut book = AddressBook::new();
        let err = book
            .set_default(&api(&server), AddressId::new(3))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Failed to set default address");
    }

    #[tokio::test]
    async fn test_delete_reloads() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/addresses/3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/addresses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "addresses": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let mut book = AddressBook::new();
        book.delete(&api(&server), AddressId::new(3)).await.unwrap();
        assert!(book.addresses().is_empty());
        assert!(book.state().data().is_some());
    }
}
