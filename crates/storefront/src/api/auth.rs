//! Authentication endpoints.

use reqwest::Method;
use tracing::instrument;

use super::types::{AuthResponse, Credentials, ProfileBody, ProfileUpdate, RegisterRequest, UserProfile};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `POST auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let body = serde_json::to_value(credentials)?;
        self.execute(Method::POST, self.url("auth/login")?, Some(body))
            .await
    }

    /// `POST auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    #[instrument(skip_all)]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let body = serde_json::to_value(request)?;
        self.execute(Method::POST, self.url("auth/register")?, Some(body))
            .await
    }

    /// `POST auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute_unit(Method::POST, self.url("auth/logout")?, None)
            .await
    }

    /// `GET auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or the request fails.
    #[instrument(skip_all)]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let body: ProfileBody = self
            .execute(Method::GET, self.url("auth/profile")?, None)
            .await?;
        Ok(body.into_profile())
    }

    /// `PUT auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let body = serde_json::to_value(update)?;
        let body: ProfileBody = self
            .execute(Method::PUT, self.url("auth/profile")?, Some(body))
            .await?;
        Ok(body.into_profile())
    }
}
