//! Backend health probe.

use reqwest::Method;
use tracing::instrument;

use super::types::HealthStatus;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip_all)]
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let status: Option<HealthStatus> =
            self.execute(Method::GET, self.url("health")?, None).await?;
        Ok(status.unwrap_or_default())
    }
}
