//! `food health`.

use food_delivery_storefront::{AppError, Storefront};

use crate::error::CliError;
use crate::output;

/// Ping the backend.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or unhealthy.
pub async fn check(storefront: &Storefront) -> Result<(), CliError> {
    let status = storefront
        .api()
        .health()
        .await
        .map_err(|e| AppError::request("Backend is unreachable", e))?;
    output::health(&status);
    Ok(())
}
