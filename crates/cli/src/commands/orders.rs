//! Order history commands.

use food_delivery_core::OrderId;
use food_delivery_storefront::views::{OrderDetail, OrderListing};
use food_delivery_storefront::Storefront;

use super::require_login;
use crate::error::CliError;
use crate::output;

/// # Errors
///
/// Returns `NotAuthenticated` or the fetch error.
pub async fn list(storefront: &Storefront) -> Result<(), CliError> {
    require_login(storefront)?;
    let mut listing = OrderListing::new();
    listing.load(storefront.api()).await?;
    output::orders(listing.orders());
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated` or the fetch error.
pub async fn show(storefront: &Storefront, id: OrderId) -> Result<(), CliError> {
    let detail = loaded(storefront, id).await?;
    output::order(&detail);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated`, an order that can no longer be cancelled, or
/// the backend error.
pub async fn cancel(storefront: &Storefront, id: OrderId) -> Result<(), CliError> {
    let mut detail = loaded(storefront, id).await?;
    detail.cancel(storefront.api()).await?;

    output::notice(&format!("Order #{id} cancelled."));
    output::order(&detail);
    Ok(())
}

async fn loaded(storefront: &Storefront, id: OrderId) -> Result<OrderDetail, CliError> {
    require_login(storefront)?;
    let mut detail = OrderDetail::new(id);
    detail.load(storefront.api()).await?;
    Ok(detail)
}
