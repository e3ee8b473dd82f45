//! Cart commands.

use food_delivery_core::{MenuItemId, RestaurantId};
use food_delivery_storefront::views::RestaurantDetail;
use food_delivery_storefront::Storefront;

use super::require_login;
use crate::error::CliError;
use crate::output;

/// # Errors
///
/// Returns `NotAuthenticated` or the fetch error.
pub async fn show(storefront: &Storefront) -> Result<(), CliError> {
    require_login(storefront)?;
    storefront.cart().refresh().await?;
    output::cart(&storefront.cart().snapshot());
    Ok(())
}

/// Add one unit of a dish from a restaurant's menu.
///
/// # Errors
///
/// Returns `NotAuthenticated`, an unknown or unavailable dish, or the
/// backend error.
pub async fn add(
    storefront: &Storefront,
    restaurant: RestaurantId,
    item: MenuItemId,
) -> Result<(), CliError> {
    require_login(storefront)?;
    let mut detail = RestaurantDetail::new(restaurant);
    detail.load(storefront.api()).await?;
    detail.add_to_cart(storefront.cart(), item).await?;

    finish(storefront);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated` or the backend error.
pub async fn set(storefront: &Storefront, item: MenuItemId, quantity: i64) -> Result<(), CliError> {
    require_login(storefront)?;
    storefront.cart().set_quantity(item, quantity).await?;
    finish(storefront);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated` or the backend error.
pub async fn remove(storefront: &Storefront, item: MenuItemId) -> Result<(), CliError> {
    require_login(storefront)?;
    storefront.cart().remove(item).await?;
    finish(storefront);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated` or the backend error.
pub async fn clear(storefront: &Storefront) -> Result<(), CliError> {
    require_login(storefront)?;
    storefront.cart().clear().await?;
    finish(storefront);
    Ok(())
}

/// Show the cart after a change, with any reconciliation warning.
fn finish(storefront: &Storefront) {
    if let Some(error) = storefront.cart().last_error() {
        output::banner(&error);
    }
    output::cart(&storefront.cart().snapshot());
}
