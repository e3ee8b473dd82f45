//! Restaurant browsing.

use food_delivery_core::RestaurantId;
use food_delivery_storefront::api::{RestaurantQuery, RestaurantSort};
use food_delivery_storefront::views::{RestaurantDetail, RestaurantListing};
use food_delivery_storefront::{AppError, Storefront};

use crate::error::CliError;
use crate::output;

/// List restaurants. Falls back to the demo restaurants when the backend
/// cannot be reached, so this never fails.
pub async fn list(
    storefront: &Storefront,
    search: Option<String>,
    cuisine: Option<String>,
    sort: Option<RestaurantSort>,
    page: u32,
) {
    let mut listing = RestaurantListing::new(RestaurantQuery {
        search,
        cuisine,
        sort,
        page,
        ..RestaurantQuery::default()
    });
    listing.load(storefront.api()).await;
    output::restaurant_listing(&listing);
}

/// # Errors
///
/// Returns an error if the restaurant cannot be loaded.
pub async fn show(storefront: &Storefront, id: RestaurantId) -> Result<(), CliError> {
    let mut detail = RestaurantDetail::new(id);
    detail.load(storefront.api()).await?;
    output::restaurant_detail(&detail);
    Ok(())
}

/// # Errors
///
/// Returns an error if the reviews cannot be loaded.
pub async fn reviews(storefront: &Storefront, id: RestaurantId) -> Result<(), CliError> {
    let reviews = storefront
        .api()
        .reviews(id)
        .await
        .map_err(|e| AppError::request("Failed to load reviews", e))?;
    output::reviews(&reviews);
    Ok(())
}

/// # Errors
///
/// Returns `NotAuthenticated`, a rating outside 1 to 5, or the backend error.
pub async fn review(
    storefront: &Storefront,
    id: RestaurantId,
    rating: u8,
    comment: &str,
) -> Result<(), CliError> {
    super::require_login(storefront)?;
    let mut detail = RestaurantDetail::new(id);
    detail.add_review(storefront.api(), rating, comment).await?;

    output::notice("Thanks for your review!");
    output::reviews(detail.reviews());
    Ok(())
}
