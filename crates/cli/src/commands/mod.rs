//! Command implementations.

pub mod account;
pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod restaurants;

use food_delivery_storefront::api::UserProfile;
use food_delivery_storefront::{AppError, Storefront};

/// The signed-in user, or `NotAuthenticated`.
fn require_login(storefront: &Storefront) -> Result<UserProfile, AppError> {
    storefront
        .session()
        .current_user()
        .ok_or(AppError::NotAuthenticated)
}
