//! Food Delivery Storefront library.
//!
//! The client side of the food delivery service: a REST client for the
//! backend, the session and cart stores built on it, the checkout flow and
//! the page-level views. Surfaces (the `food` CLI, tests) drive it through
//! a [`Storefront`].
//!
//! # Modules
//!
//! - [`api`] - HTTP client, wire types and endpoint groups
//! - [`session`] - Login state, token persistence and forced logout
//! - [`cart`] - Server-synced cart with optimistic updates
//! - [`checkout`] - Four-step checkout wizard
//! - [`views`] - Restaurants, orders, addresses and profile pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod validation;
pub mod views;

pub use cart::CartStore;
pub use checkout::{AddressChoice, CheckoutFlow, CheckoutStep, DeliveryDetails};
pub use config::StorefrontConfig;
pub use error::{AppError, AuthFailure};
pub use session::{SessionEvent, SessionState, SessionStore};
pub use state::Storefront;
