//! Food Delivery Core - Shared domain types.
//!
//! This crate provides the types used across the food delivery components:
//! - `storefront` - REST client, session/cart stores and checkout flow
//! - `cli` - Terminal storefront driving the library
//!
//! # Architecture
//!
//! The core crate contains only types and pure bookkeeping - no I/O, no HTTP
//! clients, no storage. This keeps the cart and order rules testable in
//! isolation and usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, phones and statuses
//! - [`cart`] - Line items and the cart model with its quantity rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, LineItem, NewLineItem};
pub use types::*;
