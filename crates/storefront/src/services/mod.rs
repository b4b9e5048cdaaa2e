//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password sign-up and sign-in
//! - `cart` - Cart line manipulation
//! - `checkout` - Price calculation and order preparation

pub mod auth;
pub mod cart;
pub mod checkout;
