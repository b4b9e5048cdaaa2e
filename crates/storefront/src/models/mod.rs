//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`] and the input schemas in [`boutique_core::validation`].

pub mod cart;
pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod user;

pub use cart::Cart;
pub use order::{Order, OrderItem};
pub use product::{Page, Product};
pub use review::Review;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Role, User};
