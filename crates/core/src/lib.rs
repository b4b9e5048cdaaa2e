//! Boutique Core - Shared types, validation schemas and formatting.
//!
//! This crate is used by every Boutique component:
//! - `storefront` - Public-facing shop, checkout and account pages
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate holds no I/O: no database access, no HTTP, no clock reads.
//! Everything here is a pure function or a plain data type, so it can be used
//! from request handlers, the seed script and tests alike.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, currencies, locales and payment methods
//! - [`validation`] - Declarative schemas for every form and API payload
//! - [`format`] - Locale-aware rendering of amounts, dates, ids and queries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod format;
pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldError, Validated, ValidationFailure};
