//! Wishmark Core - Shared types library.
//!
//! This crate provides the common vocabulary types used by the storefront:
//! type-safe entity IDs, validated email addresses, and star ratings.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and ratings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
