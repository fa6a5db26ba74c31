//! Domain types, validation rules, and the content type registry for the
//! correx change log.
//!
//! This crate has no database or HTTP dependencies; everything here is pure
//! and unit-tested in place.

pub mod change_types;
pub mod changes;
pub mod content_types;
pub mod error;
pub mod types;
