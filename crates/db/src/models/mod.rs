//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO for edits

pub mod change;
pub mod change_type;
pub mod content_type;
pub mod site;
pub mod user;
