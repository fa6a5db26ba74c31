//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod change_repo;
pub mod change_type_repo;
pub mod content_type_repo;
pub mod site_repo;
pub mod user_repo;

pub use change_repo::ChangeRepo;
pub use change_type_repo::ChangeTypeRepo;
pub use content_type_repo::ContentTypeRepo;
pub use site_repo::SiteRepo;
pub use user_repo::UserRepo;
