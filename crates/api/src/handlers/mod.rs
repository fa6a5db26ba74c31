pub mod admin_filter;
pub mod change_types;
pub mod changes;
pub mod feeds;
