//! CLI command modules

pub mod check;
pub mod info;
pub mod list;
pub mod validate;
