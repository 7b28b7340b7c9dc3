//! Configuration loading and schema definitions
//!
//! Map policy shared by every engine crate.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
