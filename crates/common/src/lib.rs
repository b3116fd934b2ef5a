//! Types and helpers shared by the catalog crates.

pub mod types;
pub mod utils;
