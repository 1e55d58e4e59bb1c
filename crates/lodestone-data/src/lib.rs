//! Data-driven block catalogs for Lodestone.
//!
//! Reads block type definitions and signal tuning from RON, TOML or JSON
//! files and resolves them into a [`lodestone_core::registry::TypeCatalog`]
//! with [`lodestone_signal`] behaviors attached.

pub mod catalog;
pub mod loader;
pub mod schema;

#[cfg(test)]
mod test_dir;

pub use catalog::{BlockSet, build_catalog, load_block_set};
pub use loader::DataLoadError;
