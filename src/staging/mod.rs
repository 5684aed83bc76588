//! Staged award data ingestion.
//!
//! The staging area is the engine's only input: YAML exports of the six
//! staging tables, one directory per award. This module loads and
//! column-validates them; compilation and calculation read the result
//! through the staging store.

pub mod loader;
pub mod schema;

pub use loader::StagingLoader;
pub use schema::TableSchema;
