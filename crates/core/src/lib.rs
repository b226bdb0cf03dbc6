//! Domain logic for the hierarchical asset store.
//!
//! Everything here is storage-agnostic: the relational row store and the
//! blob backend are reached through the traits in [`assets::repository`]
//! and [`assets::blob`], implemented by the `depot-db` and `depot-storage`
//! crates.

pub mod assets;
pub mod error;
pub mod types;
