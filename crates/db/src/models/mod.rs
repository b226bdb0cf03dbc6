//! Database row structs.
//!
//! Each submodule contains a `FromRow` struct matching the table and a
//! conversion into the domain model from `depot_core`.

pub mod asset;
