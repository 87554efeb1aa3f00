//! The query/model handle: the collaborator contract the repository drives.
//!
//! A [`Model`] represents "a queryable/persistable record type in its current
//! filter state". The repository owns one, rebuilds it before every
//! operation, and criteria transform it by appending predicates. The concrete
//! engine behind a handle is pluggable through [`ModelProvider`];
//! [`MemoryStore`] provides the in-memory implementation shipped with the
//! crate.

mod memory;
mod model;

pub use memory::*;
pub use model::*;
