//! # Repokit - Criteria-Driven Repositories
//!
//! Repokit is a generic data-access layer: repositories that accumulate
//! composable query criteria and replay them against a freshly built
//! query/model handle on every operation. Persistence itself is pluggable:
//! the crate coordinates, a collaborator stores.
//!
//! ## Key Features
//!
//! - **Criteria pipeline**: register query modifiers once, have them applied
//!   in order on every read/write
//! - **Deterministic replay**: the handle is rebuilt before every operation,
//!   so no filter state ever leaks between calls
//! - **One-off overrides**: skip the pipeline, apply a single-shot criteria,
//!   or dispatch a terminator that bypasses it entirely
//! - **Pluggable construction**: criteria, terminators, and models resolve
//!   through a registry of typed factory functions
//! - **Pluggable persistence**: any engine can sit behind the model handle
//!   contract; an in-memory store ships with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use repokit::criteria::{Criteria, FieldCriteria};
//! use repokit::fields;
//! use repokit::model::MemoryStore;
//! use repokit::registry::Registry;
//! use repokit::repository::Repository;
//! use repokit::repository_config::RepositoryConfig;
//!
//! # fn main() -> repokit::errors::RepoResult<()> {
//! let store = MemoryStore::new("id");
//! store.insert(&fields! { "first_name": "Wayne" });
//!
//! let registry = Registry::new();
//! let handle = store.clone();
//! registry.register_model("users", move |_args| Ok(handle.model()));
//! registry.register_criteria("where", |args| {
//!     Ok(Criteria::new(FieldCriteria::from_args(args)?))
//! });
//!
//! let repository = Repository::new(registry, RepositoryConfig::new("users"), Vec::new())?;
//! let records = repository.find_all(&[])?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Pattern
//!
//! The crate leans on clonable facades over `Arc` trait objects
//! ([`model::Model`], [`criteria::Criteria`], [`criteria::Terminator`]):
//! implementations stay hidden, handles are cheap to clone, and the
//! repository can swap its stored handle wholesale, which is exactly what
//! the flush-before-use discipline requires.
//!
//! ## Module Organization
//!
//! - [`common`] - Values, records, constructor arguments, pagination results
//! - [`criteria`] - Criteria and terminator contracts, stock implementations,
//!   and the criteria factory
//! - [`errors`] - Error types and result definitions
//! - [`model`] - The query/model handle contract and the in-memory store
//! - [`registry`] - The construction service and the identifier registry
//! - [`repository`] - The repository orchestrator
//! - [`repository_config`] - Repository-level configuration

pub mod common;
pub mod criteria;
pub mod errors;
pub mod model;
pub mod registry;
pub mod repository;
pub mod repository_config;
