//! The repository: owner of query state and orchestrator of the criteria
//! pipeline.
//!
//! # Lifecycle
//!
//! A [`Repository`] is created with a construction service and a
//! configuration naming its model identifier. Every read/write entry point
//! rebuilds the model handle from scratch and replays the registered
//! criteria against it, so results always reflect a pristine base plus the
//! criteria in registration order, never residue from an earlier call.
//!
//! # Creating repositories
//!
//! ```rust,ignore
//! use repokit::registry::Registry;
//! use repokit::repository::Repository;
//! use repokit::repository_config::RepositoryConfig;
//!
//! let registry = Registry::new();
//! registry.register_model("users", move |_args| Ok(store.model()));
//!
//! let repository = Repository::new(registry, RepositoryConfig::new("users"), Vec::new())?;
//! ```

mod repository;

pub use repository::*;
