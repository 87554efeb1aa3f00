//! The construction service: resolving identifiers into criteria,
//! terminators, and model handles.
//!
//! The original shape of this concern is dynamic class-name construction;
//! here it is a registry of typed factory functions behind the
//! [`ConstructionService`] trait, so construction stays pluggable (swap the
//! service) while registration stays validated (a builder can only produce a
//! [`Resolved`] variant). There is no ambient/global resolution; the service
//! is handed to each repository explicitly.

use dashmap::DashMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::common::Args;
use crate::criteria::{Criteria, Terminator};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::model::Model;

/// What a registered builder can produce.
#[derive(Clone)]
pub enum Resolved {
    Criteria(Criteria),
    Terminator(Terminator),
    Model(Model),
}

impl Resolved {
    /// Short capability name, used in mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Resolved::Criteria(_) => "criteria",
            Resolved::Terminator(_) => "terminator",
            Resolved::Model(_) => "model",
        }
    }
}

impl Display for Resolved {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolved::Criteria(c) => write!(f, "criteria {}", c),
            Resolved::Terminator(t) => write!(f, "terminator {}", t),
            Resolved::Model(m) => write!(f, "model {}", m),
        }
    }
}

impl Debug for Resolved {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// The object-construction collaborator.
///
/// Given an identifier and constructor arguments, produces a fresh instance.
/// Supports whatever construction strategy the implementation chooses:
/// the shipped [`Registry`] calls plain factory functions with positional
/// and/or named arguments; a container-backed implementation would resolve
/// shared dependencies the same way.
///
/// # Errors
///
/// `resolve` fails with `ResolutionError` when no instance can be produced
/// for the identifier.
pub trait ConstructionService: Send + Sync {
    fn resolve(&self, identifier: &str, args: &Args) -> RepoResult<Resolved>;
}

type BuilderFn = Arc<dyn Fn(&Args) -> RepoResult<Resolved> + Send + Sync>;

/// The shipped [`ConstructionService`]: a concurrent map of identifier →
/// factory function.
///
/// # Characteristics
///
/// - **Shared**: clones share the same builder table, so repositories created
///   from the same registry (including via `new_instance`) resolve the same
///   identifiers.
/// - **Fresh construction**: builders run on every resolve; nothing is
///   cached, so the same identifier can be registered once and applied with
///   different arguments across calls.
///
/// # Usage
///
/// ```rust,ignore
/// use repokit::registry::Registry;
///
/// let registry = Registry::new();
/// registry.register_model("users", move |_args| Ok(store.model()));
/// registry.register_criteria("where", |args| {
///     Ok(Criteria::new(FieldCriteria::from_args(args)?))
/// });
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    builders: DashMap<String, BuilderFn>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            inner: Arc::new(RegistryInner {
                builders: DashMap::new(),
            }),
        }
    }

    /// Registers a criteria builder under `identifier`.
    pub fn register_criteria<F>(&self, identifier: &str, builder: F) -> &Self
    where
        F: Fn(&Args) -> RepoResult<Criteria> + Send + Sync + 'static,
    {
        self.inner.builders.insert(
            identifier.to_string(),
            Arc::new(move |args| Ok(Resolved::Criteria(builder(args)?))),
        );
        self
    }

    /// Registers a terminator builder under `identifier`.
    pub fn register_terminator<F>(&self, identifier: &str, builder: F) -> &Self
    where
        F: Fn(&Args) -> RepoResult<Terminator> + Send + Sync + 'static,
    {
        self.inner.builders.insert(
            identifier.to_string(),
            Arc::new(move |args| Ok(Resolved::Terminator(builder(args)?))),
        );
        self
    }

    /// Registers a model builder under `identifier`.
    pub fn register_model<F>(&self, identifier: &str, builder: F) -> &Self
    where
        F: Fn(&Args) -> RepoResult<Model> + Send + Sync + 'static,
    {
        self.inner.builders.insert(
            identifier.to_string(),
            Arc::new(move |args| Ok(Resolved::Model(builder(args)?))),
        );
        self
    }

    pub fn is_registered(&self, identifier: &str) -> bool {
        self.inner.builders.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.inner.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.builders.is_empty()
    }
}

impl ConstructionService for Registry {
    fn resolve(&self, identifier: &str, args: &Args) -> RepoResult<Resolved> {
        let builder = match self.inner.builders.get(identifier) {
            Some(entry) => entry.value().clone(),
            None => {
                log::error!("No builder registered for identifier {}", identifier);
                return Err(RepoError::new(
                    &format!("{} is not registered", identifier),
                    ErrorKind::ResolutionError,
                ));
            }
        };
        builder(args)
    }
}
