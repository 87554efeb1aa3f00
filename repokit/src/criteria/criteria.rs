use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use crate::errors::RepoResult;
use crate::model::Model;
use crate::repository::Repository;

/// Trait for implementing a single unit of query modification.
///
/// # Purpose
///
/// A `CriteriaProvider` transforms a model handle: given the repository's
/// current handle it returns a new one with additional predicate state. The
/// repository replays every registered criteria, in registration order,
/// against a freshly rebuilt handle on each read/write entry point.
///
/// # Contract
///
/// - `apply` is a pure transform of the handle. It must not execute terminal
///   operations (no fetch, no write); producers of results are terminators.
/// - The provider holds no cross-call state. Parameters captured at
///   registration time travel through the construction arguments, and a fresh
///   instance is built for every application.
/// - The repository reference is context only (for example to read
///   repository-level configuration); implementations must not mutate it.
pub trait CriteriaProvider: Send + Sync + Display {
    /// Transforms `model` and returns the modified handle.
    fn apply(&self, model: Model, repository: &Repository) -> RepoResult<Model>;
}

/// A clonable facade over a [`CriteriaProvider`].
///
/// Wraps the provider in an `Arc` trait object and exposes `apply` through
/// `Deref`, mirroring the other facades in the crate.
#[derive(Clone)]
pub struct Criteria {
    inner: Arc<dyn CriteriaProvider>,
}

impl Criteria {
    pub fn new<P: CriteriaProvider + 'static>(provider: P) -> Self {
        Criteria {
            inner: Arc::new(provider),
        }
    }
}

impl Deref for Criteria {
    type Target = Arc<dyn CriteriaProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Debug for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Criteria({})", self.inner)
    }
}
