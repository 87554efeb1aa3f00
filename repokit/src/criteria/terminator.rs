use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use crate::errors::RepoResult;
use crate::model::{Model, QueryOutcome};
use crate::repository::Repository;

/// Trait for implementing a query-ending transform.
///
/// A `TerminatorProvider` has the same construction discipline as a criteria
/// provider but the opposite contract on execution: its `apply` is expected
/// to run a terminal operation against the handle and return concrete data:
/// a single record, a collection, or nothing. Terminators are dispatched
/// one-off against the repository's current raw handle and deliberately
/// bypass the registered criteria pipeline; they leave the registered
/// criteria untouched.
pub trait TerminatorProvider: Send + Sync + Display {
    /// Executes against `model` and returns the produced data, if any.
    fn apply(&self, model: Model, repository: &Repository) -> RepoResult<Option<QueryOutcome>>;
}

/// A clonable facade over a [`TerminatorProvider`].
#[derive(Clone)]
pub struct Terminator {
    inner: Arc<dyn TerminatorProvider>,
}

impl Terminator {
    pub fn new<P: TerminatorProvider + 'static>(provider: P) -> Self {
        Terminator {
            inner: Arc::new(provider),
        }
    }
}

impl Deref for Terminator {
    type Target = Arc<dyn TerminatorProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for Terminator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Debug for Terminator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Terminator({})", self.inner)
    }
}
