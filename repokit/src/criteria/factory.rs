use std::sync::Arc;

use crate::common::Args;
use crate::criteria::{Criteria, Terminator};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::registry::{ConstructionService, Resolved};

/// Builds criteria and terminators from identifiers plus constructor
/// arguments.
///
/// # Purpose
///
/// `CriteriaFactory` sits between the repository and the construction
/// service: it resolves an identifier and validates that the produced
/// instance exposes the demanded capability. A resolution that yields the
/// wrong capability (asking for a criteria and getting a terminator or a
/// model, or the other way around) fails with `TypeMismatch` carrying the
/// identifier.
///
/// The factory never caches: every build constructs a fresh instance, so the
/// same identifier can be registered with different arguments across calls.
#[derive(Clone)]
pub struct CriteriaFactory {
    service: Arc<dyn ConstructionService>,
}

impl CriteriaFactory {
    pub fn new(service: Arc<dyn ConstructionService>) -> Self {
        CriteriaFactory { service }
    }

    /// Builds a criteria instance for `identifier`.
    ///
    /// # Errors
    ///
    /// - `ResolutionError` when the identifier cannot be resolved.
    /// - `TypeMismatch` when the resolved instance is not a criteria.
    pub fn build_criteria(&self, identifier: &str, args: &Args) -> RepoResult<Criteria> {
        match self.service.resolve(identifier, args)? {
            Resolved::Criteria(criteria) => Ok(criteria),
            other => {
                log::error!(
                    "Identifier {} resolved to a {} where a criteria was required",
                    identifier,
                    other.kind_name()
                );
                Err(RepoError::new(
                    &format!("{} does not resolve to a criteria", identifier),
                    ErrorKind::TypeMismatch,
                ))
            }
        }
    }

    /// Builds a terminator instance for `identifier`.
    ///
    /// # Errors
    ///
    /// - `ResolutionError` when the identifier cannot be resolved.
    /// - `TypeMismatch` when the resolved instance is not a terminator.
    pub fn build_terminator(&self, identifier: &str, args: &Args) -> RepoResult<Terminator> {
        match self.service.resolve(identifier, args)? {
            Resolved::Terminator(terminator) => Ok(terminator),
            other => {
                log::error!(
                    "Identifier {} resolved to a {} where a terminator was required",
                    identifier,
                    other.kind_name()
                );
                Err(RepoError::new(
                    &format!("{} does not resolve to a terminator", identifier),
                    ErrorKind::TypeMismatch,
                ))
            }
        }
    }
}
