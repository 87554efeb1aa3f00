use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use crate::common::{Fields, Page, Record, Value};
use crate::errors::{ErrorKind, RepoError, RepoResult};

/// Comparison operator for a single field predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    /// Parses an operator from its text form (`"eq"`, `"ne"`, `"gt"`,
    /// `"gte"`, `"lt"`, `"lte"`).
    ///
    /// # Errors
    ///
    /// Fails with `ValidationError` for an unknown operator name.
    pub fn parse(text: &str) -> RepoResult<Operator> {
        match text {
            "eq" => Ok(Operator::Eq),
            "ne" => Ok(Operator::Ne),
            "gt" => Ok(Operator::Gt),
            "gte" => Ok(Operator::Gte),
            "lt" => Ok(Operator::Lt),
            "lte" => Ok(Operator::Lte),
            other => {
                log::error!("Unknown operator {}", other);
                Err(RepoError::new(
                    &format!("Unknown operator {}", other),
                    ErrorKind::ValidationError,
                ))
            }
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Eq => write!(f, "="),
            Operator::Ne => write!(f, "!="),
            Operator::Gt => write!(f, ">"),
            Operator::Gte => write!(f, ">="),
            Operator::Lt => write!(f, "<"),
            Operator::Lte => write!(f, "<="),
        }
    }
}

/// The result of invoking a terminal method by name on a model handle.
///
/// Different terminal methods produce differently shaped data: `first`
/// yields a single record, `get` a collection, `count` a number.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutcome {
    Record(Record),
    Collection(Vec<Record>),
    Count(u64),
}

impl QueryOutcome {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            QueryOutcome::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Record]> {
        match self {
            QueryOutcome::Collection(records) => Some(records),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            QueryOutcome::Count(count) => Some(*count),
            _ => None,
        }
    }
}

/// The collaborator contract for a queryable/persistable record type.
///
/// # Purpose
///
/// A `ModelProvider` is the persistence engine's view of one record type in a
/// given filter state. The repository never talks to storage directly; it
/// composes predicates through `filter` and ends the chain with one of the
/// terminal operations. Implementations wrap whatever the engine is: the
/// crate ships an in-memory one, an adapter over a SQL builder would be
/// another.
///
/// # Characteristics
///
/// - **Immutable handles**: `filter` returns a NEW handle with the predicate
///   appended and must not mutate the receiver. This is what lets the
///   repository discard and rebuild state without residue.
/// - **Thread-safe**: `Send + Sync` so handles can be shared behind `Arc`.
/// - **Displayable**: handles describe themselves for logging.
pub trait ModelProvider: Send + Sync + Display {
    /// Returns a new handle with `field <op> value` appended to the
    /// predicate state.
    fn filter(&self, field: &str, operator: Operator, value: Value) -> RepoResult<Model>;

    /// Fetches all records matching the current predicate state, projected
    /// to `columns` (empty slice keeps every column).
    fn fetch_all(&self, columns: &[&str]) -> RepoResult<Vec<Record>>;

    /// Fetches the first record matching the current predicate state.
    fn fetch_first(&self, columns: &[&str]) -> RepoResult<Option<Record>>;

    /// Persists a new record built from `fields` and returns it as stored
    /// (with any engine-assigned key).
    fn create(&self, fields: &Fields) -> RepoResult<Record>;

    /// Bulk-updates every record matching the current predicate state.
    /// Returns the number of affected records.
    fn update(&self, fields: &Fields) -> RepoResult<u64>;

    /// Deletes every record matching the current predicate state. Returns
    /// true when at least one record was removed.
    fn delete(&self) -> RepoResult<bool>;

    /// Returns one page of matching records plus pagination metadata.
    fn paginate(
        &self,
        per_page: u64,
        columns: &[&str],
        page_name: &str,
        page: Option<u64>,
    ) -> RepoResult<Page>;

    /// Invokes a terminal method by name, the escape hatch for builder
    /// methods not otherwise exposed.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidMethod` when the method is unknown to this handle.
    /// A known method that produces nothing returns `Ok(None)`.
    fn call(&self, method: &str, columns: &[&str]) -> RepoResult<Option<QueryOutcome>>;

    /// The primary-key field name of the underlying record type.
    fn key_name(&self) -> String;
}

/// A clonable facade over a [`ModelProvider`].
///
/// Wraps the provider in an `Arc` trait object and exposes its operations
/// through `Deref`, so a `Model` is cheap to clone and hand around while the
/// concrete engine stays hidden.
#[derive(Clone)]
pub struct Model {
    inner: Arc<dyn ModelProvider>,
}

impl Model {
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        Model {
            inner: Arc::new(provider),
        }
    }

    /// True when both facades wrap the same provider instance. Used to
    /// verify that a flush really produced an independent handle.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for Model {
    type Target = Arc<dyn ModelProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Debug for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model({})", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullModel;

    impl Display for NullModel {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "null model")
        }
    }

    impl ModelProvider for NullModel {
        fn filter(&self, _field: &str, _operator: Operator, _value: Value) -> RepoResult<Model> {
            Ok(Model::new(NullModel))
        }

        fn fetch_all(&self, _columns: &[&str]) -> RepoResult<Vec<Record>> {
            Ok(Vec::new())
        }

        fn fetch_first(&self, _columns: &[&str]) -> RepoResult<Option<Record>> {
            Ok(None)
        }

        fn create(&self, _fields: &Fields) -> RepoResult<Record> {
            Ok(Record::new())
        }

        fn update(&self, _fields: &Fields) -> RepoResult<u64> {
            Ok(0)
        }

        fn delete(&self) -> RepoResult<bool> {
            Ok(false)
        }

        fn paginate(
            &self,
            per_page: u64,
            _columns: &[&str],
            page_name: &str,
            page: Option<u64>,
        ) -> RepoResult<Page> {
            Ok(Page::new(Vec::new(), 0, per_page, page.unwrap_or(1), page_name))
        }

        fn call(&self, _method: &str, _columns: &[&str]) -> RepoResult<Option<QueryOutcome>> {
            Ok(None)
        }

        fn key_name(&self) -> String {
            "id".to_string()
        }
    }

    #[test]
    fn facade_delegates_through_deref() {
        let model = Model::new(NullModel);
        assert_eq!(model.key_name(), "id");
        assert!(model.fetch_all(&[]).unwrap().is_empty());
    }

    #[test]
    fn ptr_eq_distinguishes_instances() {
        let a = Model::new(NullModel);
        let b = Model::new(NullModel);
        let c = a.clone();
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&c));
    }

    #[test]
    fn operator_parse_round_trip() {
        assert_eq!(Operator::parse("eq").unwrap(), Operator::Eq);
        assert_eq!(Operator::parse("gte").unwrap(), Operator::Gte);
        let err = Operator::parse("between").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn outcome_accessors_match_variants() {
        let outcome = QueryOutcome::Count(3);
        assert_eq!(outcome.as_count(), Some(3));
        assert!(outcome.as_record().is_none());
        assert!(outcome.as_collection().is_none());
    }
}
