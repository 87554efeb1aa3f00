use std::fmt::{Display, Formatter};

use crate::common::{Args, Value};
use crate::criteria::{CriteriaProvider, TerminatorProvider};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::model::{Model, Operator, QueryOutcome};
use crate::repository::Repository;

fn text_arg(args: &Args, index: usize, what: &str) -> RepoResult<String> {
    match args.positional(index).and_then(|v| v.as_text()) {
        Some(text) => Ok(text.to_string()),
        None => {
            log::error!("Missing or non-text argument {} ({})", index, what);
            Err(RepoError::new(
                &format!("Argument {} must be a {}", index, what),
                ErrorKind::ValidationError,
            ))
        }
    }
}

fn value_arg(args: &Args, index: usize) -> RepoResult<Value> {
    match args.positional(index) {
        Some(value) => Ok(value.clone()),
        None => {
            log::error!("Missing value argument {}", index);
            Err(RepoError::new(
                &format!("Argument {} must be a value", index),
                ErrorKind::ValidationError,
            ))
        }
    }
}

/// A criteria constraining a single field against a value.
///
/// The workhorse criteria: appends one `field <op> value` predicate to the
/// handle. Built positionally from `(field, value)` with an optional named
/// `operator` argument (defaults to equality).
#[derive(Debug)]
pub struct FieldCriteria {
    field: String,
    operator: Operator,
    value: Value,
}

impl FieldCriteria {
    pub fn new(field: &str, operator: Operator, value: Value) -> Self {
        FieldCriteria {
            field: field.to_string(),
            operator,
            value,
        }
    }

    /// Builds the criteria from constructor arguments: positional `field`
    /// and `value`, optional named `operator` in text form.
    ///
    /// # Errors
    ///
    /// Fails with `ValidationError` when arguments are missing or ill-typed.
    pub fn from_args(args: &Args) -> RepoResult<Self> {
        let field = text_arg(args, 0, "field name")?;
        let value = value_arg(args, 1)?;
        let operator = match args.named("operator") {
            Some(op) => {
                let text = op.as_text().ok_or_else(|| {
                    log::error!("The operator argument must be text, got {:?}", op);
                    RepoError::new(
                        "The operator argument must be text",
                        ErrorKind::ValidationError,
                    )
                })?;
                Operator::parse(text)?
            }
            None => Operator::Eq,
        };
        Ok(FieldCriteria {
            field,
            operator,
            value,
        })
    }
}

impl Display for FieldCriteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "where {} {} {:?}", self.field, self.operator, self.value)
    }
}

impl CriteriaProvider for FieldCriteria {
    fn apply(&self, model: Model, _repository: &Repository) -> RepoResult<Model> {
        model.filter(&self.field, self.operator, self.value.clone())
    }
}

/// A terminator fetching the first record of the handle's current state.
#[derive(Debug)]
pub struct FirstTerminator;

impl Display for FirstTerminator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "first")
    }
}

impl TerminatorProvider for FirstTerminator {
    fn apply(&self, model: Model, _repository: &Repository) -> RepoResult<Option<QueryOutcome>> {
        Ok(model.fetch_first(&[])?.map(QueryOutcome::Record))
    }
}

/// A terminator fetching the first record where a field equals a value.
///
/// Built positionally from `(field, value)`.
#[derive(Debug)]
pub struct FieldTerminator {
    field: String,
    value: Value,
}

impl FieldTerminator {
    pub fn new(field: &str, value: Value) -> Self {
        FieldTerminator {
            field: field.to_string(),
            value,
        }
    }

    pub fn from_args(args: &Args) -> RepoResult<Self> {
        let field = text_arg(args, 0, "field name")?;
        let value = value_arg(args, 1)?;
        Ok(FieldTerminator { field, value })
    }
}

impl Display for FieldTerminator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "first where {} = {:?}", self.field, self.value)
    }
}

impl TerminatorProvider for FieldTerminator {
    fn apply(&self, model: Model, _repository: &Repository) -> RepoResult<Option<QueryOutcome>> {
        let filtered = model.filter(&self.field, Operator::Eq, self.value.clone())?;
        Ok(filtered.fetch_first(&[])?.map(QueryOutcome::Record))
    }
}
