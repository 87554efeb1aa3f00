use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for repository operations.
///
/// Each kind describes a category of failure so callers can match on the
/// condition rather than parse messages.
///
/// # Examples
///
/// ```rust,ignore
/// use repokit::errors::{ErrorKind, RepoError, RepoResult};
///
/// fn example() -> RepoResult<()> {
///     Err(RepoError::new("Model does not exist.", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A single-record lookup matched zero records.
    NotFound,
    /// A terminal method invoked by name does not exist or produced nothing.
    InvalidMethod,
    /// A resolved identifier produced an instance lacking the required capability.
    TypeMismatch,
    /// The construction service failed to produce an instance for an identifier.
    ResolutionError,
    /// A model handle could not be built.
    ConstructionError,
    /// Invalid arguments or data supplied to an operation.
    ValidationError,
    /// The operation is not valid in the current context.
    InvalidOperation,
    /// Error from the persistence collaborator.
    BackendError,
    /// Internal error (usually indicates a bug).
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidMethod => write!(f, "Invalid method"),
            ErrorKind::TypeMismatch => write!(f, "Type mismatch"),
            ErrorKind::ResolutionError => write!(f, "Resolution error"),
            ErrorKind::ConstructionError => write!(f, "Construction error"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for all fallible repository operations.
///
/// `RepoError` carries a message, a kind, and an optional cause. Causes form a
/// chain preserved for debugging; a backtrace is captured at construction.
///
/// # Examples
///
/// ```rust,ignore
/// use repokit::errors::{ErrorKind, RepoError};
///
/// let err = RepoError::new("users is not registered", ErrorKind::ResolutionError);
///
/// let cause = RepoError::new("users is not registered", ErrorKind::ResolutionError);
/// let err = RepoError::new_with_cause("Failed to construct model", ErrorKind::ConstructionError, cause);
/// ```
#[derive(Clone)]
pub struct RepoError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RepoError>>,
    backtrace: Atomic<Backtrace>,
}

impl RepoError {
    /// Creates a new `RepoError` with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RepoError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `RepoError` with a cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RepoError) -> Self {
        RepoError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RepoError> {
        self.cause.as_deref()
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // message plus either the cause chain or the captured backtrace
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for repository operations.
///
/// `RepoResult<T>` is shorthand for `Result<T, RepoError>`; every fallible
/// operation in this crate returns it.
pub type RepoResult<T> = Result<T, RepoError>;

impl From<String> for RepoError {
    fn from(msg: String) -> Self {
        RepoError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for RepoError {
    fn from(msg: &str) -> Self {
        RepoError::new(msg, ErrorKind::InternalError)
    }
}
