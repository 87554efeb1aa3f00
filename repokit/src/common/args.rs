use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

use crate::common::Value;

/// Constructor arguments for criteria and terminator building.
///
/// Captured at `push_criteria` time and handed to the construction service on
/// every application, so a criteria's "memory" lives here rather than in the
/// instance. Supports positional arguments (plain instantiation) and named
/// arguments (container-style resolution); a builder is free to read either.
///
/// ```rust,ignore
/// use repokit::common::Args;
///
/// let args = Args::new().with("first_name").with("Wayne");
/// let named = Args::new().with_named("operator", "gte");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Args {
    positional: Vec<Value>,
    named: IndexMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Args {
            positional: Vec::new(),
            named: IndexMap::new(),
        }
    }

    /// Appends a positional argument.
    pub fn with<T: Into<Value>>(mut self, value: T) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named argument.
    pub fn with_named<T: Into<Value>>(mut self, name: &str, value: T) -> Self {
        self.named.insert(name.to_string(), value.into());
        self
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl Display for Args {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let positional = self.positional.iter().map(|v| format!("{:?}", v));
        let named = self.named.iter().map(|(k, v)| format!("{}: {:?}", k, v));
        write!(f, "({})", positional.chain(named).join(", "))
    }
}
