use indexmap::IndexMap;

use crate::common::Value;
use crate::errors::{ErrorKind, RepoError, RepoResult};

/// An ordered field map used for create and update payloads.
pub type Fields = IndexMap<String, Value>;

/// Builds a [`Fields`] map from `"field": value` pairs.
///
/// ```rust,ignore
/// use repokit::fields;
///
/// let data = fields! {
///     "first_name": "Wayne",
///     "age": 30,
/// };
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::common::Fields::new()
    };

    ($($key:tt : $value:expr),* $(,)?) => {{
        let mut map = $crate::common::Fields::new();
        $(
            map.insert($key.to_string(), $crate::common::Value::from($value));
        )*
        map
    }};
}

/// A single persisted (or to-be-persisted) record.
///
/// `Record` is the unit the model handle traffics in: an ordered attribute
/// map plus a snapshot of the attributes as last seen in storage. The
/// snapshot is what makes the dirty check work: a record is dirty when its
/// attributes differ from the snapshot, and a bulk assignment that changes
/// nothing leaves the record clean.
///
/// # Usage
///
/// ```rust,ignore
/// use repokit::common::Record;
///
/// let mut record = Record::new();
/// record.put("first_name", "Wayne")?;
/// assert!(record.is_dirty());
/// record.sync_original();
/// assert!(!record.is_dirty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Record {
    attributes: Fields,
    original: Fields,
}

impl Record {
    pub fn new() -> Self {
        Record {
            attributes: Fields::new(),
            original: Fields::new(),
        }
    }

    /// Creates a record from a plain field map; the record starts dirty
    /// (nothing has been persisted yet).
    pub fn from_fields(fields: Fields) -> Self {
        Record {
            attributes: fields,
            original: Fields::new(),
        }
    }

    /// Sets a single attribute.
    ///
    /// # Errors
    ///
    /// Fails with `ValidationError` if the field name is empty.
    pub fn put<T: Into<Value>>(&mut self, field: &str, value: T) -> RepoResult<()> {
        if field.is_empty() {
            log::error!("Field name cannot be empty");
            return Err(RepoError::new(
                "Field name cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        self.attributes.insert(field.to_string(), value.into());
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Bulk-assigns every entry of `data` onto this record's attributes.
    pub fn fill(&mut self, data: &Fields) {
        for (field, value) in data {
            self.attributes.insert(field.clone(), value.clone());
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.attributes
    }

    /// True when the attributes differ from the last synced snapshot.
    pub fn is_dirty(&self) -> bool {
        self.attributes != self.original
    }

    /// Snapshots the current attributes as the persisted state.
    pub fn sync_original(&mut self) {
        self.original = self.attributes.clone();
    }

    /// Projects the record to a column subset. An empty column list keeps
    /// every column. The projected record is returned clean.
    pub fn project(&self, columns: &[&str]) -> Record {
        if columns.is_empty() {
            let mut record = self.clone();
            record.sync_original();
            return record;
        }

        let mut attributes = Fields::new();
        for column in columns {
            if let Some(value) = self.attributes.get(*column) {
                attributes.insert((*column).to_string(), value.clone());
            }
        }
        let mut record = Record {
            attributes,
            original: Fields::new(),
        };
        record.sync_original();
        record
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
