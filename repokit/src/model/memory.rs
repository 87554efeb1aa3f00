use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::common::{atomic, Atomic, Fields, Page, ReadExecutor, Record, Value, WriteExecutor};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::model::{Model, ModelProvider, Operator, QueryOutcome};

/// An in-memory persistence collaborator.
///
/// # Purpose
///
/// `MemoryStore` is a complete in-memory backing table suitable for tests and
/// for exercising the repository layer without an external engine. All data
/// lives in a shared, clonable table; every `Model` handle obtained from the
/// same store sees the same rows.
///
/// # Characteristics
///
/// - **Shared**: clones share the same underlying table
/// - **Auto-increment keys**: records without a key value get one assigned
/// - **No persistence**: data is gone when the last handle is dropped
///
/// # Usage
///
/// ```rust,ignore
/// use repokit::model::MemoryStore;
///
/// let store = MemoryStore::new("id");
/// store.insert(&fields! { "first_name": "Wayne" });
/// let model = store.model();
/// let rows = model.fetch_all(&[])?;
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

struct MemoryStoreInner {
    key_name: String,
    rows: Atomic<Vec<Record>>,
    next_key: Atomic<i64>,
}

impl MemoryStore {
    /// Creates an empty store whose records are keyed by `key_name`.
    pub fn new(key_name: &str) -> Self {
        MemoryStore {
            inner: Arc::new(MemoryStoreInner {
                key_name: key_name.to_string(),
                rows: atomic(Vec::new()),
                next_key: atomic(1),
            }),
        }
    }

    /// Returns a fresh, unfiltered model handle over this store.
    pub fn model(&self) -> Model {
        Model::new(MemoryModel {
            store: self.clone(),
            predicates: Vec::new(),
        })
    }

    /// Inserts a record built from `fields`, assigning a key when none is
    /// present, and returns it as stored.
    pub fn insert(&self, fields: &Fields) -> Record {
        let mut record = Record::from_fields(fields.clone());
        let key_name = &self.inner.key_name;

        match record.get(key_name).cloned() {
            None | Some(Value::Null) => {
                let key = self.inner.next_key.write_with(|next| {
                    let key = *next;
                    *next += 1;
                    key
                });
                // put only fails on an empty field name; key_name is not empty here
                let _ = record.put(key_name, key);
            }
            Some(Value::I64(explicit)) => {
                // keep the counter ahead of explicitly keyed rows
                self.inner.next_key.write_with(|next| {
                    if *next <= explicit {
                        *next = explicit + 1;
                    }
                });
            }
            Some(_) => {}
        }

        record.sync_original();
        self.inner.rows.write_with(|rows| rows.push(record.clone()));
        record
    }

    pub fn key_name(&self) -> &str {
        &self.inner.key_name
    }

    pub fn len(&self) -> usize {
        self.inner.rows.read_with(|rows| rows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
struct Predicate {
    field: String,
    operator: Operator,
    value: Value,
}

impl Predicate {
    fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field).cloned().unwrap_or(Value::Null);
        let ordering = actual.compare(&self.value);
        match self.operator {
            Operator::Eq => ordering.is_eq(),
            Operator::Ne => !ordering.is_eq(),
            Operator::Gt => ordering.is_gt(),
            Operator::Gte => ordering.is_ge(),
            Operator::Lt => ordering.is_lt(),
            Operator::Lte => ordering.is_le(),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {:?}", self.field, self.operator, self.value)
    }
}

/// A model handle over a [`MemoryStore`] in a given filter state.
///
/// The predicate list is immutable; `filter` clones the handle with one more
/// predicate appended, so earlier handles keep their narrower (or empty)
/// state.
struct MemoryModel {
    store: MemoryStore,
    predicates: Vec<Predicate>,
}

impl MemoryModel {
    fn matching_rows(&self) -> Vec<Record> {
        self.store.inner.rows.read_with(|rows| {
            rows.iter()
                .filter(|row| self.predicates.iter().all(|p| p.matches(row)))
                .cloned()
                .collect()
        })
    }
}

impl Display for MemoryModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "memory model [{}]",
            self.predicates.iter().map(|p| p.to_string()).join(", ")
        )
    }
}

impl ModelProvider for MemoryModel {
    fn filter(&self, field: &str, operator: Operator, value: Value) -> RepoResult<Model> {
        let mut predicates = self.predicates.clone();
        predicates.push(Predicate {
            field: field.to_string(),
            operator,
            value,
        });
        Ok(Model::new(MemoryModel {
            store: self.store.clone(),
            predicates,
        }))
    }

    fn fetch_all(&self, columns: &[&str]) -> RepoResult<Vec<Record>> {
        Ok(self
            .matching_rows()
            .iter()
            .map(|row| row.project(columns))
            .collect())
    }

    fn fetch_first(&self, columns: &[&str]) -> RepoResult<Option<Record>> {
        Ok(self.matching_rows().first().map(|row| row.project(columns)))
    }

    fn create(&self, fields: &Fields) -> RepoResult<Record> {
        Ok(self.store.insert(fields))
    }

    fn update(&self, fields: &Fields) -> RepoResult<u64> {
        let affected = self.store.inner.rows.write_with(|rows| {
            let mut affected = 0;
            for row in rows.iter_mut() {
                if self.predicates.iter().all(|p| p.matches(row)) {
                    row.fill(fields);
                    row.sync_original();
                    affected += 1;
                }
            }
            affected
        });
        log::debug!("Updated {} rows on {}", affected, self);
        Ok(affected)
    }

    fn delete(&self) -> RepoResult<bool> {
        let removed = self.store.inner.rows.write_with(|rows| {
            let before = rows.len();
            rows.retain(|row| !self.predicates.iter().all(|p| p.matches(row)));
            before - rows.len()
        });
        log::debug!("Deleted {} rows on {}", removed, self);
        Ok(removed > 0)
    }

    fn paginate(
        &self,
        per_page: u64,
        columns: &[&str],
        page_name: &str,
        page: Option<u64>,
    ) -> RepoResult<Page> {
        let matched = self.matching_rows();
        let total = matched.len() as u64;
        let current_page = page.unwrap_or(1).max(1);
        let start = ((current_page - 1) * per_page) as usize;

        let records = matched
            .iter()
            .dropping(start)
            .take(per_page as usize)
            .map(|row| row.project(columns))
            .collect();

        Ok(Page::new(records, total, per_page, current_page, page_name))
    }

    fn call(&self, method: &str, columns: &[&str]) -> RepoResult<Option<QueryOutcome>> {
        match method {
            "first" => Ok(self.fetch_first(columns)?.map(QueryOutcome::Record)),
            "get" => Ok(Some(QueryOutcome::Collection(self.fetch_all(columns)?))),
            "count" => Ok(Some(QueryOutcome::Count(self.matching_rows().len() as u64))),
            other => {
                log::error!("Terminal method {} is unknown to {}", other, self);
                Err(RepoError::new(
                    &format!("Method {} does not exist on the model.", other),
                    ErrorKind::InvalidMethod,
                ))
            }
        }
    }

    fn key_name(&self) -> String {
        self.store.inner.key_name.clone()
    }
}
