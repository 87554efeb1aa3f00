use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::common::{
    atomic, Args, Atomic, Fields, Page, ReadExecutor, Record, Value, WriteExecutor,
};
use crate::criteria::CriteriaFactory;
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::model::{Model, Operator, QueryOutcome};
use crate::registry::{ConstructionService, Resolved};
use crate::repository_config::RepositoryConfig;

/// A registered criteria: the identifier plus the constructor arguments
/// captured at registration time. Resolved lazily, once per application.
#[derive(Clone, Debug)]
pub struct CriteriaEntry {
    identifier: String,
    args: Args,
}

impl CriteriaEntry {
    pub fn new(identifier: &str, args: Args) -> Self {
        CriteriaEntry {
            identifier: identifier.to_string(),
            args,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn args(&self) -> &Args {
        &self.args
    }
}

/// A repository over one record type, driven by composable criteria.
///
/// # Purpose
///
/// `Repository` owns the current query/model handle, the ordered list of
/// registered criteria, and orchestrates the query lifecycle: fresh-handle
/// acquisition, criteria replay, terminator dispatch, and the CRUD surface.
///
/// # Query lifecycle
///
/// Every read/write entry point starts by discarding whatever handle is
/// stored and rebuilding a pristine one, then, unless skipping is enabled,
/// replays the registered criteria against it in registration order. The
/// resulting handle is what the operation runs on. Nothing from a previous
/// call survives into the next one; criteria are never applied twice and
/// never applied on top of stale predicate state.
///
/// # One-off overrides
///
/// - `skip_criteria(true)` makes the next replay a no-op (pristine handle).
/// - `get_by_criteria` applies a single criteria to the *current* handle
///   without touching the registered list.
/// - `get_by_terminator` resolves a terminator and runs it against the
///   current raw handle, bypassing the registered pipeline entirely.
///
/// # Sharing
///
/// A repository is not meant for concurrent use: its handle and criteria
/// list are per-instance state. Use `new_instance` to obtain an isolated
/// repository sharing only the construction service.
///
/// # Examples
///
/// ```rust,ignore
/// use repokit::repository::Repository;
/// use repokit::repository_config::RepositoryConfig;
///
/// let repository = Repository::new(registry, RepositoryConfig::new("users"), Vec::new())?;
/// repository.push_criteria("where_name", Args::new().with("first_name").with("Wayne"));
/// let records = repository.find_all(&[])?;
/// ```
pub struct Repository {
    service: Arc<dyn ConstructionService>,
    factory: CriteriaFactory,
    config: RepositoryConfig,
    model: Atomic<Model>,
    criteria: Atomic<Vec<CriteriaEntry>>,
    skip_criteria: Atomic<bool>,
}

fn resolve_model(service: &Arc<dyn ConstructionService>, identifier: &str) -> RepoResult<Model> {
    match service.resolve(identifier, &Args::new()) {
        Ok(Resolved::Model(model)) => Ok(model),
        Ok(other) => {
            log::error!(
                "Identifier {} resolved to a {} where a model was required",
                identifier,
                other.kind_name()
            );
            Err(RepoError::new(
                &format!("{} does not resolve to a model", identifier),
                ErrorKind::ConstructionError,
            ))
        }
        Err(cause) => Err(RepoError::new_with_cause(
            &format!("Failed to construct model {}", identifier),
            ErrorKind::ConstructionError,
            cause,
        )),
    }
}

impl Repository {
    /// Creates a repository from a construction service, a configuration,
    /// and an initial (possibly empty) criteria sequence. The model handle
    /// is built immediately.
    pub fn new<S: ConstructionService + 'static>(
        service: S,
        config: RepositoryConfig,
        criteria: Vec<CriteriaEntry>,
    ) -> RepoResult<Repository> {
        Self::with_service(Arc::new(service), config, criteria)
    }

    /// Same as [`Repository::new`] for an already-shared construction
    /// service.
    pub fn with_service(
        service: Arc<dyn ConstructionService>,
        config: RepositoryConfig,
        criteria: Vec<CriteriaEntry>,
    ) -> RepoResult<Repository> {
        let model = resolve_model(&service, config.model())?;
        let factory = CriteriaFactory::new(service.clone());
        Ok(Repository {
            service,
            factory,
            config,
            model: atomic(model),
            criteria: atomic(criteria),
            skip_criteria: atomic(false),
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Resolves a fresh model handle.
    ///
    /// Uses the configured model identifier unless `override_id` names
    /// another one.
    ///
    /// # Errors
    ///
    /// Fails with `ConstructionError` when resolution fails or the
    /// identifier does not produce a model.
    pub fn new_model(&self, override_id: Option<&str>) -> RepoResult<Model> {
        let identifier = match override_id {
            Some(identifier) => identifier,
            None => self.config.model(),
        };
        resolve_model(&self.service, identifier)
    }

    /// Unconditionally replaces the stored handle with a fresh one,
    /// discarding any criteria or manual predicates applied to it.
    ///
    /// Idempotent: repeated flushes are safe and each produces an
    /// independent handle.
    pub fn flush_model(&self) -> RepoResult<()> {
        let model = self.new_model(None)?;
        log::debug!("Flushing model handle, replacing with {}", model);
        self.model.write_with(|current| *current = model);
        Ok(())
    }

    pub fn get_model(&self) -> Model {
        self.model.read_with(|model| model.clone())
    }

    /// Injects a pre-built handle (for example after manual chaining),
    /// bypassing `new_model`.
    pub fn set_model(&self, model: Model) {
        self.model.write_with(|current| *current = model);
    }

    /// Sets the skip flag; takes effect on the next criteria replay.
    /// Returns the repository for chaining.
    pub fn skip_criteria(&self, status: bool) -> &Self {
        self.skip_criteria.write_with(|skip| *skip = status);
        self
    }

    /// Snapshot of the registered criteria sequence, in application order.
    pub fn get_criteria(&self) -> Vec<CriteriaEntry> {
        self.criteria.read_with(|criteria| criteria.clone())
    }

    /// Appends a criteria registration. No effect on the stored handle until
    /// the next replay. Returns the repository for chaining.
    pub fn push_criteria(&self, identifier: &str, args: Args) -> &Self {
        self.criteria
            .write_with(|criteria| criteria.push(CriteriaEntry::new(identifier, args)));
        self
    }

    /// Builds the named criteria and applies it to the **current** handle,
    /// storing the result. The registered sequence is untouched; this is
    /// the single-shot escape hatch. Returns the repository for chaining.
    pub fn get_by_criteria(&self, identifier: &str, args: &Args) -> RepoResult<&Self> {
        let criteria = self.factory.build_criteria(identifier, args)?;
        log::debug!("Applying criteria {} to the current handle", criteria);
        let transformed = criteria.apply(self.get_model(), self)?;
        self.set_model(transformed);
        Ok(self)
    }

    /// The pipeline driver, invoked at the start of every read/write entry
    /// point.
    ///
    /// # Behavior
    ///
    /// 1. Flushes the stored handle, guaranteeing a pristine starting point.
    /// 2. Returns immediately when criteria skipping is enabled.
    /// 3. Otherwise replays the registered sequence in insertion order, each
    ///    application's output becoming the next one's input.
    pub fn apply_criteria(&self) -> RepoResult<&Self> {
        // Clear out any previous modifications
        self.flush_model()?;

        if self.skip_criteria.read_with(|skip| *skip) {
            log::debug!("Criteria replay skipped");
            return Ok(self);
        }

        for entry in self.get_criteria() {
            self.get_by_criteria(entry.identifier(), entry.args())?;
        }

        Ok(self)
    }

    /// Resolves a terminator and runs it against the **current raw** handle.
    ///
    /// No flush, no criteria replay: terminators intentionally bypass the
    /// standing pipeline and operate on whatever state is present.
    pub fn get_by_terminator(
        &self,
        identifier: &str,
        args: &Args,
    ) -> RepoResult<Option<QueryOutcome>> {
        let terminator = self.factory.build_terminator(identifier, args)?;
        log::debug!("Dispatching terminator {}", terminator);
        terminator.apply(self.get_model(), self)
    }

    /// Returns all matching records projected to `columns` (empty slice
    /// keeps every column).
    pub fn find_all(&self, columns: &[&str]) -> RepoResult<Vec<Record>> {
        self.apply_criteria()?;
        self.get_model().fetch_all(columns)
    }

    /// Returns the first record where `field == value`.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when no record matches.
    pub fn find_by<T: Into<Value>>(
        &self,
        field: &str,
        value: T,
        columns: &[&str],
    ) -> RepoResult<Record> {
        self.apply_criteria()?;

        let filtered = self.get_model().filter(field, Operator::Eq, value.into())?;
        match filtered.fetch_first(columns)? {
            Some(record) => Ok(record),
            None => {
                log::debug!("No record on {} matched the lookup", filtered);
                Err(RepoError::new("Model does not exist.", ErrorKind::NotFound))
            }
        }
    }

    /// Convenience lookup on the model's primary-key field.
    pub fn find_by_id<T: Into<Value>>(&self, value: T, columns: &[&str]) -> RepoResult<Record> {
        let key_name = self.get_model().key_name();
        self.find_by(&key_name, value, columns)
    }

    /// Invokes an arbitrary terminal method by name on the handle, the
    /// escape hatch for builder methods not otherwise exposed.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidMethod` when the method is unknown to the handle
    /// or produced no result.
    pub fn find_by_method(&self, method: &str, columns: &[&str]) -> RepoResult<QueryOutcome> {
        self.apply_criteria()?;

        match self.get_model().call(method, columns)? {
            Some(outcome) => Ok(outcome),
            None => {
                log::error!("Terminal method {} produced no result", method);
                Err(RepoError::new(
                    &format!("Method {} does not exist on the model.", method),
                    ErrorKind::InvalidMethod,
                ))
            }
        }
    }

    /// Persists a new record from a field map and returns it as stored.
    ///
    /// Flushes first, so the write runs against a pristine handle.
    pub fn create(&self, data: &Fields) -> RepoResult<Record> {
        self.flush_model()?;
        self.get_model().create(data)
    }

    /// Persists a new record built by a transform applied to a blank record.
    pub fn create_with<F>(&self, build: F) -> RepoResult<Record>
    where
        F: FnOnce(&mut Record) -> RepoResult<()>,
    {
        self.flush_model()?;
        let mut record = Record::new();
        build(&mut record)?;
        self.get_model().create(record.fields())
    }

    /// Updates the record where `field == value`: bulk-assigns `data`,
    /// persists, and returns the updated record.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when no record matches, and `ValidationError`
    /// when the located record carries no primary key to persist through.
    pub fn update<T: Into<Value>>(
        &self,
        data: &Fields,
        field: &str,
        value: T,
    ) -> RepoResult<Record> {
        self.apply_criteria()?;

        let filtered = self.get_model().filter(field, Operator::Eq, value.into())?;
        let mut record = match filtered.fetch_first(&[])? {
            Some(record) => record,
            None => {
                log::debug!("No record on {} matched the update lookup", filtered);
                return Err(RepoError::new("Model does not exist.", ErrorKind::NotFound));
            }
        };

        let key_name = filtered.key_name();
        let key = record.get(&key_name).cloned().ok_or_else(|| {
            log::error!("Located record has no {} key to persist through", key_name);
            RepoError::new(
                &format!("Record has no {} key", key_name),
                ErrorKind::ValidationError,
            )
        })?;

        filtered
            .filter(&key_name, Operator::Eq, key)?
            .update(data)?;

        record.fill(data);
        record.sync_original();
        Ok(record)
    }

    /// Bulk-assigns `data` onto an already-held record and persists only
    /// when the assignment changed something.
    ///
    /// Returns whether a write occurred; a no-op assignment never writes.
    pub fn update_model(&self, data: &Fields, record: &mut Record) -> RepoResult<bool> {
        record.fill(data);

        if !record.is_dirty() {
            log::debug!("Assignment left the record clean, skipping write");
            return Ok(false);
        }

        let model = self.new_model(None)?;
        let key_name = model.key_name();
        let key = record.get(&key_name).cloned().ok_or_else(|| {
            log::error!("Record has no {} key to persist through", key_name);
            RepoError::new(
                &format!("Record has no {} key", key_name),
                ErrorKind::ValidationError,
            )
        })?;

        model.filter(&key_name, Operator::Eq, key)?.update(data)?;
        record.sync_original();
        Ok(true)
    }

    /// Deletes the record(s) where `field == value`. Returns true when at
    /// least one record was removed.
    pub fn delete<T: Into<Value>>(&self, field: &str, value: T) -> RepoResult<bool> {
        self.apply_criteria()?;
        self.get_model()
            .filter(field, Operator::Eq, value.into())?
            .delete()
    }

    /// Returns a page of matching records plus pagination metadata.
    /// `per_page` and `page_name` default from the repository configuration.
    pub fn paginate(
        &self,
        per_page: Option<u64>,
        columns: &[&str],
        page_name: Option<&str>,
        page: Option<u64>,
    ) -> RepoResult<Page> {
        self.apply_criteria()?;

        let per_page = per_page.unwrap_or_else(|| self.config.default_per_page());
        let page_name = match page_name {
            Some(name) => name,
            None => self.config.page_name(),
        };
        self.get_model().paginate(per_page, columns, page_name, page)
    }

    /// Returns a new repository sharing the construction context but with an
    /// empty criteria sequence, criteria skipping disabled, and a fresh
    /// handle. The two instances share no mutable state.
    pub fn new_instance(&self) -> RepoResult<Repository> {
        Repository::with_service(self.service.clone(), self.config.clone(), Vec::new())
    }
}

impl Debug for Repository {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("model", &self.config.model())
            .field("criteria", &self.get_criteria())
            .field("skip_criteria", &self.skip_criteria.read_with(|skip| *skip))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Criteria, CriteriaProvider, FieldCriteria, FieldTerminator, Terminator};
    use crate::fields;
    use crate::model::MemoryStore;
    use crate::registry::Registry;
    use parking_lot::Mutex;
    use std::fmt::{Display, Formatter};

    struct TraceCriteria {
        tag: String,
        trace: Arc<Mutex<Vec<String>>>,
    }

    impl Display for TraceCriteria {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "trace {}", self.tag)
        }
    }

    impl CriteriaProvider for TraceCriteria {
        fn apply(&self, model: Model, _repository: &Repository) -> RepoResult<Model> {
            self.trace.lock().push(self.tag.clone());
            Ok(model)
        }
    }

    fn registry_for(store: &MemoryStore) -> Registry {
        let registry = Registry::new();
        let handle = store.clone();
        registry.register_model("users", move |_args| Ok(handle.model()));
        registry.register_criteria("where", |args| Ok(Criteria::new(FieldCriteria::from_args(args)?)));
        registry.register_terminator("first_where", |args| {
            Ok(Terminator::new(FieldTerminator::from_args(args)?))
        });
        registry
    }

    fn seeded_repository() -> (MemoryStore, Repository) {
        let store = MemoryStore::new("id");
        store.insert(&fields! { "first_name": "Anette", "last_name": "Olsen" });
        store.insert(&fields! { "first_name": "Wayne", "last_name": "Barker" });
        let repository = Repository::new(
            registry_for(&store),
            RepositoryConfig::new("users"),
            Vec::new(),
        )
        .unwrap();
        (store, repository)
    }

    #[test]
    fn construction_fails_for_unresolvable_model() {
        let registry = Registry::new();
        let err =
            Repository::new(registry, RepositoryConfig::new("missing"), Vec::new()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConstructionError);
        assert!(err.cause().is_some());
    }

    #[test]
    fn flush_is_idempotent_and_yields_independent_handles() {
        let (_store, repository) = seeded_repository();

        repository.flush_model().unwrap();
        let first = repository.get_model();
        repository.flush_model().unwrap();
        let second = repository.get_model();

        assert!(!first.ptr_eq(&second));
        // neither handle carries residual predicates
        assert_eq!(first.fetch_all(&[]).unwrap().len(), 2);
        assert_eq!(second.fetch_all(&[]).unwrap().len(), 2);
    }

    #[test]
    fn apply_criteria_discards_manual_predicates() {
        let (_store, repository) = seeded_repository();

        let narrowed = repository
            .get_model()
            .filter("first_name", Operator::Eq, Value::from("Wayne"))
            .unwrap();
        repository.set_model(narrowed);

        // the replay starts from a pristine handle, not the injected one
        let records = repository.find_all(&[]).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn registered_criteria_replay_in_insertion_order() {
        let store = MemoryStore::new("id");
        store.insert(&fields! { "first_name": "Anette" });
        let registry = registry_for(&store);

        let trace = Arc::new(Mutex::new(Vec::new()));
        for tag in ["c1", "c2"] {
            let trace = trace.clone();
            registry.register_criteria(tag, move |_args| {
                Ok(Criteria::new(TraceCriteria {
                    tag: tag.to_string(),
                    trace: trace.clone(),
                }))
            });
        }

        let repository =
            Repository::new(registry, RepositoryConfig::new("users"), Vec::new()).unwrap();
        repository.push_criteria("c1", Args::new());
        repository.push_criteria("c2", Args::new());

        repository.find_all(&[]).unwrap();
        assert_eq!(trace.lock().clone(), vec!["c1", "c2"]);

        // replayed fresh on the next entry point, still in order
        repository.find_all(&[]).unwrap();
        assert_eq!(trace.lock().clone(), vec!["c1", "c2", "c1", "c2"]);
    }

    #[test]
    fn criteria_narrow_results_until_skipped() {
        let (_store, repository) = seeded_repository();
        repository.push_criteria("where", Args::new().with("first_name").with("Wayne"));

        let narrowed = repository.find_all(&[]).unwrap();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].get("first_name"), Some(&Value::from("Wayne")));

        let all = repository.skip_criteria(true).find_all(&[]).unwrap();
        assert_eq!(all.len(), 2);

        // flag stays set until changed back
        assert_eq!(repository.find_all(&[]).unwrap().len(), 2);
        repository.skip_criteria(false);
        assert_eq!(repository.find_all(&[]).unwrap().len(), 1);
    }

    #[test]
    fn get_by_criteria_leaves_registered_sequence_untouched() {
        let (_store, repository) = seeded_repository();

        repository
            .get_by_criteria("where", &Args::new().with("first_name").with("Wayne"))
            .unwrap();
        assert!(repository.get_criteria().is_empty());
        assert_eq!(repository.get_model().fetch_all(&[]).unwrap().len(), 1);
    }

    #[test]
    fn new_instance_shares_no_criteria_state() {
        let (_store, repository) = seeded_repository();
        repository.push_criteria("where", Args::new().with("first_name").with("Wayne"));

        let isolated = repository.new_instance().unwrap();
        assert!(isolated.get_criteria().is_empty());
        assert_eq!(repository.get_criteria().len(), 1);

        isolated.push_criteria("where", Args::new().with("first_name").with("Anette"));
        assert_eq!(repository.get_criteria().len(), 1);

        assert_eq!(repository.find_all(&[]).unwrap().len(), 1);
        assert_eq!(
            isolated.find_all(&[]).unwrap()[0].get("first_name"),
            Some(&Value::from("Anette"))
        );
    }

    #[test]
    fn terminator_bypasses_the_registered_pipeline() {
        let (_store, repository) = seeded_repository();
        // a criteria that excludes every record
        repository.push_criteria("where", Args::new().with("first_name").with("Nobody"));
        assert!(repository.find_all(&[]).unwrap().is_empty());

        let outcome = repository
            .get_by_terminator("first_where", &Args::new().with("first_name").with("Wayne"))
            .unwrap()
            .unwrap();
        assert_eq!(
            outcome.as_record().unwrap().get("first_name"),
            Some(&Value::from("Wayne"))
        );
    }

    #[test]
    fn find_by_raises_not_found_with_exact_message() {
        let (_store, repository) = seeded_repository();
        let err = repository.find_by("id", 100000, &[]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);
        assert_eq!(err.message(), "Model does not exist.");
    }

    #[test]
    fn find_by_id_uses_the_key_field() {
        let (_store, repository) = seeded_repository();
        let record = repository.find_by_id(2, &[]).unwrap();
        assert_eq!(record.get("first_name"), Some(&Value::from("Wayne")));
    }

    #[test]
    fn find_by_method_requires_a_result() {
        let (_store, repository) = seeded_repository();

        let first = repository.find_by_method("first", &[]).unwrap();
        assert!(first.as_record().is_some());

        repository.push_criteria("where", Args::new().with("first_name").with("Nobody"));
        let err = repository.find_by_method("first", &[]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidMethod);
        assert_eq!(err.message(), "Method first does not exist on the model.");
    }

    #[test]
    fn create_runs_on_a_pristine_handle() {
        let (store, repository) = seeded_repository();
        repository.push_criteria("where", Args::new().with("first_name").with("Nobody"));

        let record = repository
            .create(&fields! { "first_name": "Simon", "last_name": "Holloway" })
            .unwrap();
        assert_eq!(record.get("id"), Some(&Value::from(3)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn update_model_skips_clean_assignments() {
        let (_store, repository) = seeded_repository();
        let mut record = repository.find_by("id", 1, &[]).unwrap();
        let current_name = record.get("first_name").cloned().unwrap();

        let wrote = repository
            .update_model(&fields! { "first_name": current_name.as_text().unwrap() }, &mut record)
            .unwrap();
        assert!(!wrote);

        let wrote = repository
            .update_model(&fields! { "first_name": "Annette" }, &mut record)
            .unwrap();
        assert!(wrote);

        let reread = repository.find_by("id", 1, &[]).unwrap();
        assert_eq!(reread.get("first_name"), Some(&Value::from("Annette")));
    }

    #[test]
    fn delete_then_lookup_raises_not_found() {
        let (_store, repository) = seeded_repository();
        assert!(repository.delete("id", 1).unwrap());

        let err = repository.find_by("id", 1, &[]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);
        assert_eq!(err.message(), "Model does not exist.");
    }

    #[test]
    fn paginate_defaults_come_from_configuration() {
        let store = MemoryStore::new("id");
        for i in 0..3 {
            store.insert(&fields! { "n": i });
        }
        let repository = Repository::new(
            registry_for(&store),
            RepositoryConfig::new("users").with_per_page(2).with_page_name("p"),
            Vec::new(),
        )
        .unwrap();

        let page = repository.paginate(None, &[], None, None).unwrap();
        assert_eq!(page.per_page(), 2);
        assert_eq!(page.page_name(), "p");
        assert_eq!(page.total(), 3);
        assert_eq!(page.last_page(), 2);
    }
}
