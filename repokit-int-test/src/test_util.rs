use repokit::common::Value;
use repokit::criteria::{Criteria, FieldCriteria, FieldTerminator, FirstTerminator, Terminator};
use repokit::errors::RepoResult;
use repokit::fields;
use repokit::model::{MemoryStore, Operator};
use repokit::registry::Registry;
use repokit::repository::Repository;
use repokit::repository_config::RepositoryConfig;

#[ctor::ctor]
fn init_logging() {
    colog::init();
}

/// Shared fixture for the integration tests: a seeded in-memory store plus a
/// registry with the identifiers the scenarios resolve.
pub struct TestContext {
    store: MemoryStore,
    registry: Registry,
}

impl TestContext {
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A fresh repository over the seeded store, with no registered
    /// criteria.
    pub fn repository(&self) -> RepoResult<Repository> {
        Repository::new(
            self.registry.clone(),
            RepositoryConfig::new("users"),
            Vec::new(),
        )
    }
}

/// Builds a context seeded with two users:
/// id=1 "Anette" and id=2 "Wayne".
pub fn create_test_context() -> RepoResult<TestContext> {
    let store = MemoryStore::new("id");
    store.insert(&fields! {
        "first_name": "Anette",
        "last_name": "Olsen",
        "email": "anette@example.com",
    });
    store.insert(&fields! {
        "first_name": "Wayne",
        "last_name": "Barker",
        "email": "wayne@example.com",
    });

    let registry = Registry::new();

    let handle = store.clone();
    registry.register_model("users", move |_args| Ok(handle.model()));

    // generic single-field criteria: (field, value) plus optional operator
    registry.register_criteria("where", |args| {
        Ok(Criteria::new(FieldCriteria::from_args(args)?))
    });

    // first-name criteria parameterized on the name to match
    registry.register_criteria("name_criteria", |args| {
        let value = args
            .positional(0)
            .cloned()
            .unwrap_or_else(|| Value::from("Wayne"));
        Ok(Criteria::new(FieldCriteria::new(
            "first_name",
            Operator::Eq,
            value,
        )))
    });

    registry.register_terminator("first", |_args| Ok(Terminator::new(FirstTerminator)));

    // first record matching a first name
    registry.register_terminator("name_terminator", |args| {
        let value = args
            .positional(0)
            .cloned()
            .unwrap_or_else(|| Value::from("Wayne"));
        Ok(Terminator::new(FieldTerminator::new("first_name", value)))
    });

    Ok(TestContext { store, registry })
}
