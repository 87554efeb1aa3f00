use repokit::common::{Args, Value};
use repokit::errors::{ErrorKind, RepoResult};
use repokit_int_test::test_util::create_test_context;

#[test]
fn criteria_narrow_results_when_getting_all_data() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    repository.push_criteria("name_criteria", Args::new().with("Wayne"));

    let records = repository.find_all(&["id", "first_name"])?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("first_name"), Some(&Value::from("Wayne")));
    Ok(())
}

#[test]
fn criteria_apply_when_getting_data_by_field() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    repository.push_criteria("name_criteria", Args::new().with("Wayne"));

    // id=1 is Anette, excluded by the criteria
    let err = repository.find_by("id", 1, &["id", "first_name"]).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NotFound);

    // id=2 is Wayne, still visible
    let record = repository.find_by("id", 2, &["id", "first_name"])?;
    assert_eq!(record.get("first_name"), Some(&Value::from("Wayne")));
    Ok(())
}

#[test]
fn criteria_registrations_replay_in_order() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    repository.push_criteria(
        "where",
        Args::new().with("id").with(1).with_named("operator", "gt"),
    );
    repository.push_criteria("name_criteria", Args::new().with("Wayne"));

    let records = repository.find_all(&[])?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("first_name"), Some(&Value::from("Wayne")));
    Ok(())
}

#[test]
fn skip_criteria_returns_unfiltered_results() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    repository.push_criteria("name_criteria", Args::new().with("Wayne"));
    assert_eq!(repository.find_all(&[])?.len(), 1);

    let records = repository.skip_criteria(true).find_all(&[])?;
    assert_eq!(records.len(), 2);
    Ok(())
}

#[test]
fn single_shot_criteria_with_a_custom_find_method() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    let record = repository
        .get_by_criteria("name_criteria", &Args::new().with("Wayne"))?
        .find_by_method("first", &[])?;
    assert!(record.as_record().is_some());
    Ok(())
}

#[test]
fn terminator_returns_a_result_from_the_current_state() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    let outcome = repository
        .get_by_terminator("name_terminator", &Args::new().with("Wayne"))?
        .unwrap();
    assert_eq!(
        outcome.as_record().unwrap().get("first_name"),
        Some(&Value::from("Wayne"))
    );

    let outcome = repository.get_by_terminator("first", &Args::new())?.unwrap();
    assert_eq!(
        outcome.as_record().unwrap().get("first_name"),
        Some(&Value::from("Anette"))
    );
    Ok(())
}

#[test]
fn terminator_bypasses_registered_criteria() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    // a criteria that excludes every seeded record
    repository.push_criteria("name_criteria", Args::new().with("Nobody"));
    assert!(repository.find_all(&[])?.is_empty());

    let outcome = repository
        .get_by_terminator("name_terminator", &Args::new().with("Wayne"))?
        .unwrap();
    assert_eq!(
        outcome.as_record().unwrap().get("first_name"),
        Some(&Value::from("Wayne"))
    );
    Ok(())
}

#[test]
fn unregistered_criteria_fails_resolution() {
    let ctx = create_test_context().unwrap();
    let repository = ctx.repository().unwrap();

    repository.push_criteria("missing_criteria", Args::new());

    let err = repository.find_all(&[]).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ResolutionError);
}

#[test]
fn criteria_and_terminator_identifiers_are_not_interchangeable() {
    let ctx = create_test_context().unwrap();
    let repository = ctx.repository().unwrap();

    let err = repository
        .get_by_criteria("name_terminator", &Args::new().with("Wayne"))
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::TypeMismatch);

    let err = repository
        .get_by_terminator("name_criteria", &Args::new().with("Wayne"))
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::TypeMismatch);
}

#[test]
fn isolated_instances_get_different_results() -> RepoResult<()> {
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    repository.push_criteria("name_criteria", Args::new().with("Wayne"));

    let isolated = repository.new_instance()?;
    assert!(isolated.get_criteria().is_empty());
    assert!(!repository.get_criteria().is_empty());

    assert_eq!(repository.find_all(&[])?.len(), 1);
    assert!(isolated.find_all(&[])?.len() > 1);
    Ok(())
}

#[test]
fn seeded_scenario_end_to_end() {
    // two records seeded: id=1 "Anette", id=2 "Wayne"
    let ctx = create_test_context().unwrap();
    let repository = ctx.repository().unwrap();

    repository.push_criteria("name_criteria", Args::new().with("Wayne"));
    let records = repository.find_all(&[]).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("first_name"), Some(&Value::from("Wayne")));

    let repository = ctx.repository().unwrap();
    repository.delete("id", 1).unwrap();
    let err = repository.find_by("id", 1, &[]).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NotFound);
    assert_eq!(err.message(), "Model does not exist.");
}
