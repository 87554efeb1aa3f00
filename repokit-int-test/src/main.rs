use repokit::common::Args;
use repokit::errors::RepoResult;
use repokit::fields;
use repokit_int_test::test_util::create_test_context;

fn main() -> RepoResult<()> {
    println!("Starting repository smoke run...");
    let ctx = create_test_context()?;
    let repository = ctx.repository()?;

    let count = 10_000;
    let start = std::time::Instant::now();
    for i in 0..count {
        repository.create(&fields! {
            "first_name": format!("user-{}", i),
            "batch": true,
        })?;
    }
    println!("Created {} records in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    repository.push_criteria("where", Args::new().with("batch").with(true));
    let records = repository.find_all(&["id", "first_name"])?;
    println!("Matched {} records in {:?}", records.len(), start.elapsed());

    let start = std::time::Instant::now();
    let page = repository.paginate(Some(100), &[], None, Some(5))?;
    println!(
        "Page {}/{} ({} records) in {:?}",
        page.current_page(),
        page.last_page(),
        page.len(),
        start.elapsed()
    );

    let outcome = repository
        .skip_criteria(true)
        .find_by_method("count", &[])?;
    println!("Total records: {:?}", outcome.as_count());

    Ok(())
}
