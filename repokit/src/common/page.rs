use crate::common::Record;

/// One page of results plus pagination metadata.
///
/// Produced by `paginate` on the model handle. `last_page` is derived from
/// the total and the page size and is never below 1, so an empty result set
/// still reports a single (empty) page.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct Page {
    records: Vec<Record>,
    total: u64,
    per_page: u64,
    current_page: u64,
    last_page: u64,
    page_name: String,
}

impl Page {
    pub fn new(
        records: Vec<Record>,
        total: u64,
        per_page: u64,
        current_page: u64,
        page_name: &str,
    ) -> Self {
        let last_page = if per_page == 0 {
            1
        } else {
            total.div_ceil(per_page).max(1)
        };
        Page {
            records,
            total,
            per_page,
            current_page,
            last_page,
            page_name: page_name.to_string(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn last_page(&self) -> u64 {
        self.last_page
    }

    /// Name of the page parameter this page was resolved from.
    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
