//! Repository-level configuration.

/// Configuration a repository is created with.
///
/// Carries the declared model identifier plus the defaults the CRUD surface
/// falls back to. Criteria receive the owning repository on apply and can
/// read this configuration through `Repository::config()`.
///
/// # Examples
///
/// ```rust,ignore
/// use repokit::repository_config::RepositoryConfig;
///
/// let config = RepositoryConfig::new("users")
///     .with_per_page(25)
///     .with_page_name("p");
/// ```
#[derive(Clone, Debug)]
pub struct RepositoryConfig {
    model: String,
    default_per_page: u64,
    page_name: String,
}

impl RepositoryConfig {
    /// Creates a configuration for the given model identifier with default
    /// pagination settings (10 per page, page parameter `"page"`).
    pub fn new(model: &str) -> Self {
        RepositoryConfig {
            model: model.to_string(),
            default_per_page: 10,
            page_name: "page".to_string(),
        }
    }

    pub fn with_per_page(mut self, per_page: u64) -> Self {
        self.default_per_page = per_page;
        self
    }

    pub fn with_page_name(mut self, page_name: &str) -> Self {
        self.page_name = page_name.to_string();
        self
    }

    /// The identifier the repository resolves its model handles from.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn default_per_page(&self) -> u64 {
        self.default_per_page
    }

    pub fn page_name(&self) -> &str {
        &self.page_name
    }
}
