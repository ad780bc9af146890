//! Configuration for the HTTP client

use std::time::Duration;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/todo";

/// Content type sent with every request by default
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Where the collection lives and how to talk to it
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use todo_client::ApiConfig;
///
/// let config = ApiConfig::default()
///     .with_base_url("https://todo.example.com/api/todo")
///     .with_header("Authorization", "Bearer token")
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.headers.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Collection URL, without a trailing slash
    pub base_url: String,
    /// Headers sent with every request
    pub headers: Vec<(String, String)>,
    /// Per-request timeout; `None` waits forever
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// Default configuration pointing at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Set the collection URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set a header, replacing any header with the same name
    ///
    /// Header names compare case-insensitively.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Set a per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// URL of the whole collection
    #[must_use]
    pub fn collection_url(&self) -> String {
        self.base_url.clone()
    }

    /// URL of a single todo
    #[must_use]
    pub fn item_url(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{id}", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())],
            timeout: None,
        }
    }
}
