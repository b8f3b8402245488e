pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

/// Connection settings for the detail-library backend.
///
/// Built once at startup and handed to [`crate::api::HttpDetailApi::new`];
/// tests construct it directly with [`ApiConfig::new`].
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Backend origin without a trailing slash, e.g. "http://localhost:8000".
    pub base_url: String,
    /// Upper bound on how much of an error body is kept for the error message.
    pub max_error_body_bytes: usize,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            max_error_body_bytes: DEFAULT_MAX_ERROR_BODY_BYTES,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `DETAIL_API_URL`: backend origin (default `http://localhost:8000`)
    /// - `DETAIL_API_MAX_ERROR_BODY_BYTES`: error body truncation limit (default 8 KiB)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("DETAIL_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let max_error_body_bytes = lookup("DETAIL_API_MAX_ERROR_BODY_BYTES")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_ERROR_BODY_BYTES);

        Self {
            max_error_body_bytes,
            ..Self::new(base_url.trim())
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
