use std::time::Duration;

use crate::error::AppError;

/// Interaction timings for the search controller, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Quiet period after the last keystroke before autocomplete is requested.
    pub debounce: Duration,
    /// Minimum trimmed query length (in characters) that triggers autocomplete.
    pub min_autocomplete_chars: usize,
    /// Delay between losing focus and hiding the suggestion dropdown.
    pub blur_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_autocomplete_chars: 2,
            blur_grace: Duration::from_millis(200),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (defaults in parentheses):
    /// - `DETAIL_AUTOCOMPLETE_DEBOUNCE_MS` (300)
    /// - `DETAIL_AUTOCOMPLETE_MIN_CHARS` (2)
    /// - `DETAIL_BLUR_GRACE_MS` (200)
    ///
    /// A variable that is set but not a number is an error rather than silently ignored.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let debounce = parse_var::<u64>(&lookup, "DETAIL_AUTOCOMPLETE_DEBOUNCE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);

        let min_autocomplete_chars =
            parse_var::<usize>(&lookup, "DETAIL_AUTOCOMPLETE_MIN_CHARS")?
                .unwrap_or(defaults.min_autocomplete_chars);

        let blur_grace = parse_var::<u64>(&lookup, "DETAIL_BLUR_GRACE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.blur_grace);

        Ok(Self {
            debounce,
            min_autocomplete_chars,
            blur_grace,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, AppError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{name} must be a non-negative integer, got {raw:?}"))),
        None => Ok(None),
    }
}
