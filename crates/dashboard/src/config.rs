use std::str::FromStr;
use std::time::Duration;

/// Dashboard configuration loaded from environment variables.
///
/// Every field has a default suitable for a backend running locally.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Base URL for all `/api/...` calls (default: `http://127.0.0.1:5000`).
    pub backend_url: String,
    /// Period between notebook status polls (default: 2000 ms).
    pub poll_interval: Duration,
    /// HTTP request timeout (default: 30 s).
    pub request_timeout: Duration,
    /// City to select. `None` selects the first city the backend lists.
    pub city: Option<String>,
    /// Notebook keys to submit on start-up, e.g. `main_1.ipynb`.
    pub run_notebooks: Vec<String>,
}

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            city: None,
            run_notebooks: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `BACKEND_URL`          | `http://127.0.0.1:5000`  |
    /// | `POLL_INTERVAL_MS`     | `2000`                   |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                     |
    /// | `DASHBOARD_CITY`       | first listed city        |
    /// | `RUN_NOTEBOOKS`        | empty                    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url = lookup("BACKEND_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.into());

        let poll_interval_ms: u64 =
            parse_or_default("POLL_INTERVAL_MS", lookup("POLL_INTERVAL_MS"), DEFAULT_POLL_INTERVAL_MS);
        let poll_interval_ms =
            nonzero_or_default("POLL_INTERVAL_MS", poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);

        let request_timeout_secs: u64 = parse_or_default(
            "REQUEST_TIMEOUT_SECS",
            lookup("REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );
        let request_timeout_secs =
            nonzero_or_default("REQUEST_TIMEOUT_SECS", request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

        let city = lookup("DASHBOARD_CITY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let run_notebooks: Vec<String> = lookup("RUN_NOTEBOOKS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            backend_url,
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            city,
            run_notebooks,
        }
    }
}

/// Parse `raw`, falling back to `default` (with a warning) when it is
/// missing or malformed.
fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, %default, "Invalid value, using default");
            default
        }
    }
}

/// Periods and timeouts of zero are rejected in favour of `default`.
fn nonzero_or_default(key: &str, value: u64, default: u64) -> u64 {
    if value == 0 {
        tracing::warn!(key, default, "Zero is not allowed, using default");
        return default;
    }
    value
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> DashboardConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), DashboardConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("BACKEND_URL", "http://backend:8000"),
            ("POLL_INTERVAL_MS", "500"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("DASHBOARD_CITY", "Boston"),
            ("RUN_NOTEBOOKS", "main_1.ipynb, main_2.ipynb,"),
        ]);

        assert_eq!(config.backend_url, "http://backend:8000");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.city.as_deref(), Some("Boston"));
        assert_eq!(config.run_notebooks, vec!["main_1.ipynb", "main_2.ipynb"]);
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let config = config_from(&[
            ("POLL_INTERVAL_MS", "fast"),
            ("REQUEST_TIMEOUT_SECS", "-1"),
        ]);

        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn zero_interval_and_timeout_fall_back_to_defaults() {
        let config = config_from(&[
            ("POLL_INTERVAL_MS", "0"),
            ("REQUEST_TIMEOUT_SECS", "0"),
        ]);

        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_city_means_first_listed() {
        let config = config_from(&[("DASHBOARD_CITY", "  ")]);
        assert!(config.city.is_none());
    }
}
