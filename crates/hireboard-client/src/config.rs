use std::time::Duration;

use hireboard_core::AppError;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the record backend.
#[derive(Clone, PartialEq, Eq)]
pub struct RecordClientConfig {
    pub base_url: Url,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

impl RecordClientConfig {
    /// Read configuration from environment variables.
    ///
    /// - `HIREBOARD_API_URL` (required)
    /// - `HIREBOARD_PROJECT_ID` (required)
    /// - `HIREBOARD_PUBLIC_KEY` (required)
    /// - `HIREBOARD_TIMEOUT_SECS` (optional, defaults to 30)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    AppError::ConfigError(format!(
                        "{key} not set. Required for the record backend."
                    ))
                })
        };

        let raw_url = required("HIREBOARD_API_URL")?;
        let base_url = Url::parse(&raw_url).map_err(|e| {
            AppError::ConfigError(format!("Invalid HIREBOARD_API_URL '{raw_url}': {e}"))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::ConfigError(format!(
                "HIREBOARD_API_URL must be http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let project_id = required("HIREBOARD_PROJECT_ID")?;
        let public_key = required("HIREBOARD_PUBLIC_KEY")?;

        let timeout_secs = match lookup("HIREBOARD_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => {
                let parsed: u64 = raw.trim().parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid HIREBOARD_TIMEOUT_SECS '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed == 0 {
                    return Err(AppError::ConfigError(
                        "HIREBOARD_TIMEOUT_SECS must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        Ok(Self {
            base_url,
            project_id,
            public_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl std::fmt::Debug for RecordClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .field("public_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const COMPLETE: &[(&str, &str)] = &[
        ("HIREBOARD_API_URL", "https://records.example.test/v1"),
        ("HIREBOARD_PROJECT_ID", "proj-42"),
        ("HIREBOARD_PUBLIC_KEY", "pk_live_abc"),
    ];

    #[test]
    fn test_defaults_timeout() {
        let config = RecordClientConfig::from_lookup(lookup(COMPLETE)).unwrap();
        assert_eq!(config.base_url.as_str(), "https://records.example.test/v1");
        assert_eq!(config.project_id, "proj-42");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_custom_timeout() {
        let mut vars = COMPLETE.to_vec();
        vars.push(("HIREBOARD_TIMEOUT_SECS", "5"));
        let config = RecordClientConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_zero_or_garbage_timeout() {
        for raw in ["0", "soon", "-3"] {
            let mut vars = COMPLETE.to_vec();
            vars.push(("HIREBOARD_TIMEOUT_SECS", raw));
            let err = RecordClientConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)), "accepted {raw}");
        }
    }

    #[test]
    fn test_missing_required_variable() {
        let vars: Vec<_> = COMPLETE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "HIREBOARD_PUBLIC_KEY")
            .collect();
        let err = RecordClientConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("HIREBOARD_PUBLIC_KEY"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut vars = COMPLETE.to_vec();
        vars[0] = ("HIREBOARD_API_URL", "ftp://records.example.test");
        assert!(RecordClientConfig::from_lookup(lookup(&vars)).is_err());

        vars[0] = ("HIREBOARD_API_URL", "not a url");
        assert!(RecordClientConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = RecordClientConfig::from_lookup(lookup(COMPLETE)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("pk_live_abc"));
        assert!(debug.contains("proj-42"));
    }
}
