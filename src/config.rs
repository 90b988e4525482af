use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Storage key of the serialized task array.
pub const TASKS_KEY: &str = "tasks";
/// Storage key of the session token.
pub const SESSION_KEY: &str = "userToken";

/// Where a board keeps its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Tasks live only in local storage.
    Local,
    /// Tasks live on the REST backend; a session is required.
    Remote,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "remote" => Ok(BackendKind::Remote),
            other => Err(AppError::Config(format!(
                "TASKBOARD_BACKEND must be 'local' or 'remote', got '{}'",
                other
            ))),
        }
    }
}

pub struct Config {
    pub api_url: String,
    pub backend: BackendKind,
    pub storage_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("TASKBOARD_API_URL")
            .unwrap_or_else(|| "http://127.0.0.1:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "TASKBOARD_API_URL must be an http(s) URL, got '{}'",
                api_url
            )));
        }

        Ok(Self {
            api_url,
            backend: lookup("TASKBOARD_BACKEND")
                .map(|value| value.parse::<BackendKind>())
                .transpose()?
                .unwrap_or(BackendKind::Local),
            storage_dir: lookup("TASKBOARD_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".taskboard")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.storage_dir, PathBuf::from(".taskboard"));
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("TASKBOARD_API_URL", "https://todo.example.com/"),
            ("TASKBOARD_BACKEND", "Remote"),
            ("TASKBOARD_STORAGE_DIR", "/tmp/board"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://todo.example.com");
        assert_eq!(config.backend, BackendKind::Remote);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/board"));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let result = Config::from_lookup(lookup_from(&[("TASKBOARD_BACKEND", "cloud")]));
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = Config::from_lookup(lookup_from(&[("TASKBOARD_API_URL", "ftp://x")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
