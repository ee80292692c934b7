//! Client configuration.
//!
//! `ClientConfig` is an explicit value owned by `GraphClient`; nothing is
//! read from global state at request time. It can be deserialized from a
//! config file (the base URL falls back to the public endpoint) or loaded
//! from the environment.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Public API root used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.example.com/v0/";

/// Environment variable holding the secret key.
pub const SECRET_KEY_VAR: &str = "CONTACT_GRAPH_SECRET_KEY";

/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "CONTACT_GRAPH_BASE_URL";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub secret_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: default_base_url(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load from `CONTACT_GRAPH_SECRET_KEY` and `CONTACT_GRAPH_BASE_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` to resolve variable names. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

        let secret_key = get(SECRET_KEY_VAR).ok_or(ApiError::MissingConfig {
            var: SECRET_KEY_VAR,
        })?;
        let base_url = get(BASE_URL_VAR).unwrap_or_else(default_base_url);
        Ok(Self {
            secret_key,
            base_url,
        })
    }
}

// Hand-written so the secret never ends up in logs or panic messages.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn new_uses_default_base_url() {
        let config = ClientConfig::new("foo");
        assert_eq!(config.secret_key, "foo");
        assert_eq!(config.base_url, "https://api.example.com/v0/");
    }

    #[test]
    fn with_base_url_overrides_default() {
        let config = ClientConfig::new("foo").with_base_url("http://www.example.org");
        assert_eq!(config.base_url, "http://www.example.org");
    }

    #[test]
    fn deserialize_defaults_base_url() {
        let config: ClientConfig = serde_json::from_str(r#"{"secret_key":"abc"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("abc"));
    }

    #[test]
    fn deserialize_rejects_missing_secret_key() {
        let result: Result<ClientConfig, _> =
            serde_json::from_str(r#"{"base_url":"http://localhost"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn from_lookup_reads_both_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (SECRET_KEY_VAR, "s3cr3t"),
            (BASE_URL_VAR, "http://localhost:3000/v0"),
        ]))
        .unwrap();
        assert_eq!(config.secret_key, "s3cr3t");
        assert_eq!(config.base_url, "http://localhost:3000/v0");
    }

    #[test]
    fn from_lookup_defaults_base_url() {
        let config = ClientConfig::from_lookup(lookup(&[(SECRET_KEY_VAR, "s3cr3t")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn from_lookup_requires_secret_key() {
        let err = ClientConfig::from_lookup(lookup(&[(SECRET_KEY_VAR, "")])).unwrap_err();
        assert!(matches!(
            err,
            ApiError::MissingConfig {
                var: SECRET_KEY_VAR
            }
        ));
    }

    #[test]
    fn debug_redacts_secret_key() {
        let rendered = format!("{:?}", ClientConfig::new("the-s3cr3t-key"));
        assert!(!rendered.contains("the-s3cr3t-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
