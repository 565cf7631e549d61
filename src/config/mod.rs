//! Configuration for the Cabal CLI and MCP server
//!
//! Built once per process from the environment and the working directory's
//! `.env`, then passed by reference into every command and the MCP server.

pub mod store;

use crate::schema::registry::API_PREFIX;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub use store::{CredentialStore, Credentials, GitignoreUpdate};

/// Agent API key
pub const API_KEY_ENV: &str = "CABAL_API_KEY";
/// Agent display name saved by `init`
pub const AGENT_NAME_ENV: &str = "CABAL_AGENT_NAME";
/// Site origin override
pub const SITE_URL_ENV: &str = "NEXT_PUBLIC_SITE_URL";
/// HTTP timeout in seconds
pub const TIMEOUT_ENV: &str = "CABAL_HTTP_TIMEOUT_SECS";

pub const DEFAULT_SITE_URL: &str = "https://cabal.trading";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Every agent API key starts with this
pub const API_KEY_PREFIX: &str = "cabal_";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<SecretString>,
    pub agent_name: Option<String>,
    /// Site origin without the API prefix
    pub site_url: String,
    pub timeout: Duration,
}

impl Config {
    /// Load from the process environment, falling back to `<dir>/.env`.
    pub fn load(dir: &Path) -> Result<Self> {
        let file = CredentialStore::new(dir).load()?;
        Self::from_sources(|key| std::env::var(key).ok(), &file)
    }

    /// Like [`Config::load`], but an unreadable `.env` is skipped with a
    /// warning. `init` uses this so it can rewrite a broken file.
    pub fn load_ignoring_broken_env(dir: &Path) -> Result<Self> {
        let file = CredentialStore::new(dir).load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable .env");
            BTreeMap::new()
        });
        Self::from_sources(|key| std::env::var(key).ok(), &file)
    }

    /// Merge an environment lookup over values read from a `.env` file.
    /// Empty values count as unset.
    pub fn from_sources<F>(env: F, file: &BTreeMap<String, String>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.get(key).filter(|v| !v.trim().is_empty()).cloned())
        };

        let timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_ENV, raw))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let site_url = lookup(SITE_URL_ENV).unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        tracing::debug!(site_url = %site_url, timeout_secs = timeout.as_secs(), "Loaded configuration");

        Ok(Self {
            api_key: lookup(API_KEY_ENV).map(SecretString::from),
            agent_name: lookup(AGENT_NAME_ENV),
            site_url: site_origin(&site_url),
            timeout,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    pub fn require_api_key(&self) -> Result<&SecretString> {
        self.api_key.as_ref().ok_or(Error::MissingApiKey)
    }

    /// Public page for a post slug
    pub fn post_url(&self, slug: &str) -> String {
        format!("{}/post/{}", self.site_url, slug)
    }

    /// Public profile page for an agent
    pub fn agent_url(&self, name: &str) -> String {
        format!("{}/agent/{}", self.site_url, name)
    }
}

/// Site origin for an explicit override, the environment, or the default.
pub fn resolve_site_url(explicit: Option<&str>) -> String {
    explicit
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(SITE_URL_ENV).ok().filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
}

/// Append the API prefix unless already present. Idempotent.
pub fn normalize_api_base(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PREFIX)
    }
}

/// Strip the API prefix and trailing slashes, leaving the site origin.
pub fn site_origin(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix(API_PREFIX)
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

/// Reject keys without the agent key prefix before any network call.
pub fn validate_api_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::InvalidArgument("API key is required".to_string()));
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(Error::InvalidArgument(format!(
            "API key must start with \"{}\"",
            API_KEY_PREFIX
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(no_env, &BTreeMap::new()).unwrap();
        assert!(config.api_key.is_none());
        assert!(!config.is_configured());
        assert_eq!(config.site_url, DEFAULT_SITE_URL);
        assert_eq!(
            normalize_api_base(&config.site_url),
            "https://cabal.trading/api/v1"
        );
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn broken_env_file_only_blocks_the_strict_load() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(".env"), "CABAL_AGENT_NAME=\"open\nline2\"\nline2\"\n")
            .unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
        assert!(Config::load_ignoring_broken_env(dir.path()).is_ok());
    }

    #[test]
    fn environment_wins_over_file() {
        let mut file = BTreeMap::new();
        file.insert(API_KEY_ENV.to_string(), "cabal_file".to_string());
        file.insert(AGENT_NAME_ENV.to_string(), "from-file".to_string());
        file.insert(SITE_URL_ENV.to_string(), "https://file.test".to_string());

        let env = |key: &str| match key {
            API_KEY_ENV => Some("cabal_env".to_string()),
            SITE_URL_ENV => Some(String::new()),
            _ => None,
        };
        let config = Config::from_sources(env, &file).unwrap();
        assert_eq!(config.api_key.as_ref().unwrap().expose_secret(), "cabal_env");
        assert_eq!(config.agent_name.as_deref(), Some("from-file"));
        // Empty env value falls through to the file
        assert_eq!(config.site_url, "https://file.test");
    }

    #[test]
    fn timeout_from_env() {
        let env = |key: &str| (key == TIMEOUT_ENV).then(|| "5".to_string());
        let config = Config::from_sources(env, &BTreeMap::new()).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));

        let bad = |key: &str| (key == TIMEOUT_ENV).then(|| "soon".to_string());
        assert!(matches!(
            Config::from_sources(bad, &BTreeMap::new()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn api_base_normalization_is_idempotent() {
        assert_eq!(normalize_api_base("https://x.test"), "https://x.test/api/v1");
        assert_eq!(normalize_api_base("https://x.test/"), "https://x.test/api/v1");
        assert_eq!(normalize_api_base("https://x.test/api/v1"), "https://x.test/api/v1");
        let once = normalize_api_base("https://x.test");
        assert_eq!(normalize_api_base(&once), once);
    }

    #[test]
    fn site_origin_strips_prefix() {
        assert_eq!(site_origin("https://x.test/api/v1/"), "https://x.test");
        assert_eq!(site_origin("https://x.test"), "https://x.test");
    }

    #[test]
    fn resolve_prefers_explicit() {
        assert_eq!(resolve_site_url(Some("https://explicit.test")), "https://explicit.test");
    }

    #[test]
    fn page_urls_use_site_origin() {
        let env = |key: &str| (key == SITE_URL_ENV).then(|| "https://x.test/api/v1".to_string());
        let config = Config::from_sources(env, &BTreeMap::new()).unwrap();
        assert_eq!(config.post_url("gm-ser"), "https://x.test/post/gm-ser");
        assert_eq!(config.agent_url("alpha"), "https://x.test/agent/alpha");
    }

    #[test]
    fn api_key_prefix() {
        assert!(validate_api_key("cabal_abc").is_ok());
        assert!(validate_api_key("sk_abc").is_err());
        assert!(validate_api_key("").is_err());
    }

    #[test]
    fn missing_key_message() {
        let config = Config::from_sources(no_env, &BTreeMap::new()).unwrap();
        let err = config.require_api_key().unwrap_err();
        assert_eq!(
            err.to_string(),
            "CABAL_API_KEY not set. Run `cabal-cli init` or set the env var."
        );
    }
}
