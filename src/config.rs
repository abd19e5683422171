//! Client configuration

use std::env;
use std::fmt;

use zeroize::Zeroize;

/// Default service host; the API lives at `https://<project>.<host>/api`
pub const DEFAULT_HOST: &str = "deform.io";

/// API token that zeros its memory on drop and never shows up in debug output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for AuthToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

impl From<String> for AuthToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for AuthToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Configuration options for the Deform client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project identifier, the first label of the API host
    pub project: String,
    /// Collection holding the documents
    pub collection: String,
    /// API token, sent as `Authorization: Token <token>`
    pub token: AuthToken,
    /// Service host (default: deform.io)
    pub host: String,
    /// Full API base URL, replacing `https://<project>.<host>/api` when set
    pub api_base: Option<String>,
    /// Per-request timeout in milliseconds (default: none)
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            collection: String::new(),
            token: AuthToken::default(),
            host: DEFAULT_HOST.to_string(),
            api_base: None,
            timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Create a config for `project`/`collection` with default host and no timeout
    pub fn new(project: &str, collection: &str, token: &str) -> Self {
        Self {
            project: project.to_string(),
            collection: collection.to_string(),
            token: AuthToken::from(token),
            ..Default::default()
        }
    }

    /// Load configuration from `DEFORM_*` environment variables
    pub fn from_env() -> Result<Self, String> {
        let project = required("DEFORM_PROJECT")?;
        let collection = required("DEFORM_COLLECTION")?;
        let token = required("DEFORM_TOKEN")?;
        let host = env::var("DEFORM_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let api_base = env::var("DEFORM_API_BASE").ok().filter(|s| !s.is_empty());

        let timeout_ms = env::var("DEFORM_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok());

        Ok(ClientConfig {
            project,
            collection,
            token: AuthToken::new(token),
            host,
            api_base,
            timeout_ms,
        })
    }
}

fn required(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{} environment variable must be set", name))
}
