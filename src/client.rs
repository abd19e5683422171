//! HTTP client implementation for Deform collections

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::endpoint;
use crate::error::{Error, Result};
use crate::types::Document;

/// Build a rustls ClientConfig verifying against the webpki root store.
fn build_tls_config() -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    Ok(rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Tls(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// Flatten an error and its sources into one line.
fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// A single DNS label: ASCII alphanumerics and `-`, not starting or ending with `-`.
fn is_host_label(label: &str) -> bool {
    label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// Key-value client for one Deform collection
///
/// Each key is stored as a document `{"_id": key, "value": value}` under
/// `https://<project>.deform.io/api/collections/<collection>/documents/<key>/`.
/// The client is cheap to clone and safe to share between tasks: the
/// configuration is immutable and every call builds its own request on a
/// shared connection pool.
///
/// # Example
/// ```rust,no_run
/// use deform_kv::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), deform_kv::Error> {
///     let client = Client::new("kvproject", "settings", "your-token")?;
///
///     client.set("theme", "dark").await?;
///     let theme = client.get("theme").await?;
///     assert_eq!(theme, "dark");
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    api_endpoint: Arc<str>,
    http_client: HttpClient<HttpsConnector, Full<Bytes>>,
}

impl Client {
    /// Create a client for `collection` in `project`
    ///
    /// # Errors
    /// Returns [`Error::InvalidUrl`] if the project or collection cannot form a valid URL
    pub fn new(project: &str, collection: &str, token: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(project, collection, token))
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        if config.api_base.is_none() {
            if config.project.is_empty() {
                return Err(Error::InvalidUrl("project must not be empty".to_string()));
            }
            // The project becomes a host label; anything else could redirect the token.
            if !is_host_label(&config.project) {
                return Err(Error::InvalidUrl(format!(
                    "project '{}' must contain only ASCII letters, digits and '-'",
                    config.project
                )));
            }
        }
        if config.collection.is_empty() {
            return Err(Error::InvalidUrl("collection must not be empty".to_string()));
        }

        let api_endpoint = endpoint::api_endpoint(&config);
        let collection_url = endpoint::collection_url(&api_endpoint, &config.collection);
        let uri: Uri = collection_url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("Invalid API endpoint '{}': {}", api_endpoint, e)))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(Error::InvalidUrl(format!(
                "API endpoint '{}' must be an absolute URL",
                api_endpoint
            )));
        }

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(build_tls_config()?)
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let http_client = HttpClient::builder(TokioExecutor::new()).build(https_connector);

        debug!("Deform client ready for {}", collection_url);

        Ok(Self {
            config: Arc::new(config),
            api_endpoint: Arc::from(api_endpoint),
            http_client,
        })
    }

    /// Project identifier
    pub fn project(&self) -> &str {
        &self.config.project
    }

    /// Collection identifier
    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    /// API root every document URL is built from
    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    /// URL of the document stored under `key`
    pub fn document_url(&self, key: &str) -> String {
        endpoint::document_url(&self.api_endpoint, &self.config.collection, key)
    }

    /// Send one request and read the whole body, honouring the configured timeout.
    async fn exchange(&self, method: Method, key: &str, body: Bytes) -> Result<(StatusCode, String)> {
        let round_trip = self.round_trip(method, key, body);
        match self.config.timeout_ms {
            Some(timeout_ms) => tokio::time::timeout(Duration::from_millis(timeout_ms), round_trip)
                .await
                .map_err(|_| Error::Timeout {
                    key: key.to_string(),
                    timeout_ms,
                })?,
            None => round_trip.await,
        }
    }

    async fn round_trip(&self, method: Method, key: &str, body: Bytes) -> Result<(StatusCode, String)> {
        let url = self.document_url(key);
        let uri: Uri = url.parse().map_err(|e| Error::InvalidRequest {
            key: key.to_string(),
            message: format!("Invalid document URL '{}': {}", url, e),
        })?;

        let req = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(AUTHORIZATION, format!("Token {}", self.config.token.as_str()))
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(body))
            .map_err(|e| Error::InvalidRequest {
                key: key.to_string(),
                message: format!("Failed to build request: {}", e),
            })?;

        debug!("Sending request: {} {}", method, url);

        let response = self
            .http_client
            .request(req)
            .await
            .map_err(|e| Error::Transport {
                key: key.to_string(),
                message: describe(&e),
            })?;

        let status = response.status();
        debug!("Received {} for {} {}", status, method, url);

        // The body is consumed here; the response is released on every path out.
        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::ReadBody {
                key: key.to_string(),
                message: describe(&e),
            })?;

        // Never fail on encoding: the status decides, invalid bytes become U+FFFD.
        let text = String::from_utf8_lossy(&collected.to_bytes()).into_owned();

        Ok((status, text))
    }

    /// Map any status other than 200/201 to [`Error::Remote`] carrying the raw body.
    fn check_status(key: &str, status: StatusCode, body: String) -> Result<String> {
        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(body);
        }

        warn!("Deform rejected request for key '{}' with status {}", key, status);
        Err(Error::Remote {
            key: key.to_string(),
            status: status.as_u16(),
            message: body,
        })
    }

    /// Retrieve the value stored under `key`
    ///
    /// # Errors
    /// - [`Error::Transport`] if no response was received
    /// - [`Error::ReadBody`] if the response body could not be read
    /// - [`Error::Remote`] if the status is not 200/201; the message is the raw body
    /// - [`Error::Decode`] if the body is not a document
    ///
    /// # Example
    /// ```rust,no_run
    /// # use deform_kv::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), deform_kv::Error> {
    /// # let client = Client::new("kvproject", "settings", "token")?;
    /// match client.get("theme").await {
    ///     Ok(theme) => println!("Theme: {}", theme),
    ///     Err(e) if e.is_not_found() => println!("No theme stored"),
    ///     Err(e) => return Err(e),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, key: &str) -> Result<String> {
        let (status, body) = self.exchange(Method::GET, key, Bytes::new()).await?;
        let body = Self::check_status(key, status, body)?;

        let document: Document = serde_json::from_str(&body).map_err(|source| Error::Decode {
            key: key.to_string(),
            source,
        })?;

        Ok(document.value)
    }

    /// Store `value` under `key`, replacing any existing document
    ///
    /// # Errors
    /// - [`Error::Encode`] if the document cannot be serialized
    /// - [`Error::Transport`] if no response was received
    /// - [`Error::Remote`] if the status is not 200/201; the message is the raw body
    ///
    /// # Example
    /// ```rust,no_run
    /// # use deform_kv::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), deform_kv::Error> {
    /// # let client = Client::new("kvproject", "settings", "token")?;
    /// client.set("theme", "dark").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let document = Document::new(key, value);
        let json = serde_json::to_vec(&document).map_err(|source| Error::Encode {
            key: key.to_string(),
            source,
        })?;

        let (status, body) = self.exchange(Method::PUT, key, Bytes::from(json)).await?;
        Self::check_status(key, status, body)?;
        Ok(())
    }
}
