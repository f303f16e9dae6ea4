//! The request pipeline and the Article Eater endpoint calls built on it.
//!
//! Every endpoint goes through [`ArticleEaterClient::request`], which:
//!
//! 1. joins the endpoint path onto the configured base URL
//! 2. sends `Content-Type: application/json` unless the caller overrides it
//! 3. sets `Authorization: Bearer <token>` whenever a credential was stored,
//!    replacing any caller-supplied value
//! 4. returns the parsed JSON body on a 2xx status
//! 5. otherwise returns an [`ApiError`] carrying a single message, after
//!    reporting it to the injected [`Notifier`]
//!
//! # Example
//!
//! ```rust,no_run
//! use article_eater_client::api::ArticleEaterClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArticleEaterClient::builder()
//!     .base_url("http://localhost:8000")
//!     .build()?;
//!
//! let health = client.health_check().await?;
//! println!("{}", health["status"]);
//! # Ok(())
//! # }
//! ```

mod endpoints;
mod error;

pub use error::{ApiError, PARSE_ERROR_MESSAGE};

use hyper::ext::ReasonPhrase;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::notify::{Notifier, TracingNotifier};
use crate::storage::{CredentialStore, FileStore, CREDENTIAL_KEY};
use crate::utils::{HttpClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Method, body and extra headers for one pipeline call
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method (GET unless set)
    pub method: Method,

    /// JSON body, serialized as-is
    pub body: Option<Value>,

    /// Extra headers; later entries win over earlier ones and over the defaults
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self::with_body(Method::POST, body)
    }

    pub fn patch(body: Value) -> Self {
        Self::with_body(Method::PATCH, body)
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn with_body(method: Method, body: Value) -> Self {
        Self {
            method,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Client for the Article Eater backend.
///
/// Holds an immutable snapshot of the credential taken when the client was
/// built; [`ArticleEaterClient::reload_credential`] takes a new one.
#[derive(Debug, Clone)]
pub struct ArticleEaterClient {
    base_url: String,
    http: HttpClient,
    credential: Option<String>,
    credential_key: String,
    store: Option<Arc<dyn CredentialStore>>,
    notifier: Arc<dyn Notifier>,
}

impl ArticleEaterClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build a client from configuration, reading the credential from the
    /// configured file store unless the config carries one directly.
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let store = FileStore::new(config.storage.resolved_path());

        let mut builder = ClientBuilder::new()
            .base_url(&config.api.base_url)
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .credential_key(&config.storage.credential_key)
            .credential_store(Arc::new(store))
            .notifier(notifier);

        if let Some(user_agent) = &config.api.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(api_key) = &config.api.api_key {
            builder = builder.credential(api_key);
        }

        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests will carry an Authorization header
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Re-read the credential from the store the client was built with.
    ///
    /// Returns whether a credential is now present. Clients built without a
    /// store keep their current credential.
    pub fn reload_credential(&mut self) -> Result<bool, ApiError> {
        if let Some(store) = &self.store {
            self.credential = read_credential(store.as_ref(), &self.credential_key)?;
        }
        Ok(self.credential.is_some())
    }

    /// Replace the credential snapshot directly
    pub fn set_credential(&mut self, credential: Option<String>) {
        self.credential = credential.filter(|c| !c.is_empty());
    }

    /// Send one request to `endpoint` (a path such as `/jobs/`) and return the
    /// parsed JSON body.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let result = self.send(endpoint, options).await;

        if let Err(err) = &result {
            self.notifier.diagnostic(endpoint, err);
        }

        result
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = self.build_headers(&options.headers)?;

        tracing::debug!(method = %options.method, url = %url, "Sending API request");

        let mut request = self
            .http
            .client()
            .request(options.method, &url)
            .headers(headers);

        if let Some(body) = &options.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
            request = request.body(bytes);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let reason = response
                .extensions()
                .get::<ReasonPhrase>()
                .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, reason.as_deref(), &body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn build_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("header '{}': {}", name.as_str(), e)))?;
            headers.insert(name, value);
        }

        if let Some(token) = &self.credential {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidRequest("stored credential is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

/// Builder for [`ArticleEaterClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    user_agent: String,
    timeout: Duration,
    credential: Option<String>,
    credential_key: String,
    store: Option<Arc<dyn CredentialStore>>,
    notifier: Arc<dyn Notifier>,
    http: Option<HttpClient>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            credential: None,
            credential_key: CREDENTIAL_KEY.to_string(),
            store: None,
            notifier: Arc::new(TracingNotifier),
            http: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use this credential instead of reading one from the store
    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Key the credential is read from (defaults to [`CREDENTIAL_KEY`])
    pub fn credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential_key = key.into();
        self
    }

    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Reuse an existing HTTP client; user agent and timeout are then ignored
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<ArticleEaterClient, ApiError> {
        let base_url = normalize_base_url(&self.base_url)?;

        let http = match self.http {
            Some(http) => http,
            None => HttpClient::with_options(&self.user_agent, self.timeout)?,
        };

        let credential = match (self.credential, &self.store) {
            (Some(credential), _) => Some(credential).filter(|c| !c.is_empty()),
            (None, Some(store)) => read_credential(store.as_ref(), &self.credential_key)?,
            (None, None) => None,
        };

        tracing::debug!(
            base_url = %base_url,
            authenticated = credential.is_some(),
            "Built Article Eater client"
        );

        Ok(ArticleEaterClient {
            base_url,
            http,
            credential,
            credential_key: self.credential_key,
            store: self.store,
            notifier: self.notifier,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn read_credential(store: &dyn CredentialStore, key: &str) -> Result<Option<String>, ApiError> {
    Ok(store.get(key)?.filter(|c| !c.is_empty()))
}

/// Validate the base URL and strip any trailing slash so endpoint paths join cleanly.
fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let trimmed = base_url.trim().trim_end_matches('/');

    let parsed = url::Url::parse(trimmed)
        .map_err(|e| ApiError::InvalidRequest(format!("base URL '{}': {}", base_url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ApiError::InvalidRequest(format!(
            "base URL '{}': unsupported scheme {}",
            base_url, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn client_with_token(token: Option<&str>) -> ArticleEaterClient {
        let mut builder = ArticleEaterClient::builder().base_url("http://localhost:8000/");
        if let Some(token) = token {
            builder = builder.credential(token);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = client_with_token(None);
        assert_eq!(client.base_url(), "http://localhost:8000");

        assert!(normalize_base_url("not a url").is_err());
        assert!(normalize_base_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_default_headers_without_credential() {
        let client = client_with_token(None);
        let headers = client.build_headers(&[]).unwrap();

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let client = client_with_token(None);
        let headers = client
            .build_headers(&[
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("X-Trace".to_string(), "abc".to_string()),
            ])
            .unwrap();

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("x-trace").unwrap(), "abc");
    }

    #[test]
    fn test_credential_overwrites_caller_authorization() {
        let client = client_with_token(Some("ae-123"));
        let headers = client
            .build_headers(&[("authorization".to_string(), "Basic xyz".to_string())])
            .unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer ae-123");
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_caller_authorization_kept_without_credential() {
        let client = client_with_token(None);
        let headers = client
            .build_headers(&[("Authorization".to_string(), "Basic xyz".to_string())])
            .unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Basic xyz");
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let client = client_with_token(None);
        let result = client.build_headers(&[("bad header".to_string(), "x".to_string())]);
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_credential_read_from_store_and_reloaded() {
        let store = Arc::new(MemoryStore::new());
        let mut client = ArticleEaterClient::builder()
            .credential_store(store.clone())
            .build()
            .unwrap();
        assert!(!client.has_credential());

        store.set(CREDENTIAL_KEY, "fresh");
        // The snapshot does not change until it is reloaded.
        assert!(!client.has_credential());
        assert!(client.reload_credential().unwrap());

        store.remove(CREDENTIAL_KEY);
        assert!(!client.reload_credential().unwrap());
    }

    #[test]
    fn test_empty_credential_is_treated_as_absent() {
        let client = client_with_token(Some(""));
        assert!(!client.has_credential());
    }

    #[test]
    fn test_request_options_builders() {
        let options = RequestOptions::get();
        assert_eq!(options.method, Method::GET);
        assert!(options.body.is_none());

        let options = RequestOptions::post(serde_json::json!({"a": 1})).header("X-Id", "7");
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.headers, vec![("X-Id".to_string(), "7".to_string())]);

        assert_eq!(RequestOptions::delete().method, Method::DELETE);
    }
}
