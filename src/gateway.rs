//! HTTP gateway to the wallet API.
//!
//! Every call produces exactly one [`Outcome`]. Reachable servers never cause
//! an `Err`: unparseable bodies degrade to a `{"detail": <raw text>}` payload
//! and non-2xx statuses are reported as [`Outcome::Failure`] with a normalized
//! message. Only a request that got no response at all returns
//! [`ShellError::Unreachable`].

use crate::config::Config;
use crate::credential_store::{CredentialScope, CredentialStore};
use crate::error::{normalize_error, ShellError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub use reqwest::Method;

/// Which credential, if any, a request is sent with. Never both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthScope {
    #[default]
    None,
    User,
    Admin,
}

impl AuthScope {
    fn credential(&self) -> Option<CredentialScope> {
        match self {
            AuthScope::None => None,
            AuthScope::User => Some(CredentialScope::User),
            AuthScope::Admin => Some(CredentialScope::Admin),
        }
    }
}

/// Description of a single API call, built per call and never persisted.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Raw path segments below the API prefix; encoded when the URL is built.
    pub path: Vec<String>,
    /// Query-string pairs, form-encoded onto the URL.
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub scope: AuthScope,
    pub extra_headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new<S: Into<String>>(method: Method, path: impl IntoIterator<Item = S>) -> Self {
        Self {
            method,
            path: path.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
            scope: AuthScope::None,
            extra_headers: Vec::new(),
        }
    }

    pub fn get<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn scope(mut self, scope: AuthScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// `/a/b/c` form for logs.
    pub fn display_path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

/// A fully built request, ready for a [`Transport`].
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Status plus raw body text, before any parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Result of a reachable call.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success { status: u16, data: Value },
    Failure { status: u16, message: String },
}

impl Outcome {
    /// Classify a raw response by its status code.
    pub fn from_response(status: u16, raw: &str) -> Self {
        let parsed = parse_body(raw);
        if (200..300).contains(&status) {
            Outcome::Success {
                status,
                data: parsed.unwrap_or(Value::Null),
            }
        } else {
            Outcome::Failure {
                status,
                message: normalize_error(parsed.as_ref(), status),
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            Outcome::Success { status, .. } | Outcome::Failure { status, .. } => *status,
        }
    }

    pub fn into_result(self) -> Result<Value, ShellError> {
        match self {
            Outcome::Success { data, .. } => Ok(data),
            Outcome::Failure { status, message } => Err(ShellError::Rejected { status, message }),
        }
    }
}

/// `None` when there is nothing to parse; non-JSON text is wrapped as `{"detail": text}`.
fn parse_body(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(_) => Some(json!({ "detail": raw })),
    }
}

/// Moves an [`HttpRequest`] over the wire.
///
/// Implementations return `Err` only when no response was obtained.
pub trait Transport: Clone + Send + Sync + 'static {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ShellError>> + Send;
}

/// `reqwest`-backed transport used by the application.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ShellError>> + Send {
        let client = self.client.clone();
        async move {
            let mut builder = client
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(ShellError::unreachable)?;
            let status = response.status().as_u16();
            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to read response body (status {}): {}", status, e);
                    String::new()
                }
            };
            Ok(HttpResponse { status, body })
        }
    }
}

/// Attaches credentials, sends requests and classifies responses.
#[derive(Clone)]
pub struct Gateway<T> {
    transport: T,
    config: Arc<Config>,
    credentials: CredentialStore,
}

impl<T: Transport> Gateway<T> {
    pub fn new(transport: T, config: Config, credentials: CredentialStore) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            credentials,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Build the wire request for `descriptor`, reading the credential store now.
    ///
    /// Credential headers supplied through `extra_headers` are dropped: the
    /// only way to authenticate a request is its [`AuthScope`].
    pub fn build(&self, descriptor: &RequestDescriptor) -> HttpRequest {
        let admin_header = HeaderName::from_bytes(self.config.admin_header.as_bytes()).ok();
        let mut headers = HeaderMap::new();

        for (name, value) in &descriptor.extra_headers {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) else {
                tracing::warn!("Skipping malformed header {:?}", name);
                continue;
            };
            if name == AUTHORIZATION || Some(&name) == admin_header.as_ref() {
                tracing::warn!("Ignoring credential header {} passed as an extra header", name);
                continue;
            }
            headers.insert(name, value);
        }

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let body = descriptor.body.as_ref().map(|value| {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            value.to_string()
        });

        if let Some(scope) = descriptor.scope.credential() {
            let token = self.credentials.get(scope);
            if !token.is_empty() {
                let (name, raw) = match scope {
                    CredentialScope::User => (Some(AUTHORIZATION), format!("Bearer {}", token)),
                    CredentialScope::Admin => (admin_header.clone(), token),
                };
                match (name, HeaderValue::from_str(&raw)) {
                    (Some(name), Ok(mut value)) => {
                        value.set_sensitive(true);
                        headers.insert(name, value);
                    }
                    _ => tracing::warn!(
                        "Stored {} token cannot be sent as a header; sending request without it",
                        scope.label()
                    ),
                }
            }
        }

        let mut url = self.config.endpoint(&descriptor.path);
        if !descriptor.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&descriptor.query);
        }

        HttpRequest {
            method: descriptor.method.clone(),
            url,
            headers,
            body,
        }
    }

    /// Send `descriptor` and classify the response.
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Outcome, ShellError> {
        let request = self.build(&descriptor);
        tracing::debug!(
            method = %descriptor.method,
            path = %descriptor.display_path(),
            scope = ?descriptor.scope,
            "dispatching request"
        );

        let response = self.transport.execute(request).await?;
        let outcome = Outcome::from_response(response.status, &response.body);
        if let Outcome::Failure { status, message } = &outcome {
            tracing::warn!("{} {} failed ({}): {}", descriptor.method, descriptor.display_path(), status, message);
        }
        Ok(outcome)
    }
}
