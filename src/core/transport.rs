//! HTTP transport abstraction and the authentication policy pipeline
//!
//! The transport is injected into the client (no process-wide singleton) so
//! tests can substitute an in-memory implementation. Policies are pure
//! `(request) -> request` transformations applied in order before send.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::core::config::{ApiVersion, Credential, TranslatorConfig};
use crate::core::errors::Result;

/// HTTP method of an outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET request
    Get,
    /// POST request
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// An outbound request before it is handed to the transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Full request URL including query parameters
    pub url: Url,
    /// Request headers in insertion order
    pub headers: Vec<(String, String)>,
    /// Request body, if any
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Build a GET request
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    /// Build a POST request carrying a JSON body
    pub fn post_json<T: Serialize>(url: Url, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)?;
        Ok(Self {
            method: Method::Post,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(bytes),
        })
    }

    /// Return a copy with the given header appended
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Return a copy with the given query parameter appended
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }
}

/// A response as seen by the decoder
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    headers: HashMap<String, String>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response; header names are stored lowercased
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Look up a header value, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The body decoded as UTF-8, lossily
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The underlying HTTP transport: send one request, receive one response.
///
/// Implementations must map connection-level failures to
/// [`TranslatorError::TransportError`]; non-success status codes are not
/// transport errors and come back as ordinary responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and wait for the response
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Real transport backed by [`reqwest`]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given per-request timeout
    pub fn new(timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}

/// A pure request transformation applied before send
pub trait Policy: Send + Sync {
    /// Transform the request; must not depend on anything but the request
    /// and the policy's own immutable configuration
    fn apply(&self, request: HttpRequest) -> HttpRequest;
}

/// Injects subscription key and region headers
pub struct KeyCredentialPolicy {
    key: String,
    region: String,
}

impl Policy for KeyCredentialPolicy {
    fn apply(&self, request: HttpRequest) -> HttpRequest {
        request
            .with_header("Ocp-Apim-Subscription-Key", self.key.as_str())
            .with_header("Ocp-Apim-Subscription-Region", self.region.as_str())
    }
}

/// Injects an OAuth bearer token
pub struct BearerTokenPolicy {
    token: String,
}

impl Policy for BearerTokenPolicy {
    fn apply(&self, request: HttpRequest) -> HttpRequest {
        request.with_header("Authorization", format!("Bearer {}", self.token))
    }
}

/// Appends the `api-version` query parameter
pub struct ApiVersionPolicy {
    version: ApiVersion,
}

impl Policy for ApiVersionPolicy {
    fn apply(&self, request: HttpRequest) -> HttpRequest {
        // operation-location URLs handed back by the service may already
        // carry an api-version parameter
        let present = request.url.query_pairs().any(|(k, _)| k == "api-version");
        if present {
            request
        } else {
            request.with_query("api-version", self.version.as_str())
        }
    }
}

/// An ordered policy list over an injected transport.
///
/// Cheap to clone; clones share the same transport.
#[derive(Clone)]
pub struct Pipeline {
    policies: Arc<Vec<Box<dyn Policy>>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Build the policy chain for the given configuration: exactly one
    /// authentication policy followed by the API version policy
    pub fn new(config: &TranslatorConfig, transport: Arc<dyn Transport>) -> Self {
        let auth: Box<dyn Policy> = match &config.credential {
            Credential::SubscriptionKey { key, region } => Box::new(KeyCredentialPolicy {
                key: key.clone(),
                region: region.clone(),
            }),
            Credential::BearerToken(token) => Box::new(BearerTokenPolicy {
                token: token.clone(),
            }),
        };

        let policies: Vec<Box<dyn Policy>> = vec![
            auth,
            Box::new(ApiVersionPolicy {
                version: config.api_version,
            }),
        ];

        Self {
            policies: Arc::new(policies),
            transport,
        }
    }

    /// Apply every policy in order, then send through the transport
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self
            .policies
            .iter()
            .fold(request, |req, policy| policy.apply(req));

        debug!("sending {} {}", request.method, request.url);

        let response = self.transport.send(request).await?;

        debug!("received status {}", response.status);

        Ok(response)
    }
}
