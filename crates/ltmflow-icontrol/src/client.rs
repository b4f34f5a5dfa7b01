//! iControl REST client
//!
//! Speaks JSON over HTTPS with Basic authentication and implements the
//! core [`Transport`] seam so the reconciler can drive a real appliance.

use crate::error::{IControlError, Result};
use async_trait::async_trait;
use ltmflow_core::{Method, Request, Response, Transport, TransportError};
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;

pub const DEFAULT_API_ROOT: &str = "mgmt/tm";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one appliance
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Hostname or address, optionally with `:port`
    pub host: String,
    pub username: String,
    pub password: String,
    pub api_root: String,
    pub scheme: String,
    /// Skip certificate validation (self-signed management certificates)
    pub insecure: bool,
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            api_root: DEFAULT_API_ROOT.to_string(),
            scheme: "https".to_string(),
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `https://<host>/<api-root>/`, always with a trailing slash
    pub fn base_url(&self) -> Result<Url> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(IControlError::InvalidConfig("host must not be empty".to_string()));
        }
        if host.contains("://") {
            return Err(IControlError::InvalidConfig(format!(
                "host '{}' must not include a scheme",
                host
            )));
        }

        let root = self.api_root.trim_matches('/');
        let raw = if root.is_empty() {
            format!("{}://{}/", self.scheme, host)
        } else {
            format!("{}://{}/{}/", self.scheme, host, root)
        };
        Url::parse(&raw)
            .map_err(|e| IControlError::InvalidConfig(format!("invalid base url '{}': {}", raw, e)))
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_root", &self.api_root)
            .field("scheme", &self.scheme)
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client bound to one appliance
pub struct IControlClient {
    client: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
}

impl IControlClient {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if config.insecure {
            tracing::warn!(
                "Certificate validation disabled for {}",
                base_url.host_str().unwrap_or(config.host.as_str())
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            client,
            base_url,
            username: config.username,
            password: config.password,
        })
    }

    /// Resolve a path relative to the API root
    pub fn url(&self, path: &str) -> std::result::Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Other(format!("invalid path '{}': {}", path, e)))
    }

    /// GET a path and decode the JSON body, failing on non-200 statuses
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let response = self.send(Request::get(path)).await?;
        if response.status != 200 {
            return Err(IControlError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.json()?)
    }
}

#[async_trait]
impl Transport for IControlClient {
    async fn send(&self, request: Request) -> std::result::Result<Response, TransportError> {
        let url = self.url(&request.path)?;
        tracing::debug!("{} {}", request.method, url);

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };
        let builder = builder.basic_auth(&self.username, Some(&self.password));
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            TransportError::MalformedBody(format!("failed to read response body: {}", e))
        })?;

        tracing::debug!("{} {} -> {}", request.method, request.path, status);
        Ok(Response::new(status, body))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
