//! HTTP transport for the remote file-browser API.
//!
//! The API is a single endpoint taking a `cmd` parameter. Commands that only
//! carry parameters send them form-encoded; `view` and `upload` put them in
//! the query string, and `upload` carries the file bytes as the raw body.

use crate::error::{HttpApiFsError, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Raw(Vec<u8>),
}

/// A single command against the API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// A command whose `cmd` and parameters travel in a form-encoded body.
    pub fn form(cmd: &str, params: &[(&str, &str)]) -> Self {
        let mut fields = vec![("cmd".to_string(), cmd.to_string())];
        fields.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Self {
            query: Vec::new(),
            body: RequestBody::Form(fields),
            headers: Vec::new(),
        }
    }

    /// A command whose `cmd` and parameters travel in the query string.
    pub fn query(cmd: &str, params: &[(&str, &str)]) -> Self {
        let mut query = vec![("cmd".to_string(), cmd.to_string())];
        query.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Self {
            query,
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }

    pub fn with_body(mut self, data: Vec<u8>) -> Self {
        self.body = RequestBody::Raw(data);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Looks a parameter up in the query string first, then in the form body.
    pub fn param(&self, key: &str) -> Option<&str> {
        let from_query = self.query.iter().find(|(k, _)| k == key);
        let from_form = match &self.body {
            RequestBody::Form(fields) => fields.iter().find(|(k, _)| k == key),
            _ => None,
        };
        from_query.or(from_form).map(|(_, v)| v.as_str())
    }

    pub fn command(&self) -> &str {
        self.param("cmd").unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn raw_body(&self) -> &[u8] {
        match &self.body {
            RequestBody::Raw(data) => data,
            _ => &[],
        }
    }
}

/// Issues API requests and returns the raw response body.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        (**self).execute(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// API endpoint URL
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Whole-request timeout; `None` leaves requests unbounded
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            timeout: None,
            connect_timeout: None,
        }
    }

    /// Basic credentials, present only when both parts are non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Blocking transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| HttpApiFsError::remote("connect", e))?;
        Ok(Self { client, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let cmd = request.command();
        debug!("HTTP {} {} query={:?}", cmd, self.config.url, request.query);

        let mut builder = self.client.post(&self.config.url).query(&request.query);
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpApiFsError::remote(cmd, e))?;
            // Paths may be non-ASCII; from_bytes accepts UTF-8 octets.
            let value = HeaderValue::from_bytes(value.as_bytes())
                .map_err(|e| HttpApiFsError::remote(cmd, e))?;
            builder = builder.header(name, value);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Raw(data) => builder.body(data.clone()),
        };
        if let Some((user, pass)) = self.config.credentials() {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder
            .send()
            .map_err(|e| HttpApiFsError::remote(cmd, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpApiFsError::remote(cmd, format!("HTTP status {}", status)));
        }
        let body = response
            .bytes()
            .map_err(|e| HttpApiFsError::remote(cmd, e))?;
        Ok(body.to_vec())
    }
}
