//! HTTP transport: plain-data requests and responses, plus the one
//! configured client that executes them.
//!
//! # Design
//! `UserClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. Executing a request is the job of a
//! `Transport`; `HttpTransport` is the production implementation, tests swap
//! in their own. `HttpTransport` observes every exchange (request logging,
//! response logging, status-code branching for 401/403/404, network failures)
//! but never changes the outcome: interpretation stays with the client.
//!
//! All fields use owned types (`String`, `Vec`) so values move freely between
//! the builder, the transport and the parser.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `UserClient::build_*` methods; `path` is the absolute URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport`, then passed to `UserClient::parse_*` methods.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one request and returns whatever the server answered.
///
/// Non-2xx statuses are responses, not errors. `Err` means no response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Coarse classification the response hook branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Unauthorized,
    Forbidden,
    NotFound,
    Failure,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            401 => StatusClass::Unauthorized,
            403 => StatusClass::Forbidden,
            404 => StatusClass::NotFound,
            _ => StatusClass::Failure,
        }
    }
}

/// The configured HTTP client shared by all user API operations.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        debug!(base_url = %config.base_url, "created HTTP transport");

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        observe_request(&request);

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.path.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                error!(error = %e, "error setting up request");
                TransportError::Setup(e.to_string())
            } else {
                error!(error = %e, "network error: no response received from server");
                TransportError::Network(e.to_string())
            }
        })?;

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
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "network error: response body was not received");
            TransportError::Network(e.to_string())
        })?;

        let response = HttpResponse { status, headers, body };
        observe_response(&response);
        Ok(response)
    }
}

fn observe_request(request: &HttpRequest) {
    debug!(
        method = request.method.as_str(),
        url = %request.path,
        body = %loggable_body(request.body.as_deref()),
        "starting request"
    );
}

/// Request body as it may appear in logs. A `password` member is masked; a
/// body that is not a JSON object is reduced to its length.
fn loggable_body(body: Option<&str>) -> String {
    let Some(body) = body else {
        return String::new();
    };
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(mut map)) => {
            if let Some(password) = map.get_mut("password") {
                *password = serde_json::Value::String("***".to_string());
            }
            serde_json::Value::Object(map).to_string()
        }
        _ => format!("<{} bytes>", body.len()),
    }
}

fn observe_response(response: &HttpResponse) -> StatusClass {
    let class = StatusClass::of(response.status);
    match class {
        StatusClass::Success => {
            debug!(status = response.status, body = %response.body, "response received");
        }
        StatusClass::Unauthorized => {
            warn!(status = response.status, "unauthorized access; a fresh login is required");
        }
        StatusClass::Forbidden => warn!(status = response.status, "forbidden access"),
        StatusClass::NotFound => warn!(status = response.status, "resource not found"),
        StatusClass::Failure => {
            warn!(status = response.status, body = %response.body, "request failed");
        }
    }
    class
}
