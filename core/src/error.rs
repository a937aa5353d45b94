//! Error types for the user API client.
//!
//! # Design
//! Failures are a tagged enum instead of an "error with optional nested
//! fields" that callers probe. The API client matches on the tag to pick a
//! human-readable message and hands only that message to controllers as a
//! `ServiceError`; status codes and field maps never leave this layer.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors produced while executing and interpreting a user API call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server rejected the payload with per-field validation messages.
    #[error("validation failed: {fields:?}")]
    Validation {
        message: Option<String>,
        fields: BTreeMap<String, String>,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be encoded, sent, or its response decoded.
    #[error("{0}")]
    Unknown(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http { status: 404, .. })
    }

    /// The message the server put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            ApiError::Validation { message, .. } | ApiError::Http { message, .. } => message.as_deref(),
            ApiError::Network(_) | ApiError::Unknown(_) => None,
        };
        message.filter(|m| !m.trim().is_empty())
    }

    /// Generic, transport-level description of the failure.
    pub fn transport_message(&self) -> String {
        match self {
            ApiError::Validation { .. } => "Request failed with status code 400".to_string(),
            ApiError::Http { status, .. } => format!("Request failed with status code {status}"),
            ApiError::Network(_) => "Network Error".to_string(),
            ApiError::Unknown(msg) => msg.clone(),
        }
    }

    /// Collapse the failure into one line for display.
    ///
    /// Priority: the server's own message, then the transport message, then
    /// `fallback` when neither has any text.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        let generic = self.transport_message();
        if generic.trim().is_empty() {
            fallback.to_string()
        } else {
            generic
        }
    }
}

/// Failure to obtain any HTTP response at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request was sent but nothing came back (refused, reset, DNS, timeout).
    #[error("no response received: {0}")]
    Network(String),

    /// The request could not be constructed or dispatched.
    #[error("{0}")]
    Setup(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(msg) => ApiError::Network(msg),
            TransportError::Setup(msg) => ApiError::Unknown(msg),
        }
    }
}

/// The single message a failed API call surfaces to a controller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Client-side field validation failures, keyed by form field name.
#[derive(Debug, Clone, Default, Error, PartialEq, Eq)]
#[error("validation errors: {errors:?}")]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn on(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}
