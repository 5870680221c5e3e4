//! # SMS Core
//!
//! Core traits and types shared by the voipms-notify crates.
//!
//! This crate provides the building blocks for outbound notifications:
//! - [`SmsClient`] trait for sending text and picture messages
//! - [`ActionHandler`] trait and [`ActionRegistry`] for host-invoked actions
//! - Common types for requests, responses, and errors
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//!
//! // Any gateway implements SmsClient
//! let response = client
//!     .send_text(SendRequest::text("9876543210", "Front door opened"))
//!     .await?;
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Errors that can occur during a send
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// Required field missing or empty
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Picture message references a path that does not exist
    #[error("image file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// Image file exists but could not be read
    #[error("io error: {0}")]
    Io(String),
    /// Network, DNS or timeout failure talking to the gateway
    #[error("transport error: {0}")]
    Transport(String),
    /// Gateway answered but did not accept the message
    #[error("provider failure (HTTP {status}): {body}")]
    ProviderFailure { status: u16, body: String },
    /// Unexpected error occurred
    #[error("unexpected: {0}")]
    Unexpected(String),
}

/// Result of one send attempt.
pub type Outcome = Result<SendResponse, SmsError>;

#[derive(Debug, Clone, Serialize)]
pub struct SendRequest<'a> {
    pub recipient: &'a str,
    pub message: &'a str,
    pub image_path: Option<&'a Path>,
}

impl<'a> SendRequest<'a> {
    pub fn text(recipient: &'a str, message: &'a str) -> Self {
        Self {
            recipient,
            message,
            image_path: None,
        }
    }

    pub fn picture(recipient: &'a str, message: &'a str, image_path: &'a Path) -> Self {
        Self {
            recipient,
            message,
            image_path: Some(image_path),
        }
    }

    /// Checks the fields every message needs.
    pub fn validate_text(&self) -> Result<(), SmsError> {
        if self.recipient.is_empty() || self.message.is_empty() {
            return Err(SmsError::InvalidRequest(
                "recipient and message must be provided".into(),
            ));
        }
        Ok(())
    }

    /// Checks the text fields plus a non-empty image path, returning the path.
    pub fn validate_picture(&self) -> Result<&'a Path, SmsError> {
        let path = self
            .image_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                SmsError::InvalidRequest(
                    "recipient, message and image path must be provided".into(),
                )
            })?;
        if self.recipient.is_empty() || self.message.is_empty() {
            return Err(SmsError::InvalidRequest(
                "recipient, message and image path must be provided".into(),
            ));
        }
        Ok(path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendResponse {
    pub id: String,
    /// Name of the gateway that produced the response, e.g. "voipms".
    pub provider: &'static str,
    /// Raw provider payload for debugging / audit.
    pub raw: serde_json::Value,
}

/// Status and body of one gateway round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body parsed as JSON, or `{"raw": body}` when it is not JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| serde_json::json!({ "raw": self.body }))
    }
}

#[async_trait]
pub trait SmsClient: Send + Sync {
    /// Stable provider key, e.g. "voipms".
    fn provider(&self) -> &'static str;

    /// Send a single text message.
    async fn send_text(&self, req: SendRequest<'_>) -> Outcome;

    /// Send a single picture message with one attached image.
    async fn send_picture(&self, req: SendRequest<'_>) -> Outcome;
}

/// Utility to create a pseudo id if a provider doesn't return one.
pub fn fallback_id() -> String {
    Uuid::new_v4().to_string()
}

/// One action invocation from the host platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCall {
    pub domain: String,
    pub service: String,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ActionCall {
    pub fn new(domain: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            data: serde_json::Map::new(),
        }
    }

    pub fn with_arg(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(name.to_string(), value.into());
        self
    }

    /// Named string argument. Numbers are rendered as strings since phone
    /// numbers often arrive unquoted.
    pub fn arg(&self, name: &str) -> Option<String> {
        match self.data.get(name)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Handler bound to one host action name.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Action name as registered with the host, e.g. "send_sms".
    fn service(&self) -> &'static str;

    async fn handle(&self, call: &ActionCall) -> Outcome;
}

/// Runtime registry so the host adapter can look up handlers by action name.
#[derive(Default, Clone)]
pub struct ActionRegistry {
    map: Arc<HashMap<&'static str, Arc<dyn ActionHandler>>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            map: Arc::new(HashMap::new()),
        }
    }

    pub fn with(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        let mut m = (*self.map).clone();
        m.insert(handler.service(), handler);
        self.map = Arc::new(m);
        self
    }

    pub fn get(&self, service: &str) -> Option<Arc<dyn ActionHandler>> {
        self.map.get(service).cloned()
    }

    pub fn services(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.map.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
