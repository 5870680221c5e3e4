//! Host action layer: binds `send_sms` / `send_mms` to an [`SmsClient`] and
//! dispatches action calls coming from the home-automation host.
//!
//! The host never sees an error raised from here. Every call ends in an
//! [`ActionReport`] and the client has already logged the outcome.

use async_trait::async_trait;
use serde::Serialize;
use sms_core::{
    ActionCall, ActionHandler, ActionRegistry, Outcome, SendRequest, SendResponse, SmsClient,
    SmsError,
};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const SEND_SMS: &str = "send_sms";
pub const SEND_MMS: &str = "send_mms";

/// `send_sms {recipient, message}`
#[derive(Clone)]
pub struct SendSmsAction {
    client: Arc<dyn SmsClient>,
}

impl SendSmsAction {
    pub fn new(client: Arc<dyn SmsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActionHandler for SendSmsAction {
    fn service(&self) -> &'static str {
        SEND_SMS
    }

    async fn handle(&self, call: &ActionCall) -> Outcome {
        // Missing arguments are left empty so the client rejects them.
        let recipient = call.arg("recipient").unwrap_or_default();
        let message = call.arg("message").unwrap_or_default();
        self.client
            .send_text(SendRequest::text(&recipient, &message))
            .await
    }
}

/// `send_mms {recipient, message, image_path}`
#[derive(Clone)]
pub struct SendMmsAction {
    client: Arc<dyn SmsClient>,
}

impl SendMmsAction {
    pub fn new(client: Arc<dyn SmsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActionHandler for SendMmsAction {
    fn service(&self) -> &'static str {
        SEND_MMS
    }

    async fn handle(&self, call: &ActionCall) -> Outcome {
        let recipient = call.arg("recipient").unwrap_or_default();
        let message = call.arg("message").unwrap_or_default();
        let image_path = call.arg("image_path").unwrap_or_default();
        self.client
            .send_picture(SendRequest::picture(
                &recipient,
                &message,
                Path::new(&image_path),
            ))
            .await
    }
}

/// Registry with both message actions bound to `client`.
pub fn message_actions(client: Arc<dyn SmsClient>) -> ActionRegistry {
    ActionRegistry::new()
        .with(Arc::new(SendSmsAction::new(client.clone())))
        .with(Arc::new(SendMmsAction::new(client)))
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("action for domain {got} sent to {expected}")]
    DomainMismatch { expected: String, got: String },
    #[error(transparent)]
    Send(#[from] SmsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Sent,
    Invalid,
    Unreachable,
    Rejected,
    Failed,
    Unknown,
}

/// What happened to one action call.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub service: String,
    pub status: ActionStatus,
    pub detail: String,
}

impl ActionReport {
    pub fn sent(service: &str, response: &SendResponse) -> Self {
        Self {
            service: service.to_string(),
            status: ActionStatus::Sent,
            detail: response.id.clone(),
        }
    }

    pub fn error(service: &str, error: &ActionError) -> Self {
        let status = match error {
            ActionError::UnknownAction(_) | ActionError::DomainMismatch { .. } => {
                ActionStatus::Unknown
            }
            ActionError::Send(SmsError::InvalidRequest(_) | SmsError::FileNotFound(_)) => {
                ActionStatus::Invalid
            }
            ActionError::Send(SmsError::Transport(_)) => ActionStatus::Unreachable,
            ActionError::Send(SmsError::ProviderFailure { .. }) => ActionStatus::Rejected,
            ActionError::Send(SmsError::Io(_) | SmsError::Unexpected(_)) => ActionStatus::Failed,
        };
        Self {
            service: service.to_string(),
            status,
            detail: error.to_string(),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == ActionStatus::Sent
    }
}

/// Routes host action calls for one domain to registered handlers.
#[derive(Clone)]
pub struct ActionDispatcher {
    domain: Arc<str>,
    registry: ActionRegistry,
}

impl ActionDispatcher {
    pub fn new(domain: &str, registry: ActionRegistry) -> Self {
        Self {
            domain: Arc::from(domain),
            registry,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn services(&self) -> Vec<&'static str> {
        self.registry.services()
    }

    /// Run one action call to completion and report the result.
    pub async fn dispatch(&self, call: &ActionCall) -> ActionReport {
        match self.dispatch_internal(call).await {
            Ok(response) => ActionReport::sent(&call.service, &response),
            Err(e) => {
                if !matches!(e, ActionError::Send(_)) {
                    warn!(domain = %call.domain, service = %call.service, "{}", e);
                }
                ActionReport::error(&call.service, &e)
            }
        }
    }

    /// Spawn the call on the runtime. Once started it runs to completion.
    pub fn fire(&self, call: ActionCall) -> JoinHandle<ActionReport> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(&call).await })
    }

    async fn dispatch_internal(&self, call: &ActionCall) -> Result<SendResponse, ActionError> {
        if call.domain != *self.domain {
            return Err(ActionError::DomainMismatch {
                expected: self.domain.to_string(),
                got: call.domain.clone(),
            });
        }

        let handler = self
            .registry
            .get(&call.service)
            .ok_or_else(|| ActionError::UnknownAction(call.service.clone()))?;

        debug!(domain = %call.domain, service = %call.service, "dispatching action");
        Ok(handler.handle(call).await?)
    }
}
