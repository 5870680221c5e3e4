use crate::config::AppConfig;
use sms_actions::{message_actions, ActionDispatcher};
use sms_core::{SmsClient, SmsError};
use sms_voipms::VoipMsClient;
use std::sync::Arc;
use tracing::{error, info};

/// Domain the host routes `send_sms` / `send_mms` calls under.
pub const DOMAIN: &str = "voipms_sms";

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("missing required configuration field: {0}")]
    MissingField(&'static str),
    #[error("client setup failed: {0}")]
    Client(#[from] SmsError),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Validate the account configuration, build the VoIP.ms client and register
/// both message actions.
pub fn setup(config: &AppConfig) -> Result<ActionDispatcher, SetupError> {
    if let Some(field) = config.account.missing_field() {
        error!("voipms_sms: missing required configuration field {}", field);
        return Err(SetupError::MissingField(field));
    }

    let client = VoipMsClient::builder(config.account.credentials())
        .timeout(config.http.timeout())
        .connect_timeout(config.http.connect_timeout())
        .build()?;

    let dispatcher = dispatcher_for(Arc::new(client));
    info!(
        services = ?dispatcher.services(),
        "voipms_sms: VoIP.ms SMS/MMS services registered"
    );
    Ok(dispatcher)
}

/// Dispatcher for the integration domain backed by any client.
pub fn dispatcher_for(client: Arc<dyn SmsClient>) -> ActionDispatcher {
    ActionDispatcher::new(DOMAIN, message_actions(client))
}
