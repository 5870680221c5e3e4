//! # voipms-notify
//!
//! VoIP.ms SMS/MMS notification actions for home-automation hosts.
//!
//! ## Features
//!
//! - **Two actions**: `send_sms` and `send_mms` with named arguments
//! - **Picture messages**: local images attached inline as base64 data URIs
//! - **Fire and log**: failures are reported and logged, never raised to the host
//! - **Layered configuration**: files plus `VOIPMS__*` environment variables
//! - **Observability**: structured logging through `tracing`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use voipms_notify::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     init_tracing(&config.logging)?;
//!
//!     let dispatcher = setup(&config)?;
//!     let call = ActionCall::new(DOMAIN, "send_sms")
//!         .with_arg("recipient", "5559876543")
//!         .with_arg("message", "Water leak detected in basement");
//!
//!     let report = dispatcher.dispatch(&call).await;
//!     println!("{:?}", report.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [account]
//! account_user = "me@example.com"
//! api_password = "api-password"
//! sender_did = "5551234567"
//!
//! [http]
//! timeout_seconds = 30
//! connect_timeout_seconds = 10
//! ```

pub mod config;
pub mod logging;
pub mod setup;

pub use crate::config::*;
pub use crate::logging::init_tracing;
pub use crate::setup::{dispatcher_for, setup, SetupError, DOMAIN};

/// Common imports for voipms-notify usage
pub mod prelude {
    pub use crate::config::{AccountConfig, AppConfig, HttpConfig, LoggingConfig};
    pub use crate::logging::init_tracing;
    pub use crate::setup::{dispatcher_for, setup, SetupError, DOMAIN};
    pub use sms_actions::{ActionDispatcher, ActionReport, ActionStatus, SEND_MMS, SEND_SMS};
    pub use sms_core::*;
    pub use sms_voipms::{Credentials, VoipMsClient};
}
