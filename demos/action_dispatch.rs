//! Drive the integration the way a home-automation host would: load
//! configuration once, then hand action calls to the dispatcher.
//!
//! ```text
//! VOIPMS__ACCOUNT__ACCOUNT_USER=me@example.com \
//! VOIPMS__ACCOUNT__API_PASSWORD=secret \
//! VOIPMS__ACCOUNT__SENDER_DID=5551234567 \
//! cargo run --example action_dispatch -- 5559876543 "Front door opened"
//! ```

use voipms_notify::prelude::*;

// Simulated host-side action invocation
struct HostCall {
    pub service: String,
    pub data: serde_json::Value,
}

impl From<HostCall> for ActionCall {
    fn from(call: HostCall) -> Self {
        let mut action = ActionCall::new(DOMAIN, call.service);
        if let serde_json::Value::Object(data) = call.data {
            action.data = data;
        }
        action
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging).map_err(SetupError::Logging)?;

    // Done once at startup; the dispatcher is cheap to clone into host callbacks.
    let dispatcher = setup(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (recipient, message) = match args.as_slice() {
        [recipient, message, ..] => (recipient.clone(), message.clone()),
        _ => return Err("usage: action_dispatch <recipient> <message> [image_path]".into()),
    };

    let call = match args.get(2) {
        Some(image_path) => HostCall {
            service: SEND_MMS.to_string(),
            data: serde_json::json!({
                "recipient": recipient,
                "message": message,
                "image_path": image_path,
            }),
        },
        None => HostCall {
            service: SEND_SMS.to_string(),
            data: serde_json::json!({ "recipient": recipient, "message": message }),
        },
    };

    // Fire and forget from the host's point of view; awaited here only so the
    // process stays alive until the send finishes.
    let report = dispatcher.fire(call.into()).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
