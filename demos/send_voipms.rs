//! Send a text or picture message straight through the VoIP.ms client.
use sms_core::{SendRequest, SmsClient};
use sms_voipms::{Credentials, VoipMsClient};
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let user = arg_or_env("--user", "VOIPMS_ACCOUNT_USER");
    let password = arg_or_env("--password", "VOIPMS_API_PASSWORD");
    let did = arg_or_env("--did", "VOIPMS_SENDER_DID");
    let to = arg_or_env("--to", "SMS_TO");
    let text = arg_or_env("--text", "SMS_TEXT");
    let image = optional_arg("--image");

    let client = VoipMsClient::new(Credentials::new(user, password, did))?;
    let res = match image.as_deref() {
        Some(image) => {
            client
                .send_picture(SendRequest::picture(&to, &text, Path::new(image)))
                .await?
        }
        None => client.send_text(SendRequest::text(&to, &text)).await?,
    };
    println!(
        "Sent via {} with id {}\nRaw: {}",
        res.provider,
        res.id,
        serde_json::to_string_pretty(&res.raw)?
    );
    Ok(())
}

fn optional_arg(flag: &str) -> Option<String> {
    let args: Vec<String> = env::args().collect();
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).cloned()
}

fn arg_or_env(flag: &str, env_key: &str) -> String {
    optional_arg(flag)
        .or_else(|| env::var(env_key).ok())
        .unwrap_or_else(|| panic!("missing {} (arg {} or env {})", flag, flag, env_key))
}
