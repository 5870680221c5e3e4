//! # VoIP.ms gateway client
//!
//! Sends text messages (`sendSMS`, query parameters) and picture messages
//! (`sendMMS`, multipart form with a base64 data URI) through the VoIP.ms REST
//! API, and classifies the reply.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//! use sms_voipms::{Credentials, VoipMsClient};
//!
//! let client = VoipMsClient::new(Credentials::new("me@example.com", "api-pass", "5551234567"))?;
//! client.send_text(SendRequest::text("5559876543", "Garage door left open")).await?;
//! ```

use async_trait::async_trait;
use serde::Serialize;
use sms_core::{fallback_id, GatewayResponse, Outcome, SendRequest, SendResponse, SmsClient, SmsError};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

pub mod media;

pub const PROVIDER: &str = "voipms";

/// Fixed REST endpoint for every VoIP.ms API method.
pub const REST_ENDPOINT: &str = "https://voip.ms/api/v1/rest.php";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Account credentials and the sending line (DID).
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// VoIP.ms account login (email address).
    pub account_user: String,
    /// API password, distinct from the portal password.
    pub api_password: String,
    /// Originating DID.
    pub sender_did: String,
}

impl Credentials {
    pub fn new<S: Into<String>>(account_user: S, api_password: S, sender_did: S) -> Self {
        Self {
            account_user: account_user.into(),
            api_password: api_password.into(),
            sender_did: sender_did.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_user", &self.account_user)
            .field("api_password", &"<redacted>")
            .field("sender_did", &self.sender_did)
            .finish()
    }
}

/// Which API method a send maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Picture,
}

impl MessageKind {
    pub fn method(self) -> &'static str {
        match self {
            MessageKind::Text => "sendSMS",
            MessageKind::Picture => "sendMMS",
        }
    }

    /// JSON field carrying the message id on success.
    fn id_field(self) -> &'static str {
        match self {
            MessageKind::Text => "sms",
            MessageKind::Picture => "mms",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MessageKind::Text => "SMS",
            MessageKind::Picture => "MMS",
        }
    }
}

/// VoIP.ms REST client.
#[derive(Clone, Debug)]
pub struct VoipMsClient {
    credentials: Credentials,
    endpoint: String,
    http: reqwest::Client,
}

/// Builder for [`VoipMsClient`]; the endpoint override exists for mock servers.
#[derive(Debug)]
pub struct VoipMsClientBuilder {
    credentials: Credentials,
    endpoint: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl VoipMsClientBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Whole-request timeout (default 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connect timeout (default 10s).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<VoipMsClient, SmsError> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| SmsError::Unexpected(format!("http client: {}", e)))?;
        Ok(VoipMsClient {
            credentials: self.credentials,
            endpoint: self.endpoint,
            http,
        })
    }
}

impl VoipMsClient {
    pub fn new(credentials: Credentials) -> Result<Self, SmsError> {
        Self::builder(credentials).build()
    }

    pub fn builder(credentials: Credentials) -> VoipMsClientBuilder {
        VoipMsClientBuilder {
            credentials,
            endpoint: REST_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn deliver_text(&self, req: &SendRequest<'_>) -> Outcome {
        req.validate_text()?;

        let params = VoipMsTextRequest {
            api_username: &self.credentials.account_user,
            api_password: &self.credentials.api_password,
            method: MessageKind::Text.method(),
            did: &self.credentials.sender_did,
            dst: req.recipient,
            message: req.message,
        };
        debug!(endpoint = %self.endpoint, dst = req.recipient, "sending sendSMS request");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;
        let response = read_response(res).await?;
        classify(MessageKind::Text, response)
    }

    async fn deliver_picture(&self, req: &SendRequest<'_>) -> Outcome {
        let image_path = req.validate_picture()?;
        if !matches!(tokio::fs::try_exists(image_path).await, Ok(true)) {
            return Err(SmsError::FileNotFound(image_path.to_path_buf()));
        }

        let media1 = media::load_data_uri(image_path).await?;
        debug!(
            endpoint = %self.endpoint,
            dst = req.recipient,
            media_bytes = media1.len(),
            "sending sendMMS request"
        );

        let form = self.picture_form(req, media1);
        let res = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let response = read_response(res).await?;
        classify(MessageKind::Picture, response)
    }

    fn picture_form(&self, req: &SendRequest<'_>, media1: String) -> reqwest::multipart::Form {
        reqwest::multipart::Form::new()
            .text("api_username", self.credentials.account_user.clone())
            .text("api_password", self.credentials.api_password.clone())
            .text("method", MessageKind::Picture.method())
            .text("did", self.credentials.sender_did.clone())
            .text("dst", req.recipient.to_string())
            .text("message", req.message.to_string())
            .text("media1", media1)
    }
}

#[derive(Debug, Serialize)]
struct VoipMsTextRequest<'a> {
    api_username: &'a str,
    api_password: &'a str,
    method: &'static str,
    did: &'a str,
    dst: &'a str,
    message: &'a str,
}

/// The request URL carries the API password in its query string, so it is
/// stripped before the error is formatted.
fn transport_error(e: reqwest::Error) -> SmsError {
    let e = e.without_url();
    if e.is_timeout() {
        SmsError::Transport(format!("request timed out: {}", e))
    } else {
        SmsError::Transport(e.to_string())
    }
}

async fn read_response(res: reqwest::Response) -> Result<GatewayResponse, SmsError> {
    let status = res.status().as_u16();
    let body = res.text().await.map_err(transport_error)?;
    Ok(GatewayResponse::new(status, body))
}

/// Classify a gateway reply.
///
/// Anything other than HTTP 200 is a failure. VoIP.ms also answers 200 with a
/// JSON `status` such as `invalid_dst`; any `status` other than `success` is
/// treated as a failure too. Bodies that are not JSON are accepted as-is.
pub fn classify(kind: MessageKind, response: GatewayResponse) -> Outcome {
    if response.status != 200 {
        return Err(SmsError::ProviderFailure {
            status: response.status,
            body: response.body,
        });
    }

    let raw = response.json();
    if let Some(status) = raw.get("status").and_then(|s| s.as_str()) {
        if status != "success" {
            return Err(SmsError::ProviderFailure {
                status: response.status,
                body: response.body,
            });
        }
    }

    let id = match raw.get(kind.id_field()) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => fallback_id(),
    };

    Ok(SendResponse {
        id,
        provider: PROVIDER,
        raw,
    })
}

fn log_outcome(kind: MessageKind, recipient: &str, outcome: &Outcome) {
    match outcome {
        Ok(res) => info!(
            provider = PROVIDER,
            dst = recipient,
            id = %res.id,
            response = %res.raw,
            "voipms_sms: {} sent successfully",
            kind.label()
        ),
        Err(e) => error!(
            provider = PROVIDER,
            dst = recipient,
            "voipms_sms: failed to send {}: {}",
            kind.label(),
            e
        ),
    }
}

#[async_trait]
impl SmsClient for VoipMsClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn send_text(&self, req: SendRequest<'_>) -> Outcome {
        let outcome = self.deliver_text(&req).await;
        log_outcome(MessageKind::Text, req.recipient, &outcome);
        outcome
    }

    async fn send_picture(&self, req: SendRequest<'_>) -> Outcome {
        let outcome = self.deliver_picture(&req).await;
        log_outcome(MessageKind::Picture, req.recipient, &outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;
    use wiremock::matchers::{body_string_contains, header_regex, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REST_PATH: &str = "/api/v1/rest.php";

    fn test_credentials() -> Credentials {
        Credentials::new("test_user", "test_password", "1234567890")
    }

    async fn create_test_client() -> (VoipMsClient, MockServer) {
        let mock_server = MockServer::start().await;
        let client = VoipMsClient::builder(test_credentials())
            .endpoint(format!("{}{}", mock_server.uri(), REST_PATH))
            .build()
            .unwrap();
        (client, mock_server)
    }

    async fn assert_no_requests(server: &MockServer) {
        let received = server.received_requests().await.unwrap();
        assert!(received.is_empty(), "unexpected requests: {:?}", received);
    }

    #[test]
    fn default_endpoint_is_fixed() {
        let client = VoipMsClient::new(test_credentials()).unwrap();
        assert_eq!(client.endpoint(), "https://voip.ms/api/v1/rest.php");
        assert_eq!(client.provider(), "voipms");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let dbg = format!("{:?}", test_credentials());
        assert!(dbg.contains("test_user"));
        assert!(!dbg.contains("test_password"));
    }

    #[test]
    fn classify_status_codes() {
        let ok = classify(MessageKind::Text, GatewayResponse::new(200, "Success")).unwrap();
        assert_eq!(ok.provider, "voipms");
        assert_eq!(ok.raw["raw"], "Success");

        let err = classify(MessageKind::Text, GatewayResponse::new(500, "boom")).unwrap_err();
        assert!(matches!(
            err,
            SmsError::ProviderFailure { status: 500, ref body } if body == "boom"
        ));
    }

    #[test]
    fn classify_reads_json_status_and_id() {
        let ok = classify(
            MessageKind::Picture,
            GatewayResponse::new(200, r#"{"status":"success","mms":23434}"#),
        )
        .unwrap();
        assert_eq!(ok.id, "23434");

        let soft = classify(
            MessageKind::Text,
            GatewayResponse::new(200, r#"{"status":"invalid_dst"}"#),
        )
        .unwrap_err();
        assert!(matches!(soft, SmsError::ProviderFailure { status: 200, .. }));
    }

    #[tokio::test]
    async fn send_text_issues_single_get() {
        let (client, mock_server) = create_test_client().await;

        Mock::given(method("GET"))
            .and(path(REST_PATH))
            .and(query_param("api_username", "test_user"))
            .and(query_param("api_password", "test_password"))
            .and(query_param("did", "1234567890"))
            .and(query_param("dst", "9876543210"))
            .and(query_param("method", "sendSMS"))
            .and(query_param("message", "Test SMS"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Success"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let res = client
            .send_text(SendRequest::text("9876543210", "Test SMS"))
            .await
            .unwrap();
        assert_eq!(res.provider, "voipms");
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn send_text_failure_is_not_retried() {
        let (client, mock_server) = create_test_client().await;

        Mock::given(method("GET"))
            .and(path(REST_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client
            .send_text(SendRequest::text("9876543210", "Test SMS"))
            .await
            .unwrap_err();
        match err {
            SmsError::ProviderFailure { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn send_text_returns_provider_id() {
        let (client, mock_server) = create_test_client().await;

        Mock::given(method("GET"))
            .and(path(REST_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "success", "sms": "987"})),
            )
            .mount(&mock_server)
            .await;

        let res = client
            .send_text(SendRequest::text("9876543210", "hi"))
            .await
            .unwrap();
        assert_eq!(res.id, "987");
    }

    #[tokio::test]
    async fn send_text_rejects_empty_fields_without_network() {
        let (client, mock_server) = create_test_client().await;

        for (dst, msg) in [("", "Test SMS"), ("9876543210", ""), ("", "")] {
            let err = client.send_text(SendRequest::text(dst, msg)).await.unwrap_err();
            assert!(matches!(err, SmsError::InvalidRequest(_)));
        }
        assert_no_requests(&mock_server).await;
    }

    #[tokio::test]
    async fn send_text_timeout_is_transport_error() {
        let mock_server = MockServer::start().await;
        let client = VoipMsClient::builder(test_credentials())
            .endpoint(format!("{}{}", mock_server.uri(), REST_PATH))
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let err = client
            .send_text(SendRequest::text("9876543210", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::Transport(_)));
    }

    #[tokio::test]
    async fn transport_error_does_not_leak_password() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}{}", listener.local_addr().unwrap(), REST_PATH);
        drop(listener);

        let client = VoipMsClient::builder(Credentials::new("u", "SUPERSECRET", "1"))
            .endpoint(endpoint)
            .build()
            .unwrap();

        let err = client
            .send_text(SendRequest::text("9876543210", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::Transport(_)));
        assert!(!err.to_string().contains("SUPERSECRET"));
        assert!(!err.to_string().contains("api_password"));
    }

    #[tokio::test]
    async fn send_picture_posts_multipart_with_data_uri() {
        let (client, mock_server) = create_test_client().await;
        let dir = tempdir().unwrap();
        let image = dir.path().join("test_image.jpg");
        fs::write(&image, "fake_image_data").unwrap();

        Mock::given(method("POST"))
            .and(path(REST_PATH))
            .and(header_regex("content-type", "^multipart/form-data"))
            .and(body_string_contains("name=\"method\""))
            .and(body_string_contains("sendMMS"))
            .and(body_string_contains("name=\"dst\""))
            .and(body_string_contains("9876543210"))
            .and(body_string_contains("name=\"media1\""))
            .and(body_string_contains(
                "data:image/jpeg;base64,ZmFrZV9pbWFnZV9kYXRh",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string("Success"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let res = client
            .send_picture(SendRequest::picture("9876543210", "Test MMS", &image))
            .await
            .unwrap();
        assert_eq!(res.provider, "voipms");
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn send_picture_missing_file_makes_no_call() {
        let (client, mock_server) = create_test_client().await;

        let err = client
            .send_picture(SendRequest::picture(
                "9876543210",
                "Test MMS",
                Path::new("/nonexistent/path.jpg"),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::FileNotFound(ref p) if p == Path::new("/nonexistent/path.jpg")));
        assert_no_requests(&mock_server).await;
    }

    #[tokio::test]
    async fn send_picture_requires_image_path() {
        let (client, mock_server) = create_test_client().await;

        let err = client
            .send_picture(SendRequest::text("9876543210", "Test MMS"))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::InvalidRequest(_)));
        assert_no_requests(&mock_server).await;
    }
}
