use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use sms_voipms::Credentials;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// VoIP.ms account configuration. Never serialized.
    #[serde(default, skip_serializing)]
    pub account: AccountConfig,
    /// Outbound HTTP configuration
    pub http: HttpConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// VoIP.ms account configuration. All fields are required by `setup`.
#[derive(Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccountConfig {
    /// Account login (email address)
    #[serde(alias = "email")]
    pub account_user: String,
    /// API password
    pub api_password: String,
    /// Sending DID
    pub sender_did: String,
}

/// Outbound HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Connect timeout in seconds (default: 10)
    pub connect_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level or env-filter directive (default: info)
    pub level: String,
    /// Log format: json, pretty or compact (default: json)
    pub format: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("account_user", &self.account_user)
            .field("api_password", &"<redacted>")
            .field("sender_did", &self.sender_did)
            .finish()
    }
}

impl AccountConfig {
    /// Name of the first empty required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("account_user", &self.account_user),
            ("api_password", &self.api_password),
            ("sender_did", &self.sender_did),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.account_user.as_str(),
            self.api_password.as_str(),
            self.sender_did.as_str(),
        )
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Environment variables, e.g. VOIPMS__ACCOUNT__SENDER_DID
            .add_source(Environment::with_prefix("VOIPMS").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Load defaults overlaid with a single configuration file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }
}
