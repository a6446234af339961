use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use domain::models::WheelSegment;
use domain::services::{GatePolicy, Wheel, WheelError};
use shared::jwt::MIN_SECRET_LEN;
use shared::password::is_phc_hash;
use shared::validation::parse_email;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    #[serde(default)]
    pub campaign: CampaignConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub wheel: WheelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    /// Keep everything in process memory instead of Postgres (local runs).
    #[serde(default)]
    pub in_memory: bool,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per minute per client on public endpoints. 0 disables.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Only enable behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,

    /// Key rate limits on the first `X-Forwarded-For` hop instead of the
    /// peer address. Only safe behind a proxy that sets the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignConfig {
    /// Grant allow-list membership to any well-formed email that asks.
    #[serde(default)]
    pub auto_approve: bool,

    #[serde(default = "default_claim_attempts")]
    pub claim_attempts: u32,

    #[serde(default = "default_claim_retry_delay_ms")]
    pub claim_retry_delay_ms: u64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            auto_approve: false,
            claim_attempts: default_claim_attempts(),
            claim_retry_delay_ms: default_claim_retry_delay_ms(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AdminConfig {
    /// Operator login email.
    pub email: String,

    /// Argon2id PHC string. Generate with `prize-wheel hash-password <password>`.
    pub password_hash: String,

    /// HMAC secret for session tokens, at least 32 bytes.
    pub session_secret: String,

    #[serde(default = "default_session_expiry")]
    pub session_expiry_secs: i64,

    #[serde(default = "default_session_leeway")]
    pub leeway_secs: u64,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("session_secret", &"[REDACTED]")
            .field("session_expiry_secs", &self.session_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WheelConfig {
    #[serde(default = "default_wheel_segments")]
    pub segments: Vec<SegmentConfig>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            segments: default_wheel_segments(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentConfig {
    pub id: u32,
    pub label: String,
    pub color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_can_win")]
    pub can_win: bool,
}

impl From<&SegmentConfig> for WheelSegment {
    fn from(segment: &SegmentConfig) -> Self {
        Self {
            id: segment.id,
            label: segment.label.clone(),
            color: segment.color.clone(),
            text_color: segment.text_color.clone(),
            can_win: segment.can_win,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    60
}
fn default_claim_attempts() -> u32 {
    3
}
fn default_claim_retry_delay_ms() -> u64 {
    200
}
fn default_session_expiry() -> i64 {
    3600
}
fn default_session_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}
fn default_text_color() -> String {
    "#FFFFFF".to_string()
}
fn default_can_win() -> bool {
    true
}
fn default_wheel_segments() -> Vec<SegmentConfig> {
    domain::models::default_segments()
        .into_iter()
        .map(|s| SegmentConfig {
            id: s.id,
            label: s.label,
            color: s.color,
            text_color: s.text_color,
            can_win: s.can_win,
        })
        .collect()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Invalid wheel configuration: {0}")]
    Wheel(#[from] WheelError),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PW__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PW").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 1048576

            [database]
            url = ""
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 60

            [campaign]
            auto_approve = false
            claim_attempts = 3
            claim_retry_delay_ms = 200

            [admin]
            email = "admin@example.com"
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$5Zr1aTvbKF0ltjDFIiHZmsNZGSLzPBTA/Zej9Eg4bpQ"
            session_secret = "test_session_secret_at_least_32_bytes_long"
            session_expiry_secs = 3600
            leeway_secs = 30
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.database.in_memory && self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "PW__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if parse_email(&self.admin.email).is_none() {
            return Err(ConfigValidationError::MissingRequired(
                "PW__ADMIN__EMAIL must be a valid email address".to_string(),
            ));
        }

        if !is_phc_hash(&self.admin.password_hash) {
            return Err(ConfigValidationError::MissingRequired(
                "PW__ADMIN__PASSWORD_HASH must be an argon2 PHC string".to_string(),
            ));
        }

        if self.admin.session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::InvalidValue(format!(
                "admin.session_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        if self.admin.session_expiry_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "admin.session_expiry_secs must be positive".to_string(),
            ));
        }

        if self.campaign.claim_attempts == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "campaign.claim_attempts must be at least 1".to_string(),
            ));
        }

        self.wheel()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Builds the wheel from configured segments.
    pub fn wheel(&self) -> Result<Wheel, WheelError> {
        Wheel::new(self.wheel.segments.iter().map(WheelSegment::from).collect())
    }

    pub fn gate_policy(&self) -> GatePolicy {
        GatePolicy {
            auto_approve: self.campaign.auto_approve,
            claim_attempts: self.campaign.claim_attempts,
            claim_retry_delay: Duration::from_millis(self.campaign.claim_retry_delay_ms),
        }
    }
}
