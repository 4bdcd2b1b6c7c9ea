//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).
//! Every field has a default so a bare environment yields a working local setup.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub timing: TimingConfig,
    pub upload: UploadConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
    /// Force JSON log output regardless of environment
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: Environment::default(),
            json_logs: false,
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP collaborator settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            request_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Realtime channel settings
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Origin of the realtime server (http(s) or ws(s))
    #[serde(default = "default_api_url")]
    pub url: String,
    #[serde(default = "default_realtime_path")]
    pub path: String,
    /// Bound on a single connect attempt
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_reconnect_delay_max_ms")]
    pub reconnect_delay_max_ms: u64,
    /// Jitter applied to each reconnect delay, in `[0, 1]`
    #[serde(default = "default_randomization_factor")]
    pub randomization_factor: f64,
    /// Consecutive low-level failures before the channel gives up
    #[serde(default = "default_max_transport_errors")]
    pub max_transport_errors: u32,
    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,
    /// Request a server ack for channel mutations and roll back on rejection or timeout
    #[serde(default)]
    pub ack_mutations: bool,
}

impl RealtimeConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    #[must_use]
    pub fn reconnect_delay_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_max_ms)
    }

    #[must_use]
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            path: default_realtime_path(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            reconnect_delay_max_ms: default_reconnect_delay_max_ms(),
            randomization_factor: default_randomization_factor(),
            max_transport_errors: default_max_transport_errors(),
            ack_timeout_ms: default_ack_timeout_ms(),
            ack_mutations: false,
        }
    }
}

/// Client-side timers of the optimistic protocols
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_typing_idle_ms")]
    pub typing_idle_ms: u64,
    #[serde(default = "default_deletion_countdown_ms")]
    pub deletion_countdown_ms: u64,
    /// How long a sent deletion waits for `message_deleted` before it is forgotten
    #[serde(default = "default_deletion_confirm_ms")]
    pub deletion_confirm_ms: u64,
    #[serde(default = "default_pending_sweep_ms")]
    pub pending_sweep_interval_ms: u64,
    #[serde(default = "default_pending_ttl_ms")]
    pub pending_ttl_ms: u64,
}

impl TimingConfig {
    #[must_use]
    pub fn typing_idle(&self) -> Duration {
        Duration::from_millis(self.typing_idle_ms)
    }

    #[must_use]
    pub fn deletion_countdown(&self) -> Duration {
        Duration::from_millis(self.deletion_countdown_ms)
    }

    #[must_use]
    pub fn deletion_confirm_window(&self) -> Duration {
        Duration::from_millis(self.deletion_confirm_ms)
    }

    #[must_use]
    pub fn pending_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.pending_sweep_interval_ms)
    }

    #[must_use]
    pub fn pending_ttl(&self) -> Duration {
        Duration::from_millis(self.pending_ttl_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            typing_idle_ms: default_typing_idle_ms(),
            deletion_countdown_ms: default_deletion_countdown_ms(),
            deletion_confirm_ms: default_deletion_confirm_ms(),
            pending_sweep_interval_ms: default_pending_sweep_ms(),
            pending_ttl_ms: default_pending_ttl_ms(),
        }
    }
}

/// Media upload settings
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_upload_path")]
    pub path: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u64,
    #[serde(default = "default_upload_timeout_secs")]
    pub timeout_secs: u64,
}

impl UploadConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            max_file_size_mb: default_max_file_size(),
            timeout_secs: default_upload_timeout_secs(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "pulse-client".to_string()
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_realtime_path() -> String {
    "/socket.io/".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_reconnect_delay_max_ms() -> u64 {
    5000
}

fn default_randomization_factor() -> f64 {
    0.5
}

fn default_max_transport_errors() -> u32 {
    5
}

fn default_ack_timeout_ms() -> u64 {
    10_000
}

fn default_typing_idle_ms() -> u64 {
    3000
}

fn default_deletion_countdown_ms() -> u64 {
    8000
}

fn default_deletion_confirm_ms() -> u64 {
    30_000
}

fn default_pending_sweep_ms() -> u64 {
    30_000
}

fn default_pending_ttl_ms() -> u64 {
    30_000
}

fn default_upload_path() -> String {
    "/api/upload".to_string()
}

fn default_max_file_size() -> u64 {
    25
}

fn default_upload_timeout_secs() -> u64 {
    120
}

/// Read and parse an optional variable, falling back to `default` when unset
fn parse_var<T: FromStr>(name: &'static str, default: fn() -> T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default()),
    }
}

fn url_var(name: &'static str, default: fn() -> String) -> Result<String, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default());
    url::Url::parse(&raw).map_err(|e| ConfigError::InvalidValue(name, format!("{raw}: {e}")))?;
    Ok(raw)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = url_var("PULSE_API_URL", default_api_url)?;
        let realtime_url = match env::var("PULSE_REALTIME_URL") {
            Ok(_) => url_var("PULSE_REALTIME_URL", default_api_url)?,
            Err(_) => base_url.clone(),
        };

        let realtime = RealtimeConfig {
            url: realtime_url,
            path: env::var("PULSE_REALTIME_PATH").unwrap_or_else(|_| default_realtime_path()),
            connect_timeout_ms: parse_var("PULSE_CONNECT_TIMEOUT_MS", default_connect_timeout_ms)?,
            reconnect_attempts: parse_var("PULSE_RECONNECT_ATTEMPTS", default_reconnect_attempts)?,
            reconnect_delay_ms: parse_var("PULSE_RECONNECT_DELAY_MS", default_reconnect_delay_ms)?,
            reconnect_delay_max_ms: parse_var(
                "PULSE_RECONNECT_DELAY_MAX_MS",
                default_reconnect_delay_max_ms,
            )?,
            randomization_factor: parse_var(
                "PULSE_RECONNECT_JITTER",
                default_randomization_factor,
            )?,
            max_transport_errors: parse_var(
                "PULSE_MAX_TRANSPORT_ERRORS",
                default_max_transport_errors,
            )?,
            ack_timeout_ms: parse_var("PULSE_ACK_TIMEOUT_MS", default_ack_timeout_ms)?,
            ack_mutations: parse_var("PULSE_ACK_MUTATIONS", || false)?,
        };

        if !(0.0..=1.0).contains(&realtime.randomization_factor) {
            return Err(ConfigError::InvalidValue(
                "PULSE_RECONNECT_JITTER",
                realtime.randomization_factor.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
                json_logs: env::var("LOG_FORMAT").is_ok_and(|s| s.eq_ignore_ascii_case("json")),
            },
            api: ApiConfig {
                base_url,
                request_timeout_secs: parse_var("PULSE_HTTP_TIMEOUT_SECS", default_http_timeout_secs)?,
            },
            realtime,
            timing: TimingConfig {
                typing_idle_ms: parse_var("PULSE_TYPING_IDLE_MS", default_typing_idle_ms)?,
                deletion_countdown_ms: parse_var(
                    "PULSE_DELETION_COUNTDOWN_MS",
                    default_deletion_countdown_ms,
                )?,
                deletion_confirm_ms: parse_var(
                    "PULSE_DELETION_CONFIRM_MS",
                    default_deletion_confirm_ms,
                )?,
                pending_sweep_interval_ms: parse_var("PULSE_PENDING_SWEEP_MS", default_pending_sweep_ms)?,
                pending_ttl_ms: parse_var("PULSE_PENDING_TTL_MS", default_pending_ttl_ms)?,
            },
            upload: UploadConfig {
                path: env::var("PULSE_UPLOAD_PATH").unwrap_or_else(|_| default_upload_path()),
                max_file_size_mb: parse_var("PULSE_UPLOAD_MAX_MB", default_max_file_size)?,
                timeout_secs: parse_var("PULSE_UPLOAD_TIMEOUT_SECS", default_upload_timeout_secs)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
