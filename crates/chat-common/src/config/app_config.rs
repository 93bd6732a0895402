//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub realtime: RealtimeConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
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

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Listener configuration for the gateway
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Realtime transport tuning
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// How often the server pings each connection
    pub heartbeat_interval_ms: u64,
    /// Silence after which a connection is considered dead
    pub heartbeat_timeout_ms: u64,
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
}

impl RealtimeConfig {
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    #[must_use]
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "chat-gateway".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_heartbeat_interval_ms() -> u64 {
    25_000
}

fn default_heartbeat_timeout_ms() -> u64 {
    60_000
}

fn default_outbound_buffer() -> usize {
    100
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Every setting has a default, so an empty lookup yields a usable config.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(raw) => Environment::parse(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("APP_ENV", raw))?,
            None => Environment::default(),
        };

        let port = match parse_var(&lookup, "GATEWAY_PORT")? {
            Some(port) => port,
            None => parse_var(&lookup, "PORT")?.unwrap_or_else(default_port),
        };

        let realtime = RealtimeConfig {
            heartbeat_interval_ms: parse_var(&lookup, "HEARTBEAT_INTERVAL_MS")?
                .unwrap_or_else(default_heartbeat_interval_ms),
            heartbeat_timeout_ms: parse_var(&lookup, "HEARTBEAT_TIMEOUT_MS")?
                .unwrap_or_else(default_heartbeat_timeout_ms),
            outbound_buffer: parse_var(&lookup, "OUTBOUND_BUFFER")?
                .unwrap_or_else(default_outbound_buffer),
        };

        if realtime.heartbeat_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "HEARTBEAT_INTERVAL_MS",
                "must be greater than zero".to_string(),
            ));
        }

        if realtime.heartbeat_timeout_ms <= realtime.heartbeat_interval_ms {
            return Err(ConfigError::InvalidValue(
                "HEARTBEAT_TIMEOUT_MS",
                format!(
                    "{} must exceed HEARTBEAT_INTERVAL_MS ({})",
                    realtime.heartbeat_timeout_ms, realtime.heartbeat_interval_ms
                ),
            ));
        }

        if realtime.outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "OUTBOUND_BUFFER",
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port,
            },
            realtime,
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|origin| !origin.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw))
        })
        .transpose()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
