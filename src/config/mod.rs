use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_NOBL9_BASE_URL: &str = "https://app.nobl9.com";
pub const DEFAULT_NOBL9_AUTH_URL: &str =
    "https://accounts.nobl9.com/oauth2/ausdh151kj9OOWv5x191/v1/token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub nobl9: Nobl9Config,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    /// Overrides that could not be parsed; reported by `validate`
    #[serde(skip)]
    invalid: Vec<ConfigError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Nobl9Config {
    pub base_url: String,
    pub auth_url: String,
    pub organization: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub skip_tls_verify: bool,
    pub timeout_secs: u64,
}

impl Nobl9Config {
    /// Deadline for the whole downstream interaction of one request
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

impl fmt::Debug for Nobl9Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nobl9Config")
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("organization", &self.organization)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("NOBL9_CLIENT_ID and NOBL9_CLIENT_SECRET must be set together")]
    PartialCredentials,

    #[error("NOBL9_TIMEOUT_SECS must be greater than zero")]
    ZeroTimeout,

    #[error("API_MAX_REQUEST_SIZE_BYTES must be greater than zero")]
    ZeroRequestSize,

    #[error("SECURITY_CORS_ORIGINS must list at least one origin")]
    NoCorsOrigins,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match var("APP_ENV").or_else(|| var("ENVIRONMENT")).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(var)
    }

    fn with_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = var("WIZARD_API_HOST") {
            self.server.host = v;
        }
        let port_var = if var("WIZARD_API_PORT").is_some() { "WIZARD_API_PORT" } else { "PORT" };
        self.parse_into(port_var, var(port_var), |c, v| c.server.port = v);

        // Nobl9 overrides
        if let Some(v) = var("NOBL9_BASE_URL") {
            self.nobl9.base_url = v;
        }
        if let Some(v) = var("NOBL9_AUTH_URL") {
            self.nobl9.auth_url = v;
        }
        if let Some(v) = non_empty(var("NOBL9_ORGANIZATION")) {
            self.nobl9.organization = Some(v);
        }
        if let Some(v) = non_empty(var("NOBL9_CLIENT_ID")) {
            self.nobl9.client_id = Some(v);
        }
        if let Some(v) = non_empty(var("NOBL9_CLIENT_SECRET")) {
            self.nobl9.client_secret = Some(v);
        }
        self.flag_into("NOBL9_SKIP_TLS_VERIFY", var("NOBL9_SKIP_TLS_VERIFY"), |c, v| {
            c.nobl9.skip_tls_verify = v
        });
        self.parse_into("NOBL9_TIMEOUT_SECS", var("NOBL9_TIMEOUT_SECS"), |c, v| {
            c.nobl9.timeout_secs = v
        });

        // API overrides
        self.flag_into("API_ENABLE_REQUEST_LOGGING", var("API_ENABLE_REQUEST_LOGGING"), |c, v| {
            c.api.enable_request_logging = v
        });
        self.parse_into("API_MAX_REQUEST_SIZE_BYTES", var("API_MAX_REQUEST_SIZE_BYTES"), |c, v| {
            c.api.max_request_size_bytes = v
        });

        // Security overrides
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Apply a parsed override, or remember the raw value as invalid
    fn parse_into<T, S>(&mut self, name: &'static str, raw: Option<String>, set: S)
    where
        T: FromStr,
        S: FnOnce(&mut Self, T),
    {
        let Some(raw) = raw else { return };
        match raw.trim().parse() {
            Ok(value) => set(self, value),
            Err(_) => self.invalid.push(ConfigError::InvalidValue { name, value: raw }),
        }
    }

    /// Booleans accept true/false/1/0 in any case
    fn flag_into<S>(&mut self, name: &'static str, raw: Option<String>, set: S)
    where
        S: FnOnce(&mut Self, bool),
    {
        let Some(raw) = raw else { return };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => set(self, true),
            "false" | "0" => set(self, false),
            _ => self.invalid.push(ConfigError::InvalidValue { name, value: raw }),
        }
    }

    /// Check the assembled configuration once, before the server starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(err) = self.invalid.first() {
            return Err(err.clone());
        }
        check_url("NOBL9_BASE_URL", &self.nobl9.base_url)?;
        check_url("NOBL9_AUTH_URL", &self.nobl9.auth_url)?;

        if self.nobl9.client_id.is_some() != self.nobl9.client_secret.is_some() {
            return Err(ConfigError::PartialCredentials);
        }
        if self.nobl9.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.api.max_request_size_bytes == 0 {
            return Err(ConfigError::ZeroRequestSize);
        }
        if self.security.cors_origins.is_empty() {
            return Err(ConfigError::NoCorsOrigins);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            nobl9: Nobl9Config::defaults(),
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
            },
            invalid: Vec::new(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            nobl9: Nobl9Config::defaults(),
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 256 * 1024, // 256KB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
            },
            invalid: Vec::new(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            nobl9: Nobl9Config::defaults(),
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 64 * 1024, // 64KB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
            },
            invalid: Vec::new(),
        }
    }
}

impl Nobl9Config {
    fn defaults() -> Self {
        Self {
            base_url: DEFAULT_NOBL9_BASE_URL.to_string(),
            auth_url: DEFAULT_NOBL9_AUTH_URL.to_string(),
            organization: None,
            client_id: None,
            client_secret: None,
            skip_tls_verify: false,
            timeout_secs: 60,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            name,
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
