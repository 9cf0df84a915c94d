use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::workflows::payroll::DEFAULT_CNSS_RATE;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub payroll: PayrollConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let cnss_rate = match env::var("APP_CNSS_RATE") {
            Ok(raw) => parse_rate(&raw)?,
            Err(_) => DEFAULT_CNSS_RATE,
        };

        let max_advances_per_year = match env::var("APP_MAX_AVANCES_PAR_AN") {
            Ok(raw) => parse_cap(&raw)?,
            Err(_) => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            payroll: PayrollConfig {
                cnss_rate,
                max_advances_per_year,
            },
        })
    }
}

fn parse_rate(raw: &str) -> Result<Decimal, ConfigError> {
    let rate = Decimal::from_str(raw.trim()).map_err(|_| ConfigError::InvalidCnssRate {
        value: raw.to_string(),
    })?;

    if rate.is_sign_negative() || rate >= Decimal::ONE {
        return Err(ConfigError::InvalidCnssRate {
            value: raw.to_string(),
        });
    }

    Ok(rate)
}

fn parse_cap(raw: &str) -> Result<Option<u32>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidAdvanceCap {
            value: raw.to_string(),
        })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Payroll parameters shared by the salary and advance workflows.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollConfig {
    /// Employee CNSS contribution rate applied to gross salary.
    pub cnss_rate: Decimal,
    /// `max_avances_par_an`; `None` disables the cap.
    pub max_advances_per_year: Option<u32>,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            cnss_rate: DEFAULT_CNSS_RATE,
            max_advances_per_year: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCnssRate { value: String },
    InvalidAdvanceCap { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCnssRate { value } => write!(
                f,
                "APP_CNSS_RATE must be a decimal in [0, 1), got '{}'",
                value
            ),
            ConfigError::InvalidAdvanceCap { value } => write!(
                f,
                "APP_MAX_AVANCES_PAR_AN must be a non-negative integer or 'none', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCnssRate { .. }
            | ConfigError::InvalidAdvanceCap { .. } => None,
        }
    }
}
