//! Process configuration read from the environment (and `.env`), with CLI overrides on top.
//!
//! | variable          | default       |
//! |-------------------|---------------|
//! | `APP_ENV`         | `development` |
//! | `APP_HOST`        | `127.0.0.1`   |
//! | `APP_PORT`        | `3000`        |
//! | `APP_LOG_LEVEL`   | `info`        |
//! | `SCHEIN_DATASET`  | unset         |

use std::env;
use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    /// Unrecognised names run as development.
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub course: CourseConfig,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = var_or("APP_PORT", DEFAULT_PORT)
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;
        let server = ServerConfig {
            host: var_or("APP_HOST", DEFAULT_HOST),
            port,
        };

        let course = CourseConfig {
            dataset: match env::var("SCHEIN_DATASET") {
                Err(_) => None,
                Ok(path) if path.trim().is_empty() => return Err(ConfigError::EmptyDatasetPath),
                Ok(path) => Some(path.into()),
            },
        };

        Ok(Self {
            environment: AppEnvironment::parse(&var_or("APP_ENV", "development")),
            server,
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", DEFAULT_LOG_LEVEL),
            },
            course,
        })
    }

    /// `--host` / `--port` win over `APP_HOST` / `APP_PORT`.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        self.server.host = host.unwrap_or(self.server.host);
        self.server.port = port.unwrap_or(self.server.port);
        self
    }
}

/// Address the scheincriteria API listens on.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `localhost` maps to the IPv4 loopback; anything else must be a literal IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Where the course snapshot served by the in-memory adapters comes from.
/// `None` falls back to the bundled demo course.
#[derive(Debug, Clone, Default)]
pub struct CourseConfig {
    pub dataset: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: AddrParseError },
    EmptyDatasetPath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => f.write_str("APP_PORT is not a port number (0-65535)"),
            ConfigError::InvalidHost { .. } => {
                f.write_str("APP_HOST is neither `localhost` nor an IP address")
            }
            ConfigError::EmptyDatasetPath => {
                f.write_str("SCHEIN_DATASET is set but empty; unset it to serve the demo course")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort | ConfigError::EmptyDatasetPath => None,
        }
    }
}
