use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::licensing::{DecisionConfig, ExpertTitles, SolutionDefaults, StatusCodes};

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
    pub licensing: DecisionConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            licensing: load_decision_config()?,
        })
    }
}

fn load_decision_config() -> Result<DecisionConfig, ConfigError> {
    let defaults = StatusCodes::default();
    let status_codes = StatusCodes {
        approved: status_code("LICENSING_STATUS_APPROVED", defaults.approved)?,
        rejected: status_code("LICENSING_STATUS_REJECTED", defaults.rejected)?,
        revoked: status_code("LICENSING_STATUS_REVOKED", defaults.revoked)?,
    };

    let mut expert_titles = ExpertTitles::default();
    if let Some(path) = non_empty_var("LICENSING_EXPERT_TITLES") {
        expert_titles.merge(read_expert_titles(PathBuf::from(path))?);
    }

    let fallback = SolutionDefaults::default();
    let solution_defaults = SolutionDefaults {
        meeting_place: non_empty_var("LICENSING_MEETING_PLACE").unwrap_or(fallback.meeting_place),
        department_name: non_empty_var("LICENSING_DEPARTMENT_NAME")
            .unwrap_or(fallback.department_name),
        secretary_name: non_empty_var("LICENSING_SECRETARY_NAME")
            .unwrap_or(fallback.secretary_name),
        control_position: non_empty_var("LICENSING_CONTROL_POSITION")
            .unwrap_or(fallback.control_position),
    };

    Ok(DecisionConfig {
        status_codes,
        expert_titles,
        solution_defaults,
    })
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn status_code(name: &'static str, default: i32) -> Result<i32, ConfigError> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidStatusCode { variable: name, raw }),
    }
}

fn read_expert_titles(path: PathBuf) -> Result<ExpertTitles, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::ExpertTitlesIo {
        path: path.clone(),
        source,
    })?;
    ExpertTitles::from_json_str(&raw)
        .map_err(|source| ConfigError::ExpertTitlesFormat { path, source })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidStatusCode {
        variable: &'static str,
        raw: String,
    },
    ExpertTitlesIo {
        path: PathBuf,
        source: std::io::Error,
    },
    ExpertTitlesFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStatusCode { variable, raw } => {
                write!(f, "{} must be an integer status code, got '{}'", variable, raw)
            }
            ConfigError::ExpertTitlesIo { path, .. } => {
                write!(f, "unable to read expert titles from {}", path.display())
            }
            ConfigError::ExpertTitlesFormat { path, .. } => write!(
                f,
                "expert titles in {} must be a JSON object of strings",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidStatusCode { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::ExpertTitlesIo { source, .. } => Some(source),
            ConfigError::ExpertTitlesFormat { source, .. } => Some(source),
        }
    }
}
