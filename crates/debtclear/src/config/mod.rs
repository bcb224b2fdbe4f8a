use crate::payoff::{ForestConfig, HistoryLimit, PlannerConfig};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

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
    pub planner: PlannerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let ansi = parse_var("APP_LOG_ANSI", false)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, ansi },
            planner: load_planner()?,
        })
    }
}

fn load_planner() -> Result<PlannerConfig, ConfigError> {
    let defaults = PlannerConfig::default();

    let history = HistoryLimit::capped(
        parse_var("APP_TIMELINE_MONTHS", HistoryLimit::DEFAULT_TIMELINE_MONTHS)?,
        parse_var("APP_SCHEDULE_MONTHS", HistoryLimit::DEFAULT_SCHEDULE_MONTHS)?,
    );

    let budget_steps = match env::var("APP_SCENARIO_STEPS") {
        Ok(raw) => parse_steps(&raw)?,
        Err(_) => defaults.budget_steps,
    };

    let currency_symbol = env::var("APP_CURRENCY_SYMBOL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or(defaults.currency_symbol);

    let forest = ForestConfig {
        trees: parse_var("APP_ATTRIBUTION_TREES", defaults.forest.trees)?,
        max_depth: parse_var("APP_ATTRIBUTION_DEPTH", defaults.forest.max_depth)?,
        seed: parse_var("APP_ATTRIBUTION_SEED", defaults.forest.seed)?,
    };
    if forest.trees == 0 {
        return Err(ConfigError::InvalidValue {
            name: "APP_ATTRIBUTION_TREES",
            value: "0".to_string(),
        });
    }

    Ok(PlannerConfig {
        history,
        budget_steps,
        currency_symbol,
        forest,
    })
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_steps(raw: &str) -> Result<Vec<f64>, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name: "APP_SCENARIO_STEPS",
        value: raw.to_string(),
    };

    let steps = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    if steps.is_empty() || steps.iter().any(|step| !step.is_finite() || *step < 0.0) {
        return Err(invalid());
    }
    Ok(steps)
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
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { name, value } => {
                write!(f, "{name} has an invalid value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
