use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::reservations::TransitionPolicy;

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
    pub rentals: RentalsConfig,
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

        let transition_policy = match env::var("RENTALS_TRANSITION_POLICY") {
            Ok(raw) => TransitionPolicy::parse(&raw)
                .ok_or(ConfigError::InvalidTransitionPolicy { value: raw })?,
            Err(_) => TransitionPolicy::default(),
        };

        let apartment_fixture = env::var("RENTALS_APARTMENT_FIXTURE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let staff_users = match env::var("RENTALS_STAFF_USERS") {
            Ok(raw) => parse_staff_users(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets: environment == AppEnvironment::Development,
            },
            rentals: RentalsConfig {
                transition_policy,
                apartment_fixture,
                staff_users,
            },
        })
    }
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
    pub include_targets: bool,
}

/// Domain settings: reservation transition rules and startup seeding.
#[derive(Debug, Clone, Default)]
pub struct RentalsConfig {
    pub transition_policy: TransitionPolicy,
    pub apartment_fixture: Option<PathBuf>,
    pub staff_users: Vec<StaffSeed>,
}

/// Staff identity provisioned at startup; credentials live with the authentication proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffSeed {
    pub username: String,
    pub full_name: String,
}

/// Parses `username[:Full Name]` entries separated by commas.
pub fn parse_staff_users(raw: &str) -> Result<Vec<StaffSeed>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (username, full_name) = match entry.split_once(':') {
                Some((username, full_name)) => (username.trim(), full_name.trim()),
                None => (entry, entry),
            };
            if username.is_empty() {
                return Err(ConfigError::InvalidStaffEntry {
                    entry: entry.to_string(),
                });
            }
            let full_name = if full_name.is_empty() {
                username
            } else {
                full_name
            };
            Ok(StaffSeed {
                username: username.to_string(),
                full_name: full_name.to_string(),
            })
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTransitionPolicy { value: String },
    InvalidStaffEntry { entry: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTransitionPolicy { value } => write!(
                f,
                "RENTALS_TRANSITION_POLICY must be 'strict' or 'legacy' (got '{value}')"
            ),
            ConfigError::InvalidStaffEntry { entry } => {
                write!(f, "RENTALS_STAFF_USERS entry '{entry}' has no username")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTransitionPolicy { .. }
            | ConfigError::InvalidStaffEntry { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("RENTALS_TRANSITION_POLICY");
        env::remove_var("RENTALS_APARTMENT_FIXTURE");
        env::remove_var("RENTALS_STAFF_USERS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.rentals.transition_policy, TransitionPolicy::Strict);
        assert!(config.rentals.apartment_fixture.is_none());
        assert!(config.rentals.staff_users.is_empty());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_rental_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RENTALS_TRANSITION_POLICY", "Legacy");
        env::set_var("RENTALS_APARTMENT_FIXTURE", "fixtures/apartments.csv");
        env::set_var("RENTALS_STAFF_USERS", "admin:Site Admin, manager");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.rentals.transition_policy, TransitionPolicy::Legacy);
        assert_eq!(
            config.rentals.apartment_fixture,
            Some(PathBuf::from("fixtures/apartments.csv"))
        );
        assert_eq!(
            config.rentals.staff_users,
            vec![
                StaffSeed {
                    username: "admin".to_string(),
                    full_name: "Site Admin".to_string(),
                },
                StaffSeed {
                    username: "manager".to_string(),
                    full_name: "manager".to_string(),
                },
            ]
        );
        reset_env();
    }

    #[test]
    fn rejects_unknown_transition_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RENTALS_TRANSITION_POLICY", "anything-goes");
        match AppConfig::load() {
            Err(ConfigError::InvalidTransitionPolicy { value }) => {
                assert_eq!(value, "anything-goes")
            }
            other => panic!("expected policy error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn staff_entries_need_a_username() {
        assert!(matches!(
            parse_staff_users("admin, :Nobody"),
            Err(ConfigError::InvalidStaffEntry { .. })
        ));
    }
}
