use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::cache::CacheTtls;

const DEVELOPMENT_SECRET: &str = "development-only-signing-secret";
const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Upper bound for every configured lifetime: ten years.
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

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

/// Top-level configuration for the marketplace service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub seed_admin: Option<SeedAdmin>,
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
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let jwt_secret = match env::var("APP_JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingSecret)
            }
            _ => DEVELOPMENT_SECRET.to_string(),
        };
        let token_ttl = seconds_var("APP_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;

        let defaults = CacheTtls::default();
        let cache = CacheConfig {
            list_ttl: seconds_var("APP_CACHE_LIST_TTL_SECS", defaults.list.as_secs())?,
            detail_ttl: seconds_var("APP_CACHE_DETAIL_TTL_SECS", defaults.detail.as_secs())?,
            stats_ttl: seconds_var("APP_CACHE_STATS_TTL_SECS", defaults.stats.as_secs())?,
        };

        let seed_admin = match (
            env::var("APP_SEED_ADMIN_EMAIL"),
            env::var("APP_SEED_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) if !email.trim().is_empty() => {
                Some(SeedAdmin { email, password })
            }
            (Ok(_), Err(_)) => return Err(ConfigError::IncompleteSeedAdmin),
            _ => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl,
            },
            cache,
            seed_admin,
        })
    }
}

fn seconds_var(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| (1..=MAX_DURATION_SECS).contains(secs))
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidDuration { name }),
        Err(_) => Ok(Duration::from_secs(default)),
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Credential signing.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.token_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECS as i64))
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Listing cache lifetimes.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub list_ttl: Duration,
    pub detail_ttl: Duration,
    pub stats_ttl: Duration,
}

impl CacheConfig {
    pub fn ttls(&self) -> CacheTtls {
        CacheTtls {
            list: self.list_ttl,
            detail: self.detail_ttl,
            stats: self.stats_ttl,
        }
    }
}

/// Admin account ensured at startup.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingSecret,
    InvalidDuration { name: &'static str },
    IncompleteSeedAdmin,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingSecret => {
                write!(f, "APP_JWT_SECRET must be set when APP_ENV is production")
            }
            ConfigError::InvalidDuration { name } => {
                write!(
                    f,
                    "{name} must be between 1 and {MAX_DURATION_SECS} seconds"
                )
            }
            ConfigError::IncompleteSeedAdmin => write!(
                f,
                "APP_SEED_ADMIN_PASSWORD must be set alongside APP_SEED_ADMIN_EMAIL"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::MissingSecret
            | ConfigError::InvalidDuration { .. }
            | ConfigError::IncompleteSeedAdmin => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "APP_JWT_SECRET",
            "APP_TOKEN_TTL_SECS",
            "APP_CACHE_LIST_TTL_SECS",
            "APP_CACHE_DETAIL_TTL_SECS",
            "APP_CACHE_STATS_TTL_SECS",
            "APP_SEED_ADMIN_EMAIL",
            "APP_SEED_ADMIN_PASSWORD",
        ] {
            env::remove_var(name);
        }
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
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.auth.jwt_secret, DEVELOPMENT_SECRET);
        assert_eq!(config.auth.token_ttl, Duration::from_secs(604_800));
        assert_eq!(config.cache.ttls(), CacheTtls::default());
        assert!(config.seed_admin.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn production_requires_signing_secret() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        assert!(matches!(AppConfig::load(), Err(ConfigError::MissingSecret)));

        env::set_var("APP_JWT_SECRET", "prod-secret");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.auth.jwt_secret, "prod-secret");
        reset_env();
    }

    #[test]
    fn cache_ttls_are_overridable() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CACHE_DETAIL_TTL_SECS", "30");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.cache.detail_ttl, Duration::from_secs(30));

        env::set_var("APP_CACHE_STATS_TTL_SECS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidDuration {
                name: "APP_CACHE_STATS_TTL_SECS"
            })
        ));
        reset_env();
    }

    #[test]
    fn oversized_token_ttl_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_TOKEN_TTL_SECS", "1000000000000000");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidDuration {
                name: "APP_TOKEN_TTL_SECS"
            })
        ));

        env::set_var("APP_TOKEN_TTL_SECS", MAX_DURATION_SECS.to_string());
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.auth.token_ttl().num_seconds(),
            MAX_DURATION_SECS as i64
        );
        reset_env();
    }

    #[test]
    fn seed_admin_needs_both_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SEED_ADMIN_EMAIL", "root@example.com");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::IncompleteSeedAdmin)
        ));

        env::set_var("APP_SEED_ADMIN_PASSWORD", "correct horse");
        let seed = AppConfig::load()
            .expect("config loads")
            .seed_admin
            .expect("seed admin present");
        assert_eq!(seed.email, "root@example.com");
        reset_env();
    }
}
