//! API Configuration Module
//!
//! Configuration for CORS, rate limiting, storage backend selection and
//! static SPA serving. Loaded from environment variables with defaults
//! suitable for local development.

use snipspace_core::ConfigError;
use std::path::PathBuf;

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Deployment environment. Production turns configuration warnings into
/// startup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match std::env::var("SNIPSPACE_ENVIRONMENT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Which `ContentStore` implementation the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "" | "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            other => Err(ConfigError::InvalidValue {
                field: "SNIPSPACE_STORE".to_string(),
                value: other.to_string(),
                reason: "expected 'memory' or 'postgres'".to_string(),
            }),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, rate limiting, and production hardening.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub environment: Environment,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Rate Limiting Configuration
    // ========================================================================
    /// Whether rate limiting is enabled.
    pub rate_limit_enabled: bool,

    /// Requests per owner per minute.
    pub rate_limit_per_minute: u32,

    /// Burst capacity on top of the steady rate.
    pub rate_limit_burst: u32,

    // ========================================================================
    // Storage and static files
    // ========================================================================
    pub store_backend: StoreBackend,

    /// Directory holding the built SPA. `None` disables static serving.
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,

            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,

            rate_limit_enabled: true,
            rate_limit_per_minute: 600,
            rate_limit_burst: 20,

            store_backend: StoreBackend::Memory,
            static_dir: None,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SNIPSPACE_ENVIRONMENT`: "development" or "production"
    /// - `SNIPSPACE_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `SNIPSPACE_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `SNIPSPACE_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `SNIPSPACE_RATE_LIMIT_ENABLED`: "true" or "false" (default: true)
    /// - `SNIPSPACE_RATE_LIMIT_PER_MINUTE`: Requests per minute per owner (default: 600)
    /// - `SNIPSPACE_RATE_LIMIT_BURST`: Burst capacity (default: 20)
    /// - `SNIPSPACE_STORE`: "memory" or "postgres" (default: memory)
    /// - `SNIPSPACE_STATIC_DIR`: Built SPA directory to serve (default: unset)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cors_origins = std::env::var("SNIPSPACE_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("SNIPSPACE_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("SNIPSPACE_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let rate_limit_enabled = std::env::var("SNIPSPACE_RATE_LIMIT_ENABLED")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        let rate_limit_per_minute = std::env::var("SNIPSPACE_RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.rate_limit_per_minute);

        let rate_limit_burst = std::env::var("SNIPSPACE_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.rate_limit_burst);

        let store_backend =
            StoreBackend::parse(&std::env::var("SNIPSPACE_STORE").unwrap_or_default())?;

        let static_dir = std::env::var("SNIPSPACE_STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment: Environment::from_env(),
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            rate_limit_enabled,
            rate_limit_per_minute,
            rate_limit_burst,
            store_backend,
            static_dir,
        })
    }

    /// Check settings that are tolerable in development but not in production.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cors_origins.is_empty() {
            if self.environment.is_production() {
                return Err(ConfigError::MissingRequired {
                    field: "SNIPSPACE_CORS_ORIGINS".to_string(),
                });
            }
            tracing::warn!("SNIPSPACE_CORS_ORIGINS is empty; allowing all origins");
        }

        if self.rate_limit_enabled && self.rate_limit_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SNIPSPACE_RATE_LIMIT_PER_MINUTE".to_string(),
                value: "0".to_string(),
                reason: "must be greater than zero when rate limiting is enabled".to_string(),
            });
        }

        Ok(())
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.example.com
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern));
                }
            }
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(config.rate_limit_enabled);
        assert_eq!(config.rate_limit_per_minute, 600);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_production_requires_cors_origins() {
        let config = ApiConfig {
            environment: Environment::Production,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ApiConfig {
            environment: Environment::Production,
            cors_origins: vec!["https://snipspace.app".to_string()],
            ..ApiConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(StoreBackend::parse(""), Ok(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("Postgres"), Ok(StoreBackend::Postgres));
        assert!(StoreBackend::parse("sqlite").is_err());
    }

    #[test]
    fn test_wildcard_subdomain() {
        let config = ApiConfig {
            cors_origins: vec!["*.snipspace.app".to_string()],
            ..ApiConfig::default()
        };

        assert!(config.is_origin_allowed("https://app.snipspace.app"));
        assert!(!config.is_origin_allowed("https://evilsnipspace.app"));
        assert!(!config.is_origin_allowed("https://evil.com"));
    }
}
