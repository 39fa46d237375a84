//! Authentication Module
//!
//! Resolves the owner identity of a request. Two credentials are accepted:
//! 1. API key (via X-API-Key header), mapped to a fixed owner in configuration
//! 2. JWT token (via Authorization: Bearer header), whose `sub` is the owner
//!
//! Login flows and credential storage belong to the identity provider; this
//! module only verifies what it is handed.

use crate::config::Environment;
use crate::error::{ApiError, ApiResult};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use snipspace_core::{ConfigError, OwnerId, SnipspaceError};
use std::collections::HashMap;
use std::sync::Arc;

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock abstraction for JWT time validation.
///
/// Token times are checked against this clock instead of inside
/// `jsonwebtoken`, so tests can pin the current time.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// Test clock helpers for common scenarios.
#[cfg(test)]
pub mod test_clocks {
    use super::FixedClock;

    /// 2024-01-01 00:00:00 UTC
    pub fn valid() -> FixedClock {
        FixedClock(1704067200)
    }

    /// 2020-01-01 00:00:00 UTC
    pub fn expired() -> FixedClock {
        FixedClock(1577836800)
    }
}

// ============================================================================
// JWT SECRET
// ============================================================================

/// JWT secret that never shows up in logs.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Create a new JWT secret. Empty secrets are rejected.
    pub fn new(secret: String) -> Result<Self, SnipspaceError> {
        if secret.is_empty() {
            return Err(SnipspaceError::Config(ConfigError::MissingRequired {
                field: "jwt_secret".to_string(),
            }));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value for signing and verification.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

fn build_jwt_secret(secret_str: String) -> JwtSecret {
    let normalized = if secret_str.trim().is_empty() {
        INSECURE_DEFAULT_SECRET.to_string()
    } else {
        secret_str
    };

    match JwtSecret::new(normalized) {
        Ok(secret) => secret,
        Err(_) => JwtSecret(SecretString::new(INSECURE_DEFAULT_SECRET.to_string().into())),
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// API key -> owner it authenticates as.
    pub api_keys: HashMap<String, OwnerId>,

    /// JWT secret key for signing and verification
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (default: HS256)
    pub jwt_algorithm: Algorithm,

    /// JWT token expiration in seconds (default: 1 hour)
    pub jwt_expiration_secs: i64,

    /// Tolerated clock drift when checking `exp`, in seconds (default: 60)
    pub jwt_clock_skew_secs: i64,

    /// Clock for JWT time validation
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_keys", &format!("[{} keys]", self.api_keys.len()))
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            jwt_secret: build_jwt_secret(String::new()),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 3600,
            jwt_clock_skew_secs: 60,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SNIPSPACE_API_KEYS`: Comma-separated `owner:key` pairs
    /// - `SNIPSPACE_JWT_SECRET`: JWT signing secret
    /// - `SNIPSPACE_JWT_EXPIRATION_SECS`: JWT token expiration (default: 3600)
    /// - `SNIPSPACE_JWT_CLOCK_SKEW_SECS`: JWT clock skew tolerance (default: 60)
    pub fn from_env() -> Self {
        let api_keys = std::env::var("SNIPSPACE_API_KEYS")
            .map(|s| parse_api_keys(&s))
            .unwrap_or_default();

        let secret_str = std::env::var("SNIPSPACE_JWT_SECRET").unwrap_or_default();

        Self {
            api_keys,
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: std::env::var("SNIPSPACE_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            jwt_clock_skew_secs: std::env::var("SNIPSPACE_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            clock: Arc::new(SystemClock),
        }
    }

    /// Refuse insecure secrets in production; warn about them in development.
    pub fn validate_for_environment(&self, environment: Environment) -> ApiResult<()> {
        let is_production = environment.is_production();

        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(
                    "Cannot start in production with the default JWT secret. \
                     Set SNIPSPACE_JWT_SECRET to a secure value.",
                ));
            }
            tracing::warn!(
                "Using the insecure default JWT secret. Set SNIPSPACE_JWT_SECRET \
                 before deploying."
            );
        } else if self.jwt_secret.len() < 32 {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least 32 characters long.",
                    self.jwt_secret.len()
                )));
            }
            tracing::warn!(
                chars = self.jwt_secret.len(),
                "JWT secret is short; use at least 32 characters in production"
            );
        }

        Ok(())
    }

    /// Register an API key for an owner.
    pub fn add_api_key(&mut self, key: impl Into<String>, owner: OwnerId) {
        self.api_keys.insert(key.into(), owner);
    }

    /// Owner an API key authenticates as.
    pub fn owner_for_api_key(&self, key: &str) -> Option<&OwnerId> {
        self.api_keys.get(key)
    }
}

/// Parse `owner:key,owner:key` pairs. Malformed entries are skipped.
pub fn parse_api_keys(raw: &str) -> HashMap<String, OwnerId> {
    raw.split(',')
        .filter_map(|pair| {
            let (owner, key) = pair.trim().split_once(':')?;
            let (owner, key) = (owner.trim(), key.trim());
            if owner.is_empty() || key.is_empty() {
                tracing::warn!("Ignoring malformed SNIPSPACE_API_KEYS entry");
                return None;
            }
            Some((key.to_string(), OwnerId::new(owner)))
        })
        .collect()
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// JWT claims. `sub` carries the owner id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (owner id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims for an owner using a clock.
    pub fn new(owner_id: &OwnerId, expiration_secs: i64, clock: &dyn JwtClock) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            sub: owner_id.to_string(),
            iat: now,
            exp: now + expiration_secs,
        }
    }

    /// Check if the token has expired according to a clock.
    pub fn is_expired(&self, clock: &dyn JwtClock) -> bool {
        self.exp < clock.now_epoch_secs()
    }
}

// ============================================================================
// AUTHENTICATION CONTEXT
// ============================================================================

/// Authenticated caller, injected into request extensions by the auth
/// middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Owner every record read or written by this request must belong to.
    pub owner_id: OwnerId,

    /// Authentication method used
    pub auth_method: AuthMethod,
}

impl AuthContext {
    pub fn new(owner_id: OwnerId, auth_method: AuthMethod) -> Self {
        Self {
            owner_id,
            auth_method,
        }
    }
}

/// Authentication method used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    ApiKey,
    Jwt,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::ApiKey => "api_key",
            AuthMethod::Jwt => "jwt",
        }
    }
}

// ============================================================================
// AUTHENTICATION FUNCTIONS
// ============================================================================

/// Check `exp` against our own clock with skew tolerance.
fn validate_claim_times(now: i64, exp: i64, leeway_secs: i64) -> ApiResult<()> {
    if exp < now - leeway_secs {
        return Err(ApiError::token_expired());
    }
    Ok(())
}

/// Validate a JWT token and extract claims.
///
/// `jsonwebtoken` checks the signature only; expiry is checked against
/// `config.clock`.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;

    let now = config.clock.now_epoch_secs();
    if now < 0 {
        tracing::error!(timestamp = now, "System clock returned pre-epoch time");
        return Err(ApiError::internal_error("Server time configuration error"));
    }

    validate_claim_times(now, claims.exp, config.jwt_clock_skew_secs)?;

    if claims.sub.trim().is_empty() {
        return Err(ApiError::invalid_token("Token has no subject"));
    }

    Ok(claims)
}

/// Generate a JWT token for an owner.
pub fn generate_jwt_token(config: &AuthConfig, owner_id: &OwnerId) -> ApiResult<String> {
    let claims = Claims::new(owner_id, config.jwt_expiration_secs, &*config.clock);

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// Authenticate with an API key.
pub fn authenticate_api_key(config: &AuthConfig, api_key: &str) -> ApiResult<AuthContext> {
    match config.owner_for_api_key(api_key) {
        Some(owner) => Ok(AuthContext::new(owner.clone(), AuthMethod::ApiKey)),
        None => Err(ApiError::unauthorized("Invalid API key")),
    }
}

/// Authenticate with a bearer JWT.
pub fn authenticate_jwt(config: &AuthConfig, token: &str) -> ApiResult<AuthContext> {
    let claims = validate_jwt_token(config, token)?;
    Ok(AuthContext::new(OwnerId::new(claims.sub), AuthMethod::Jwt))
}

/// Authenticate a request using either API key or JWT token.
///
/// X-API-Key wins when both headers are present.
pub fn authenticate(
    config: &AuthConfig,
    api_key_header: Option<&str>,
    auth_header: Option<&str>,
) -> ApiResult<AuthContext> {
    if let Some(api_key) = api_key_header {
        return authenticate_api_key(config, api_key);
    }

    if let Some(auth_value) = auth_header {
        return match auth_value.strip_prefix("Bearer ") {
            Some(token) => authenticate_jwt(config, token.trim()),
            None => Err(ApiError::invalid_token(
                "Authorization header must use Bearer scheme",
            )),
        };
    }

    Err(ApiError::unauthorized(
        "Authentication required: provide X-API-Key or Authorization header",
    ))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn test_config() -> AuthConfig {
        let mut config = AuthConfig::default();
        config.add_api_key("test_key_123", OwnerId::new("user_key_owner"));
        config.jwt_secret = build_jwt_secret("test_secret".to_string());
        config.clock = Arc::new(test_clocks::valid());
        config
    }

    #[test]
    fn test_parse_api_keys() {
        let keys = parse_api_keys("alice:k1, bob:k2,broken,:k3,carol:");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.get("k1"), Some(&OwnerId::new("alice")));
        assert_eq!(keys.get("k2"), Some(&OwnerId::new("bob")));
    }

    #[test]
    fn test_jwt_generation_and_validation() -> ApiResult<()> {
        let config = test_config();
        let owner = OwnerId::new("user_123");
        let token = generate_jwt_token(&config, &owner)?;

        let claims = validate_jwt_token(&config, &token)?;
        assert_eq!(claims.sub, "user_123");
        assert!(!claims.is_expired(&*config.clock));
        Ok(())
    }

    #[test]
    fn test_expired_token() -> ApiResult<()> {
        let mut config = test_config();
        config.clock = Arc::new(test_clocks::expired());
        let token = generate_jwt_token(&config, &OwnerId::new("user_123"))?;

        config.clock = Arc::new(test_clocks::valid());
        let result = validate_jwt_token(&config, &token);
        assert!(matches!(result, Err(ref e) if e.code == ErrorCode::TokenExpired));
        Ok(())
    }

    #[test]
    fn test_clock_skew_tolerance() -> ApiResult<()> {
        let mut config = test_config();
        config.jwt_expiration_secs = 10;
        let token = generate_jwt_token(&config, &OwnerId::new("user_123"))?;

        // 30s past expiry, inside the 60s leeway.
        config.clock = Arc::new(FixedClock(test_clocks::valid().0 + 40));
        assert!(validate_jwt_token(&config, &token).is_ok());

        config.clock = Arc::new(FixedClock(test_clocks::valid().0 + 200));
        assert!(validate_jwt_token(&config, &token).is_err());
        Ok(())
    }

    #[test]
    fn test_wrong_secret_rejected() -> ApiResult<()> {
        let config = test_config();
        let token = generate_jwt_token(&config, &OwnerId::new("user_123"))?;

        let mut other = test_config();
        other.jwt_secret = build_jwt_secret("another_secret".to_string());
        let result = validate_jwt_token(&other, &token);
        assert!(matches!(result, Err(ref e) if e.code == ErrorCode::InvalidToken));
        Ok(())
    }

    #[test]
    fn test_authenticate_with_api_key() -> ApiResult<()> {
        let config = test_config();
        let auth = authenticate(&config, Some("test_key_123"), None)?;
        assert_eq!(auth.owner_id, OwnerId::new("user_key_owner"));
        assert_eq!(auth.auth_method, AuthMethod::ApiKey);

        assert!(authenticate(&config, Some("nope"), None).is_err());
        Ok(())
    }

    #[test]
    fn test_authenticate_with_jwt() -> ApiResult<()> {
        let config = test_config();
        let token = generate_jwt_token(&config, &OwnerId::new("user_456"))?;
        let header = format!("Bearer {}", token);

        let auth = authenticate(&config, None, Some(&header))?;
        assert_eq!(auth.owner_id.as_str(), "user_456");
        assert_eq!(auth.auth_method, AuthMethod::Jwt);
        Ok(())
    }

    #[test]
    fn test_authenticate_no_credentials() {
        let config = test_config();
        let result = authenticate(&config, None, None);
        assert!(matches!(result, Err(ref e) if e.code == ErrorCode::Unauthorized));

        let result = authenticate(&config, None, Some("Basic abc"));
        assert!(matches!(result, Err(ref e) if e.code == ErrorCode::InvalidToken));
    }

    #[test]
    fn test_production_rejects_default_and_short_secrets() {
        let config = AuthConfig::default();
        assert!(config.validate_for_environment(Environment::Production).is_err());
        assert!(config.validate_for_environment(Environment::Development).is_ok());

        let short = test_config();
        assert!(short.validate_for_environment(Environment::Production).is_err());

        let mut strong = test_config();
        strong.jwt_secret = build_jwt_secret("x".repeat(48));
        assert!(strong.validate_for_environment(Environment::Production).is_ok());
    }
}
