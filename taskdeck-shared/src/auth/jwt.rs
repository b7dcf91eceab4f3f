/// Identity token validation
///
/// The identity provider issues HS256-signed JWTs for signed-in users.
/// Taskdeck only validates them; it never issues tokens of its own. The
/// subject claim is the external identity reference that
/// `User::create_or_get` maps to an internal user row.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256), shared secret with the IdP
/// - **Validation**: signature and expiration checks
/// - **Secret Management**: secrets should be at least 32 bytes
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::{create_token, validate_token, IdentityClaims};
///
/// # fn example() -> Result<(), taskdeck_shared::auth::jwt::JwtError> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let claims = IdentityClaims::new("idp_user_42", "user@example.com", Some("Ada"));
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, "idp_user_42");
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Claims carried by an identity-provider token
///
/// # Claims
///
/// - `sub`: external identity reference (opaque string owned by the IdP)
/// - `email`: the account email at sign-in time
/// - `name`: optional display name
/// - `iat` / `exp`: standard issued-at / expiry timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject - external identity reference
    pub sub: String,

    /// Account email
    pub email: String,

    /// Optional display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl IdentityClaims {
    /// Creates claims expiring in 24 hours
    ///
    /// Used by tests and development tooling; production tokens come from
    /// the identity provider.
    pub fn new(subject: impl Into<String>, email: impl Into<String>, name: Option<&str>) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.into(),
            email: email.into(),
            name: name.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + Duration::hours(24)).timestamp(),
        }
    }
}

/// Signs a token for the given claims
pub fn create_token(claims: &IdentityClaims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates a token's signature and expiry, returning its claims
pub fn validate_token(token: &str, secret: &str) -> Result<IdentityClaims, JwtError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(e.to_string()),
    })
}
