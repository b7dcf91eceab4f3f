/// Request authentication context
///
/// The API layer validates the bearer token once per request and stores the
/// result here, in request extensions. Write operations that need
/// authorization resolve the subject to an internal user row themselves;
/// nothing downstream re-parses headers.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskdeck_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("signed in as {}", auth.subject)
/// }
/// ```
use axum::http::{header, HeaderMap};

use super::jwt::{validate_token, JwtError};

/// Authentication context added to request extensions
///
/// Carries the validated identity-provider claims for the calling user.
/// This is the external identity; the internal user row (role, team) is
/// looked up per operation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// External identity reference (token subject)
    pub subject: String,

    /// Account email from the token
    pub email: String,

    /// Optional display name from the token
    pub name: Option<String>,
}

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Invalid authorization header format
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Validates the bearer token in `headers` and builds an [`AuthContext`]
///
/// # Errors
///
/// - [`AuthError::MissingCredentials`] when no Authorization header is present
/// - [`AuthError::InvalidFormat`] when the header is not a Bearer token
/// - [`AuthError::InvalidToken`] when signature or expiry checks fail
pub fn authenticate_bearer(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token has expired".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    Ok(AuthContext {
        subject: claims.sub,
        email: claims.email,
        name: claims.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, IdentityClaims};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            authenticate_bearer(&headers, SECRET),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_non_bearer_header() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(matches!(
            authenticate_bearer(&headers, SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_valid_bearer_token() {
        let claims = IdentityClaims::new("idp_user_7", "b@example.com", Some("Grace"));
        let token = create_token(&claims, SECRET).unwrap();
        let headers = headers_with(&format!("Bearer {}", token));

        let auth = authenticate_bearer(&headers, SECRET).unwrap();
        assert_eq!(auth.subject, "idp_user_7");
        assert_eq!(auth.email, "b@example.com");
        assert_eq!(auth.name.as_deref(), Some("Grace"));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let headers = headers_with("Bearer not-a-jwt");
        assert!(matches!(
            authenticate_bearer(&headers, SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
