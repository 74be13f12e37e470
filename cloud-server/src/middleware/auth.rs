//! Authentication middleware

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::Response,
    http::header::AUTHORIZATION,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{AppState, AppError};

/// Role allowed to trigger prediction runs
pub const AUTHORITY_ROLE: &str = "authority";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user or service id)
    pub role: String,     // Role
    pub exp: usize,       // Expiration timestamp
}

/// Caller context extracted from JWT
#[derive(Debug, Clone)]
pub struct AuthorityContext {
    pub subject: String,
    pub role: String,
}

/// RBAC: Require specific role
pub fn require_role(claims: &Claims, required_role: &str) -> Result<(), AppError> {
    if claims.role != required_role {
        tracing::warn!(
            "Role '{}' required but {} has role '{}'",
            required_role, claims.sub, claims.role
        );
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Decode and validate a token signed with `secret`
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default()
    )?;
    Ok(data.claims)
}

/// Sign claims with `secret`. Used by operators' tooling and tests.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    Ok(encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))?)
}

/// Middleware: Require a JWT carrying the authority role
pub async fn require_authority(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;
    let claims = decode_claims(&token, &state.config.jwt_secret)?;
    require_role(&claims, AUTHORITY_ROLE)?;

    req.extensions_mut().insert(AuthorityContext {
        subject: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req.headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}

// Implement FromRequestParts for AuthorityContext
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthorityContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<AuthorityContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: &str, exp_offset: i64) -> Claims {
        Claims {
            sub: "ops-1".to_string(),
            role: role.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = issue_token(&claims(AUTHORITY_ROLE, 3600), "secret").unwrap();
        let decoded = decode_claims(&token, "secret").unwrap();
        assert_eq!(decoded.sub, "ops-1");
        assert!(require_role(&decoded, AUTHORITY_ROLE).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&claims(AUTHORITY_ROLE, 3600), "secret").unwrap();
        assert!(matches!(decode_claims(&token, "other"), Err(AppError::TokenInvalid)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(&claims(AUTHORITY_ROLE, -7200), "secret").unwrap();
        assert!(matches!(decode_claims(&token, "secret"), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_viewer_role_forbidden() {
        assert!(matches!(require_role(&claims("viewer", 3600), AUTHORITY_ROLE), Err(AppError::Forbidden)));
    }
}
