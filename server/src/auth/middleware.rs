//! Authentication middleware.
//!
//! Carts are persisted per account, so every cart endpoint resolves the
//! caller to an account id first. This provides a simple Bearer token
//! extraction mechanism; in production the token would be validated against
//! a session store or JWT.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};

use crate::AppState;

/// Account identity extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    /// The account the cart belongs to (the bearer token in development)
    pub account_id: String,
}

impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                let token = header.trim_start_matches("Bearer ").to_string();

                if token.is_empty() {
                    return Err((StatusCode::UNAUTHORIZED, "Empty bearer token"));
                }

                // If auth_secret is configured, the token would be validated
                // against it here. For now the token is the account id.
                Ok(AuthAccount { account_id: token })
            }
            Some(_) => Err((
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header format",
            )),
            None => {
                // Anonymous carts are only allowed when no auth is configured
                if state.config.auth_secret.is_none() {
                    Ok(AuthAccount {
                        account_id: "anonymous".to_string(),
                    })
                } else {
                    Err((StatusCode::UNAUTHORIZED, "Missing authorization header"))
                }
            }
        }
    }
}
