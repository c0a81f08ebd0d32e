// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session JWT handling.
//!
//! Sessions are optional: routes see `Option<Session>` and decide for
//! themselves what signed-out means.

use crate::models::AccountCredential;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "yearview_session";

/// Session lifetime in seconds (30 days).
const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (application user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Google credentials carried in the session
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub google_accounts: Vec<AccountCredential>,
}

/// Signed-in user extracted from the session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub google_accounts: Vec<AccountCredential>,
}

/// Middleware that attaches `Option<Session>` to the request.
///
/// Missing or invalid tokens yield `None` instead of a 401.
pub async fn optional_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| {
            request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string)
        });

    let session = token.and_then(|t| decode_session(&t, &state.config.session_signing_key));
    request.extensions_mut().insert(session);

    next.run(request).await
}

/// Validate a session token and extract the session.
pub fn decode_session(token: &str, signing_key: &[u8]) -> Option<Session> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) if !data.claims.sub.is_empty() => Some(Session {
            user_id: data.claims.sub,
            google_accounts: data.claims.google_accounts,
        }),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            None
        }
    }
}

/// Create a JWT for a user session.
pub fn create_session_jwt(
    user_id: &str,
    google_accounts: Vec<AccountCredential>,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
        google_accounts,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
