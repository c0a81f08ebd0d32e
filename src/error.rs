// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Account store error: {0}")]
    AccountStore(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::AccountStore(msg) => {
                tracing::error!(error = %msg, "Account store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "account_store_error")
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

/// Failures talking to Google on behalf of a single linked account.
///
/// These never abort a request; they are folded into the per-account
/// status reported alongside the calendars.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GoogleError {
    /// The token endpoint rejected a refresh.
    #[error("token refresh failed with HTTP {status}")]
    TokenRefresh { status: u16, body: Option<String> },

    /// No access token and no way to get one.
    #[error("missing access token")]
    MissingToken,

    /// 401 from the Calendar API that one refresh did not cure.
    #[error("calendar API rejected credentials (HTTP {status})")]
    UpstreamAuth { status: u16, message: Option<String> },

    /// Any other non-success Calendar API status.
    #[error("calendar API error (HTTP {status})")]
    UpstreamOther { status: u16, message: Option<String> },

    /// No HTTP response at all (DNS, connect, body decode).
    #[error("request failed: {0}")]
    Transport(String),
}

impl GoogleError {
    /// Status code reported for this failure; 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            GoogleError::TokenRefresh { status, .. }
            | GoogleError::UpstreamAuth { status, .. }
            | GoogleError::UpstreamOther { status, .. } => *status,
            GoogleError::MissingToken | GoogleError::Transport(_) => 0,
        }
    }

    /// Human-readable message for the per-account summary.
    pub fn message(&self) -> Option<String> {
        match self {
            GoogleError::UpstreamAuth { message, .. }
            | GoogleError::UpstreamOther { message, .. } => message.clone(),
            GoogleError::TokenRefresh { body, .. } => body.clone(),
            GoogleError::MissingToken | GoogleError::Transport(_) => Some(self.to_string()),
        }
    }

    /// True when the Calendar API answered 401.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, GoogleError::UpstreamAuth { .. })
    }

    /// Classify a non-success Calendar API response.
    pub fn from_upstream(status: u16, message: Option<String>) -> Self {
        if status == 401 {
            GoogleError::UpstreamAuth { status, message }
        } else {
            GoogleError::UpstreamOther { status, message }
        }
    }
}
