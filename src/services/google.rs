// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth and Calendar API client.
//!
//! Handles:
//! - Refresh-token exchange at the OAuth token endpoint
//! - Calendar list retrieval (first page, reader access and above)
//! - Best-effort email lookup via the userinfo endpoints

use crate::config::Config;
use crate::error::GoogleError;
use crate::models::calendar::GoogleCalendarList;
use crate::time_utils::expiry_from_expires_in;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Largest page the calendar list endpoint serves.
pub const CALENDAR_LIST_PAGE_SIZE: u32 = 250;

/// Google API client. Holds no per-user state.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    calendar_api_url: String,
    userinfo_urls: [String; 2],
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Only present when Google rotated the refresh token.
    pub refresh_token: Option<String>,
}

impl RefreshedToken {
    /// The refresh token to keep: the rotated one, else `previous`.
    pub fn rotated_or(&self, previous: Option<String>) -> Option<String> {
        self.refresh_token.clone().or(previous)
    }
}

/// A calendar list page together with the HTTP status it arrived with.
#[derive(Debug, Clone)]
pub struct CalendarPage {
    pub status: u16,
    pub list: GoogleCalendarList,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct UserInfo {
    email: Option<String>,
}

impl GoogleClient {
    /// Create a client from application config.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            token_url: config.google_token_url.clone(),
            calendar_api_url: config.google_calendar_api_url.trim_end_matches('/').to_string(),
            userinfo_urls: [
                config.google_openid_userinfo_url.clone(),
                config.google_oauth2_userinfo_url.clone(),
            ],
        }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// No retry happens here; callers decide what a failure means.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshedToken, GoogleError> {
        if refresh_token.is_empty() {
            return Err(GoogleError::TokenRefresh {
                status: 0,
                body: Some("empty refresh token".to_string()),
            });
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| GoogleError::Transport(format!("Token refresh request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            tracing::warn!(status = status.as_u16(), "Google token refresh rejected");
            return Err(GoogleError::TokenRefresh {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::Transport(format!("Failed to parse token response: {}", e)))?;

        Ok(RefreshedToken {
            access_token: token.access_token,
            expires_at: expiry_from_expires_in(Utc::now(), token.expires_in),
            refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
        })
    }

    /// List calendars the token's owner can at least read.
    ///
    /// Only the first page is fetched; see `CALENDAR_LIST_PAGE_SIZE`.
    pub async fn list_calendars(
        &self,
        access_token: &str,
    ) -> Result<CalendarPage, GoogleError> {
        let url = format!("{}/users/me/calendarList", self.calendar_api_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("minAccessRole", "reader".to_string()),
                ("maxResults", CALENDAR_LIST_PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| GoogleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<serde_json::Value>().await {
                Ok(body) => extract_error_message(&body),
                Err(_) => None,
            };
            return Err(GoogleError::from_upstream(status.as_u16(), message));
        }

        let list: GoogleCalendarList = response
            .json()
            .await
            .map_err(|e| GoogleError::Transport(format!("JSON parse error: {}", e)))?;

        if list.next_page_token.is_some() {
            tracing::warn!(
                page_size = CALENDAR_LIST_PAGE_SIZE,
                "Calendar list has more pages; only the first is used"
            );
        }

        Ok(CalendarPage {
            status: status.as_u16(),
            list,
        })
    }

    /// Look up the account email; OpenID endpoint first, then the legacy one.
    pub async fn fetch_email(&self, access_token: &str) -> Option<String> {
        for url in &self.userinfo_urls {
            match self.get_userinfo(url, access_token).await {
                Ok(Some(info)) => return info.email,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(error = %e, url = %url, "Userinfo lookup failed");
                }
            }
        }
        None
    }

    /// `Ok(None)` for a non-success status, so the next endpoint is tried.
    async fn get_userinfo(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<Option<UserInfo>, reqwest::Error> {
        let response = self.http.get(url).bearer_auth(access_token).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }
}

/// Pull a readable message out of a Google error body.
///
/// API errors carry `{"error": {"message": ...}}`; OAuth errors carry
/// `{"error": "...", "error_description": ...}`.
pub fn extract_error_message(body: &serde_json::Value) -> Option<String> {
    body.pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| body.get("error_description").and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_api_error_message() {
        let body = json!({ "error": { "code": 403, "message": "Insufficient Permission" } });
        assert_eq!(
            extract_error_message(&body).as_deref(),
            Some("Insufficient Permission")
        );
    }

    #[test]
    fn test_extract_oauth_error_description() {
        let body = json!({ "error": "invalid_grant", "error_description": "Token has been expired or revoked." });
        assert_eq!(
            extract_error_message(&body).as_deref(),
            Some("Token has been expired or revoked.")
        );
    }

    #[test]
    fn test_extract_nothing() {
        assert_eq!(extract_error_message(&json!({ "error": "x" })), None);
        assert_eq!(extract_error_message(&json!([])), None);
    }

    #[test]
    fn test_rotated_or_falls_back() {
        let refreshed = RefreshedToken {
            access_token: "at".to_string(),
            expires_at: Utc::now(),
            refresh_token: None,
        };
        assert_eq!(
            refreshed.rotated_or(Some("old".to_string())).as_deref(),
            Some("old")
        );

        let rotated = RefreshedToken {
            refresh_token: Some("new".to_string()),
            ..refreshed
        };
        assert_eq!(
            rotated.rotated_or(Some("old".to_string())).as_deref(),
            Some("new")
        );
    }

    #[tokio::test]
    async fn test_empty_refresh_token_is_rejected_locally() {
        let client = GoogleClient::new(&Config::test_default());
        let err = client.refresh_access_token("").await.unwrap_err();
        assert!(matches!(err, GoogleError::TokenRefresh { status: 0, .. }));
    }
}
