// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: a fake Google server and app builders.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use yearview::config::Config;
use yearview::db::{AccountStore, FirestoreDb, MemoryAccountStore};
use yearview::models::{AccountCredential, StoredAccount};
use yearview::routes::create_router;
use yearview::services::GoogleClient;
use yearview::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── Fake Google ─────────────────────────────────────────────

/// How the fake token endpoint answers for a refresh token.
#[derive(Clone)]
#[allow(dead_code)]
pub enum TokenReply {
    Grant {
        access_token: String,
        expires_in: Option<i64>,
        rotated_refresh_token: Option<String>,
    },
    Reject(u16),
}

/// How the fake calendar list answers for an access token.
#[derive(Clone)]
#[allow(dead_code)]
pub enum CalendarReply {
    Items(Vec<Value>),
    ItemsWithStatus(u16, Vec<Value>),
    Error(u16, Value),
}

/// Scripted Google endpoints plus request counters.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeGoogle {
    pub tokens: DashMap<String, TokenReply>,
    pub calendars: DashMap<String, CalendarReply>,
    pub openid_emails: DashMap<String, String>,
    pub legacy_emails: DashMap<String, String>,
    pub token_calls: AtomicUsize,
    pub calendar_calls: DashMap<String, usize>,
}

#[allow(dead_code)]
impl FakeGoogle {
    pub fn grant(&self, refresh_token: &str, access_token: &str) {
        self.tokens.insert(
            refresh_token.to_string(),
            TokenReply::Grant {
                access_token: access_token.to_string(),
                expires_in: Some(3599),
                rotated_refresh_token: None,
            },
        );
    }

    pub fn reject_refresh(&self, refresh_token: &str, status: u16) {
        self.tokens
            .insert(refresh_token.to_string(), TokenReply::Reject(status));
    }

    pub fn calendars_for(&self, access_token: &str, ids: &[&str]) {
        let items = ids
            .iter()
            .map(|id| json!({ "id": id, "summary": format!("Calendar {}", id), "accessRole": "owner" }))
            .collect();
        self.calendars
            .insert(access_token.to_string(), CalendarReply::Items(items));
    }

    pub fn calendar_error(&self, access_token: &str, status: u16, body: Value) {
        self.calendars.insert(
            access_token.to_string(),
            CalendarReply::Error(status, body),
        );
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn calendar_calls(&self, access_token: &str) -> usize {
        self.calendar_calls
            .get(access_token)
            .map(|c| *c)
            .unwrap_or(0)
    }
}

#[allow(dead_code)]
fn bearer(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

#[allow(dead_code)]
fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "code": 401, "message": "Invalid Credentials" } })),
    )
        .into_response()
}

#[allow(dead_code)]
async fn token_endpoint(
    State(fake): State<Arc<FakeGoogle>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    fake.token_calls.fetch_add(1, Ordering::SeqCst);

    if form.get("grant_type").map(String::as_str) != Some("refresh_token")
        || form.get("client_id").map(String::as_str) != Some("test_client_id")
        || form.get("client_secret").map(String::as_str) != Some("test_secret")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_request" })),
        )
            .into_response();
    }

    let refresh_token = form.get("refresh_token").cloned().unwrap_or_default();
    match fake.tokens.get(&refresh_token).map(|r| r.value().clone()) {
        Some(TokenReply::Grant {
            access_token,
            expires_in,
            rotated_refresh_token,
        }) => {
            let mut body = json!({ "access_token": access_token, "token_type": "Bearer" });
            if let Some(expires_in) = expires_in {
                body["expires_in"] = json!(expires_in);
            }
            if let Some(rotated) = rotated_refresh_token {
                body["refresh_token"] = json!(rotated);
            }
            Json(body).into_response()
        }
        Some(TokenReply::Reject(status)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
            Json(json!({ "error": "invalid_grant", "error_description": "Bad Request" })),
        )
            .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Token has been expired or revoked." })),
        )
            .into_response(),
    }
}

#[allow(dead_code)]
async fn calendar_list(
    State(fake): State<Arc<FakeGoogle>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let token = bearer(&headers);
    *fake.calendar_calls.entry(token.clone()).or_insert(0) += 1;

    assert_eq!(query.get("minAccessRole").map(String::as_str), Some("reader"));
    assert_eq!(query.get("maxResults").map(String::as_str), Some("250"));

    match fake.calendars.get(&token).map(|r| r.value().clone()) {
        Some(CalendarReply::Items(items)) => {
            Json(json!({ "kind": "calendar#calendarList", "items": items })).into_response()
        }
        Some(CalendarReply::ItemsWithStatus(status, items)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
            Json(json!({ "kind": "calendar#calendarList", "items": items })),
        )
            .into_response(),
        Some(CalendarReply::Error(status, body)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(body),
        )
            .into_response(),
        None => unauthorized(),
    }
}

#[allow(dead_code)]
async fn openid_userinfo(State(fake): State<Arc<FakeGoogle>>, headers: HeaderMap) -> Response {
    match fake.openid_emails.get(&bearer(&headers)) {
        Some(email) => Json(json!({ "sub": "1", "email": email.value().clone() })).into_response(),
        None => unauthorized(),
    }
}

#[allow(dead_code)]
async fn legacy_userinfo(State(fake): State<Arc<FakeGoogle>>, headers: HeaderMap) -> Response {
    match fake.legacy_emails.get(&bearer(&headers)) {
        Some(email) => Json(json!({ "id": "1", "email": email.value().clone() })).into_response(),
        None => unauthorized(),
    }
}

/// Start the fake Google server; returns its state and base URL.
#[allow(dead_code)]
pub async fn spawn_fake_google() -> (Arc<FakeGoogle>, String) {
    let fake = Arc::new(FakeGoogle::default());

    let app = Router::new()
        .route("/token", post(token_endpoint))
        .route("/calendar/v3/users/me/calendarList", get(calendar_list))
        .route("/v1/userinfo", get(openid_userinfo))
        .route("/oauth2/v2/userinfo", get(legacy_userinfo))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake google");
    let addr = listener.local_addr().expect("fake google addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake google server");
    });

    (fake, format!("http://{}", addr))
}

// ─── App builders ────────────────────────────────────────────

/// Config whose Google endpoints point at `base`.
#[allow(dead_code)]
pub fn test_config(base: &str) -> Config {
    Config::test_default().with_google_base(base)
}

#[allow(dead_code)]
pub fn google_client(base: &str) -> GoogleClient {
    GoogleClient::new(&test_config(base))
}

/// Create a test app backed by an in-memory store and the fake Google.
#[allow(dead_code)]
pub fn create_test_app(base: &str, store: MemoryAccountStore) -> (Router, Arc<AppState>) {
    let store: Arc<dyn AccountStore> = Arc::new(store);
    let state = Arc::new(AppState::new(test_config(base), store));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn stored_account(
    user_id: &str,
    account_id: &str,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> StoredAccount {
    StoredAccount {
        provider: "google".to_string(),
        provider_account_id: account_id.to_string(),
        user_id: user_id.to_string(),
        access_token: access_token.map(str::to_string),
        refresh_token: refresh_token.map(str::to_string),
        expires_at: expires_at.map(|t| t.timestamp()),
    }
}

#[allow(dead_code)]
pub fn credential(
    account_id: &str,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> AccountCredential {
    AccountCredential {
        account_id: account_id.to_string(),
        email: None,
        access_token: access_token.map(str::to_string),
        refresh_token: refresh_token.map(str::to_string),
        expires_at,
    }
}
