// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unified calendar list across linked Google accounts.

use crate::error::Result;
use crate::middleware::auth::Session;
use crate::models::CalendarsResponse;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

/// Calendar routes. The session middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/calendars", get(get_calendars))
}

/// First value of the `debug` query parameter; `"1"` enables debug detail.
///
/// Read from the raw pairs so repeated parameters are tolerated.
fn debug_enabled(params: &[(String, String)]) -> bool {
    params
        .iter()
        .find(|(key, _)| key == "debug")
        .is_some_and(|(_, value)| value == "1")
}

/// List calendars from every linked account.
///
/// Signed-out callers get an empty list with 200. Per-account failures are
/// reported in `accounts`; only an account store failure is an error.
async fn get_calendars(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Option<Session>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<CalendarsResponse>> {
    let Some(session) = session else {
        tracing::debug!("No session, returning empty calendar list");
        return Ok(Json(CalendarsResponse::default()));
    };

    let credentials = state
        .reconciler
        .reconcile(&session.user_id, &session.google_accounts)
        .await?;

    let response = state
        .aggregator
        .aggregate(&credentials, debug_enabled(&params))
        .await;

    Ok(Json(response))
}
