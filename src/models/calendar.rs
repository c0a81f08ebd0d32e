// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar list models: Google wire types and the aggregated API response.

use serde::{Deserialize, Serialize};

/// Title shown for calendars the provider returns without a summary.
pub const UNTITLED_CALENDAR: &str = "(Untitled)";

// ─── Google Calendar API ─────────────────────────────────────

/// One page of `users/me/calendarList`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarList {
    #[serde(default)]
    pub items: Vec<GoogleCalendarListEntry>,
    pub next_page_token: Option<String>,
}

/// A calendar as listed by Google.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarListEntry {
    pub id: String,
    pub summary: Option<String>,
    pub primary: Option<bool>,
    pub background_color: Option<String>,
    pub access_role: Option<String>,
}

// ─── Aggregated response ─────────────────────────────────────

/// A calendar in the unified, cross-account list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    /// `"<accountId>|<originalId>"`, unique within a response
    pub id: String,
    pub original_id: String,
    pub account_id: String,
    pub account_email: Option<String>,
    pub summary: String,
    pub primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_role: Option<String>,
}

impl CalendarEntry {
    /// Namespace a provider calendar under its owning account.
    pub fn from_google(
        account_id: &str,
        account_email: Option<&str>,
        entry: GoogleCalendarListEntry,
    ) -> Self {
        Self {
            id: namespaced_id(account_id, &entry.id),
            original_id: entry.id,
            account_id: account_id.to_string(),
            account_email: account_email.map(str::to_string),
            summary: entry
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNTITLED_CALENDAR.to_string()),
            primary: entry.primary.unwrap_or(false),
            background_color: entry.background_color,
            access_role: entry.access_role,
        }
    }
}

/// Composite calendar ID.
pub fn namespaced_id(account_id: &str, calendar_id: &str) -> String {
    format!("{}|{}", account_id, calendar_id)
}

/// Outcome of one account's calendar-list call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFetchResult {
    pub account_id: String,
    pub email: Option<String>,
    /// HTTP status of the final attempt; 0 when no request was made
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AccountFetchResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Raw per-account detail returned with `?debug=1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDebug {
    pub account_id: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /calendars`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalendarsResponse {
    pub calendars: Vec<CalendarEntry>,
    pub accounts: Vec<AccountFetchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Vec<AccountDebug>>,
}
