// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Linked Google account credentials and the merge rule between copies.

use crate::models::account::StoredAccount;
use crate::time_utils::from_epoch_secs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Where a reconciled credential was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Store,
    Session,
}

/// OAuth credentials for one linked Google account.
///
/// Session tokens embed these as camelCase JSON with the expiry in
/// milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCredential {
    /// Stable Google account id (the `sub` of the linked account)
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        rename = "accessTokenExpires",
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccountCredential {
    /// Build a credential from a persisted account row.
    ///
    /// Empty strings in the store are treated as absent.
    pub fn from_stored(row: &StoredAccount) -> Self {
        Self {
            account_id: row.provider_account_id.clone(),
            email: None,
            access_token: non_empty(row.access_token.as_deref()),
            refresh_token: non_empty(row.refresh_token.as_deref()),
            expires_at: from_epoch_secs(row.expires_at),
        }
    }

    /// Drop empty token strings so they count as absent.
    pub fn normalized(mut self) -> Self {
        self.access_token = non_empty(self.access_token.as_deref());
        self.refresh_token = non_empty(self.refresh_token.as_deref());
        self
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Access token, if one is usable.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Compare two copies of the same account by freshness.
///
/// Holding a refresh token outranks everything else; between copies that
/// agree on that, the later expiry wins and an unknown expiry is oldest.
pub fn freshness(a: &AccountCredential, b: &AccountCredential) -> Ordering {
    a.has_refresh_token()
        .cmp(&b.has_refresh_token())
        .then_with(|| a.expires_at.cmp(&b.expires_at))
}

/// Whether `candidate` should replace `existing`.
///
/// Replacement only happens on a strict improvement, so ties keep the
/// existing copy.
pub fn prefer_candidate(existing: &AccountCredential, candidate: &AccountCredential) -> bool {
    freshness(candidate, existing) == Ordering::Greater
}
