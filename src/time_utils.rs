// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for token expiry arithmetic.

use chrono::{DateTime, Duration, Utc};

/// Look-ahead window: tokens expiring within this many seconds are refreshed.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// True when the token's expiry is unknown or falls within the refresh margin.
pub fn needs_refresh(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        None => true,
        Some(expiry) => expiry < now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS),
    }
}

/// Absolute expiry for a token issued `now` with `expires_in` seconds to live.
pub fn expiry_from_expires_in(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    now + Duration::seconds(expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
}

/// Convert a stored `expires_at` (seconds since epoch) into a timestamp.
pub fn from_epoch_secs(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}
