//! Persisted linked-account rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider key for Google accounts.
pub const GOOGLE_PROVIDER: &str = "google";

/// Linked OAuth account stored in Firestore, keyed by
/// `(provider, provider_account_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAccount {
    pub provider: String,
    pub provider_account_id: String,
    /// Owning application user
    pub user_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Access token expiry (seconds since epoch)
    pub expires_at: Option<i64>,
}

impl StoredAccount {
    /// Firestore document ID.
    pub fn document_id(&self) -> String {
        document_id(&self.provider, &self.provider_account_id)
    }

    /// Apply refreshed token fields in place.
    pub fn apply(&mut self, update: &TokenUpdate) {
        self.access_token = Some(update.access_token.clone());
        self.refresh_token = update.refresh_token.clone();
        self.expires_at = Some(update.expires_at);
    }
}

/// Document ID for an account row; the provider id is URL-encoded to stay
/// a valid Firestore path segment.
pub fn document_id(provider: &str, provider_account_id: &str) -> String {
    format!("{}_{}", provider, urlencoding::encode(provider_account_id))
}

/// The only columns written back after a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenUpdate {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Seconds since epoch
    pub expires_at: i64,
}

impl TokenUpdate {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: expires_at.timestamp(),
        }
    }
}
