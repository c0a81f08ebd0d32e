// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account reconciliation: one fresh credential per linked Google account.
//!
//! Credentials live in two places, the account store and the session. The
//! reconciler loads the stored copies, refreshes stale ones (persisting the
//! result), merges in the session copies and makes a final freshness pass.
//! Individual account failures are logged and never surface as errors.

use crate::db::AccountStore;
use crate::error::AppError;
use crate::models::credential::prefer_candidate;
use crate::models::{AccountCredential, CredentialSource, TokenUpdate};
use crate::services::google::GoogleClient;
use crate::time_utils::needs_refresh;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Merges and refreshes per-account credentials for a user.
#[derive(Clone)]
pub struct AccountReconciler {
    store: Arc<dyn AccountStore>,
    google: GoogleClient,
}

/// A credential in the merged set, tagged with its origin.
struct MergedCredential {
    credential: AccountCredential,
    source: CredentialSource,
}

impl AccountReconciler {
    pub fn new(store: Arc<dyn AccountStore>, google: GoogleClient) -> Self {
        Self { store, google }
    }

    /// Produce the de-duplicated credential set for `user_id`.
    ///
    /// Only a failure to read the account store is returned as an error.
    pub async fn reconcile(
        &self,
        user_id: &str,
        session_accounts: &[AccountCredential],
    ) -> Result<Vec<AccountCredential>, AppError> {
        let stored = self.load_stored(user_id).await?;

        let session = session_accounts
            .iter()
            .cloned()
            .map(AccountCredential::normalized)
            .collect();
        let merged = merge_credentials(stored, session);

        let mut reconciled = Vec::with_capacity(merged.len());
        for mut entry in merged {
            // Store copies were refreshed on load; this catches session copies.
            self.refresh_if_stale(&mut entry.credential).await;
            if entry.credential.email.is_none() {
                if let Some(token) = entry.credential.access_token() {
                    entry.credential.email = self.google.fetch_email(token).await;
                }
            }
            tracing::debug!(
                user_id,
                account_id = %entry.credential.account_id,
                source = ?entry.source,
                has_refresh_token = entry.credential.has_refresh_token(),
                "Reconciled account"
            );
            reconciled.push(entry.credential);
        }

        Ok(reconciled)
    }

    /// Load stored credentials, refreshing and persisting stale ones.
    async fn load_stored(&self, user_id: &str) -> Result<Vec<AccountCredential>, AppError> {
        let rows = self.store.list_google_accounts(user_id).await?;

        let mut credentials = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut credential = AccountCredential::from_stored(row);
            if self.refresh_if_stale(&mut credential).await {
                self.persist(&credential).await;
            }
            credentials.push(credential);
        }
        Ok(credentials)
    }

    /// Refresh a credential in place when its token is stale.
    ///
    /// Returns true when a new access token was obtained. On failure the old
    /// token is kept; a later API call may still fail with it.
    async fn refresh_if_stale(&self, credential: &mut AccountCredential) -> bool {
        let Some(refresh_token) = credential
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
        else {
            return false;
        };
        if !needs_refresh(credential.expires_at, Utc::now()) {
            return false;
        }

        match self.google.refresh_access_token(&refresh_token).await {
            Ok(refreshed) => {
                credential.refresh_token = refreshed.rotated_or(Some(refresh_token));
                credential.access_token = Some(refreshed.access_token);
                credential.expires_at = Some(refreshed.expires_at);
                tracing::info!(account_id = %credential.account_id, "Access token refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(
                    account_id = %credential.account_id,
                    error = %e,
                    "Token refresh failed, keeping existing token"
                );
                false
            }
        }
    }

    /// Best-effort write-back; concurrent writers are last-write-wins.
    async fn persist(&self, credential: &AccountCredential) {
        let (Some(access_token), Some(expires_at)) =
            (credential.access_token.clone(), credential.expires_at)
        else {
            return;
        };
        let update = TokenUpdate::new(access_token, credential.refresh_token.clone(), expires_at);
        if let Err(e) = self
            .store
            .update_tokens(&credential.account_id, &update)
            .await
        {
            tracing::warn!(
                account_id = %credential.account_id,
                error = %e,
                "Failed to persist refreshed tokens"
            );
        }
    }
}

/// Merge stored and session credentials, one entry per account id.
///
/// Stored entries come first in store order, followed by accounts only the
/// session knows about. A session copy replaces a stored one only when it is
/// strictly fresher.
fn merge_credentials(
    stored: Vec<AccountCredential>,
    session: Vec<AccountCredential>,
) -> Vec<MergedCredential> {
    let mut merged: Vec<MergedCredential> = Vec::with_capacity(stored.len() + session.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    let tagged = stored
        .into_iter()
        .map(|c| (c, CredentialSource::Store))
        .chain(session.into_iter().map(|c| (c, CredentialSource::Session)));

    for (credential, source) in tagged {
        match index.get(&credential.account_id) {
            Some(&i) => {
                if prefer_candidate(&merged[i].credential, &credential) {
                    merged[i] = MergedCredential { credential, source };
                }
            }
            None => {
                index.insert(credential.account_id.clone(), merged.len());
                merged.push(MergedCredential { credential, source });
            }
        }
    }

    merged
}
