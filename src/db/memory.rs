// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process account store backed by a `DashMap`.

use crate::db::AccountStore;
use crate::error::AppError;
use crate::models::account::{document_id, GOOGLE_PROVIDER};
use crate::models::{StoredAccount, TokenUpdate};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Account rows keyed by document ID. Cloning shares the same rows.
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    rows: Arc<DashMap<String, StoredAccount>>,
    unavailable: Arc<AtomicBool>,
    writes_failing: Arc<AtomicBool>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_account(&self, account: StoredAccount) {
        self.rows.insert(account.document_id(), account);
    }

    pub fn get_account(&self, provider: &str, provider_account_id: &str) -> Option<StoredAccount> {
        self.rows
            .get(&document_id(provider, provider_account_id))
            .map(|row| row.clone())
    }

    /// Make every subsequent operation fail, as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make token updates fail while reads keep working.
    pub fn set_writes_failing(&self, failing: bool) {
        self.writes_failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::AccountStore(
                "Account store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn list_google_accounts(&self, user_id: &str) -> Result<Vec<StoredAccount>, AppError> {
        self.check_available()?;
        let mut accounts: Vec<StoredAccount> = self
            .rows
            .iter()
            .filter(|row| row.user_id == user_id && row.provider == GOOGLE_PROVIDER)
            .map(|row| row.value().clone())
            .collect();
        // DashMap iteration order is arbitrary
        accounts.sort_by(|a, b| a.provider_account_id.cmp(&b.provider_account_id));
        Ok(accounts)
    }

    async fn update_tokens(
        &self,
        provider_account_id: &str,
        update: &TokenUpdate,
    ) -> Result<(), AppError> {
        self.check_available()?;
        if self.writes_failing.load(Ordering::SeqCst) {
            return Err(AppError::AccountStore(
                "Account store rejected write".to_string(),
            ));
        }
        let mut row = self
            .rows
            .get_mut(&document_id(GOOGLE_PROVIDER, provider_account_id))
            .ok_or_else(|| {
                AppError::AccountStore(format!("Account {} not found", provider_account_id))
            })?;
        row.apply(update);
        Ok(())
    }
}
