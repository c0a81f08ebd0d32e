// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper for linked-account rows.

use crate::db::{collections, AccountStore};
use crate::error::AppError;
use crate::models::account::{document_id, GOOGLE_PROVIDER};
use crate::models::{StoredAccount, TokenUpdate};
use async_trait::async_trait;
use firestore::paths;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::AccountStore(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::AccountStore(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client for testing; every operation fails.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::AccountStore("Database not connected (offline mode)".to_string())
        })
    }

    /// Get a single account row.
    pub async fn get_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<StoredAccount>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACCOUNTS)
            .obj()
            .one(&document_id(provider, provider_account_id))
            .await
            .map_err(|e| AppError::AccountStore(e.to_string()))
    }

    /// Create or replace an account row (used when linking and in tests).
    pub async fn upsert_account(&self, account: &StoredAccount) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACCOUNTS)
            .document_id(account.document_id())
            .object(account)
            .execute()
            .await
            .map_err(|e| AppError::AccountStore(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FirestoreDb {
    async fn list_google_accounts(&self, user_id: &str) -> Result<Vec<StoredAccount>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACCOUNTS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("provider").eq(GOOGLE_PROVIDER),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::AccountStore(e.to_string()))
    }

    async fn update_tokens(
        &self,
        provider_account_id: &str,
        update: &TokenUpdate,
    ) -> Result<(), AppError> {
        let mut account = self
            .get_account(GOOGLE_PROVIDER, provider_account_id)
            .await?
            .ok_or_else(|| {
                AppError::AccountStore(format!("Account {} not found", provider_account_id))
            })?;
        account.apply(update);

        // Field mask keeps concurrent edits to other columns intact.
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths!(StoredAccount::{access_token, refresh_token, expires_at}))
            .in_col(collections::ACCOUNTS)
            .document_id(account.document_id())
            .object(&account)
            .execute()
            .await
            .map_err(|e| AppError::AccountStore(e.to_string()))?;

        tracing::debug!(account_id = provider_account_id, "Persisted refreshed tokens");
        Ok(())
    }
}
