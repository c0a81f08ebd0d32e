//! Account storage (Firestore in production, in-memory for local runs).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryAccountStore;

use crate::error::AppError;
use crate::models::{StoredAccount, TokenUpdate};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Linked OAuth accounts (keyed by `<provider>_<provider_account_id>`)
    pub const ACCOUNTS: &str = "accounts";
}

/// Persisted linked accounts.
///
/// Reconciliation only ever reads a user's Google rows and writes back the
/// token columns of a single row.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// All Google accounts linked to `user_id`.
    async fn list_google_accounts(&self, user_id: &str) -> Result<Vec<StoredAccount>, AppError>;

    /// Overwrite `access_token`, `refresh_token` and `expires_at` for one row.
    async fn update_tokens(
        &self,
        provider_account_id: &str,
        update: &TokenUpdate,
    ) -> Result<(), AppError>;
}
