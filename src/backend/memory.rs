use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use super::{password::hash_password, token::TokenKeys};
use super::{AccountBackend, BackendError, DocumentStore, UserCredential};

/// In-process account service and document store, for offline runs and
/// tests.
pub struct MemoryBackend {
    keys: TokenKeys,
    /// Normalized email -> argon2 hash.
    accounts: Mutex<HashMap<String, String>>,
    documents: Mutex<HashMap<(String, String), serde_json::Value>>,
}

impl MemoryBackend {
    pub fn new(keys: TokenKeys) -> Self {
        Self {
            keys,
            accounts: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn document(&self, collection: &str, key: &str) -> Option<serde_json::Value> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    pub fn password_hash(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&email.trim().to_lowercase())
            .cloned()
    }
}

#[async_trait]
impl AccountBackend for MemoryBackend {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, BackendError> {
        let normalized = email.trim().to_lowercase();
        let password_hash = hash_password(password)?;

        let uid = {
            let mut accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
            if accounts.contains_key(&normalized) {
                debug!("memory backend: duplicate email");
                return Err(BackendError::EmailAlreadyInUse);
            }
            accounts.insert(normalized.clone(), password_hash);
            Uuid::new_v4()
        };

        let id_token = self
            .keys
            .sign_id_token(uid, &normalized)
            .map_err(BackendError::Unexpected)?;
        info!(uid = %uid, "memory backend: account created");
        Ok(UserCredential {
            uid,
            email: normalized,
            id_token,
        })
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<()> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((collection.to_string(), key.to_string()), body);
        Ok(())
    }
}
