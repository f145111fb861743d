//! Remote account service consumed by the sign-up flow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod memory;
pub mod password;
pub mod postgres;
pub mod token;

/// Collection holding one profile document per account.
pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("email already in use")]
    EmailAlreadyInUse,
    #[error("network error: {0}")]
    Network(String),
    #[error("too many requests")]
    RateLimited,
    #[error("unexpected backend error")]
    Unexpected(#[source] anyhow::Error),
}

impl BackendError {
    /// Stable machine-readable code, matching the auth service's codes.
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::EmailAlreadyInUse => "auth/email-already-in-use",
            BackendError::Network(_) => "auth/network-request-failed",
            BackendError::RateLimited => "auth/too-many-requests",
            BackendError::Unexpected(_) => "auth/internal-error",
        }
    }
}

/// Returned by a successful account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredential {
    pub uid: Uuid,
    pub email: String,
    pub id_token: String,
}

/// Profile document stored under `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait AccountBackend: Send + Sync {
    async fn create_account(&self, email: &str, password: &str)
        -> Result<UserCredential, BackendError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn user_record_uses_camel_case_and_rfc3339() {
        let record = UserRecord {
            email: "diner@example.com".into(),
            created_at: datetime!(2024-05-01 12:30:00 UTC),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["email"], "diner@example.com");
        assert_eq!(json["createdAt"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn error_codes() {
        assert_eq!(BackendError::EmailAlreadyInUse.code(), "auth/email-already-in-use");
        assert_eq!(BackendError::RateLimited.code(), "auth/too-many-requests");
        assert_eq!(
            BackendError::Network("timeout".into()).code(),
            "auth/network-request-failed"
        );
    }
}
