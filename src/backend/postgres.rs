use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{password::hash_password, token::TokenKeys};
use super::{AccountBackend, BackendError, DocumentStore, UserCredential};

/// Self-hosted account service on Postgres.
#[derive(Clone)]
pub struct PgBackend {
    db: PgPool,
    keys: TokenKeys,
}

impl PgBackend {
    pub async fn connect(database_url: &str, keys: TokenKeys) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db, keys })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

pub(crate) fn map_sqlx_error(e: sqlx::Error) -> BackendError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            BackendError::EmailAlreadyInUse
        }
        sqlx::Error::Io(e) => BackendError::Network(e.to_string()),
        sqlx::Error::Tls(e) => BackendError::Network(e.to_string()),
        sqlx::Error::PoolTimedOut => BackendError::Network("connection pool timed out".into()),
        sqlx::Error::PoolClosed => BackendError::Network("connection pool closed".into()),
        other => BackendError::Unexpected(other.into()),
    }
}

#[async_trait]
impl AccountBackend for PgBackend {
    #[instrument(skip(self, password))]
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, BackendError> {
        let email = email.trim().to_lowercase();

        let plain = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&plain))
            .await
            .map_err(|e| BackendError::Unexpected(e.into()))??;

        let uid: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            let mapped = map_sqlx_error(e);
            match &mapped {
                BackendError::EmailAlreadyInUse => warn!(email = %email, "email already registered"),
                other => error!(error = %other, "insert account failed"),
            }
            mapped
        })?;

        let id_token = self
            .keys
            .sign_id_token(uid, &email)
            .map_err(BackendError::Unexpected)?;

        info!(uid = %uid, email = %email, "account created");
        Ok(UserCredential {
            uid,
            email,
            id_token,
        })
    }
}

#[async_trait]
impl DocumentStore for PgBackend {
    #[instrument(skip(self, body))]
    async fn set_document(
        &self,
        collection: &str,
        key: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, key)
            DO UPDATE SET body = EXCLUDED.body, updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(sqlx::types::Json(body))
        .execute(&self.db)
        .await
        .with_context(|| format!("set document {collection}/{key}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    /// Stand-in for a Postgres server error carrying a SQLSTATE.
    #[derive(Debug, thiserror::Error)]
    #[error("{message}")]
    struct PgServerError {
        message: &'static str,
        sqlstate: &'static str,
        unique: bool,
    }

    impl DatabaseError for PgServerError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.sqlstate))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.unique.then_some("accounts_email_key")
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    #[test]
    fn unique_violation_maps_to_email_in_use() {
        let err = sqlx::Error::Database(Box::new(PgServerError {
            message: "duplicate key value violates unique constraint \"accounts_email_key\"",
            sqlstate: "23505",
            unique: true,
        }));
        assert!(matches!(map_sqlx_error(err), BackendError::EmailAlreadyInUse));
    }

    #[test]
    fn other_database_errors_are_unexpected() {
        let err = sqlx::Error::Database(Box::new(PgServerError {
            message: "relation \"accounts\" does not exist",
            sqlstate: "42P01",
            unique: false,
        }));
        assert!(matches!(map_sqlx_error(err), BackendError::Unexpected(_)));
    }

    #[test]
    fn transport_failures_map_to_network() {
        let io = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(map_sqlx_error(io), BackendError::Network(_)));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            BackendError::Network(_)
        ));
    }

    #[test]
    fn other_failures_are_unexpected() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            BackendError::Unexpected(_)
        ));
    }
}
