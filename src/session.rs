use tracing::debug;

use crate::storage::KeyValueStore;

pub const IS_GUEST_KEY: &str = "isGuest";
pub const USER_EMAIL_KEY: &str = "userEmail";

/// Flags the startup routing reads to decide where the app opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub is_guest: bool,
    pub user_email: Option<String>,
}

impl SessionFlags {
    pub async fn load(store: &dyn KeyValueStore) -> anyhow::Result<Self> {
        let is_guest = store.get(IS_GUEST_KEY).await?.as_deref() == Some("true");
        let user_email = store.get(USER_EMAIL_KEY).await?;
        Ok(Self {
            is_guest,
            user_email,
        })
    }
}

pub async fn mark_guest(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    store.set(IS_GUEST_KEY, "true").await?;
    debug!("session marked as guest");
    Ok(())
}

/// Writes the guest flag first, then the email.
pub async fn mark_signed_up(store: &dyn KeyValueStore, email: &str) -> anyhow::Result<()> {
    store.set(IS_GUEST_KEY, "false").await?;
    store.set(USER_EMAIL_KEY, email).await?;
    debug!("session marked as signed up");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn empty_store_loads_defaults() {
        let store = MemoryStore::new();
        assert_eq!(SessionFlags::load(&store).await.unwrap(), SessionFlags::default());
    }

    #[tokio::test]
    async fn signed_up_flags_roundtrip_through_store() {
        let store = MemoryStore::new();
        mark_guest(&store).await.unwrap();
        mark_signed_up(&store, "diner@example.com").await.unwrap();

        let flags = SessionFlags::load(&store).await.unwrap();
        assert!(!flags.is_guest);
        assert_eq!(flags.user_email.as_deref(), Some("diner@example.com"));
        assert_eq!(store.get(IS_GUEST_KEY).await.unwrap().as_deref(), Some("false"));
    }
}
