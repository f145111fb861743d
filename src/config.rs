use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// When unset the app runs against the in-process backend.
    pub database_url: Option<String>,
    pub storage_path: PathBuf,
    pub password_min_len: usize,
    pub token: TokenConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let storage_path = std::env::var("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".dinetime/storage.json"));
        let password_min_len = match std::env::var("PASSWORD_MIN_LENGTH") {
            Ok(v) => v
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("PASSWORD_MIN_LENGTH={v:?}: {e}"))?,
            Err(_) => 6,
        };
        let token = TokenConfig {
            secret: std::env::var("TOKEN_SECRET").unwrap_or_else(|_| "dev-secret".into()),
            issuer: std::env::var("TOKEN_ISSUER").unwrap_or_else(|_| "dinetime".into()),
            audience: std::env::var("TOKEN_AUDIENCE").unwrap_or_else(|_| "dinetime-app".into()),
            ttl_minutes: std::env::var("TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        Ok(Self {
            database_url,
            storage_path,
            password_min_len,
            token,
        })
    }

    pub fn fake() -> Self {
        Self {
            database_url: None,
            storage_path: std::env::temp_dir().join("dinetime-test-storage.json"),
            password_min_len: 6,
            token: TokenConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
        }
    }
}
