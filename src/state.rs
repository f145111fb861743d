use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::{
    memory::MemoryBackend, postgres::PgBackend, token::TokenKeys, AccountBackend, DocumentStore,
};
use crate::config::AppConfig;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::ui::{Alerter, ConsoleUi, Navigator};

/// Collaborators the sign-up screen talks to.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountBackend>,
    pub documents: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn KeyValueStore>,
    pub navigator: Arc<dyn Navigator>,
    pub alerter: Arc<dyn Alerter>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let keys = TokenKeys::from(&config.token);

        let (accounts, documents): (Arc<dyn AccountBackend>, Arc<dyn DocumentStore>) =
            match &config.database_url {
                Some(url) => {
                    let pg = PgBackend::connect(url, keys).await?;
                    // Run migrations if present
                    if let Err(e) = pg.migrate().await {
                        warn!(error = %e, "migration failed; continuing");
                    }
                    info!("using postgres account backend");
                    let pg = Arc::new(pg);
                    (pg.clone() as Arc<dyn AccountBackend>, pg as Arc<dyn DocumentStore>)
                }
                None => {
                    info!("DATABASE_URL not set; using in-memory account backend");
                    let mem = Arc::new(MemoryBackend::new(keys));
                    (mem.clone() as Arc<dyn AccountBackend>, mem as Arc<dyn DocumentStore>)
                }
            };

        let storage = Arc::new(FileStore::new(&config.storage_path)) as Arc<dyn KeyValueStore>;
        let ui = Arc::new(ConsoleUi::new());

        Ok(Self {
            config,
            accounts,
            documents,
            storage,
            navigator: ui.clone(),
            alerter: ui,
        })
    }

    pub fn fake() -> Self {
        let config = Arc::new(AppConfig::fake());
        let backend = Arc::new(MemoryBackend::new(TokenKeys::from(&config.token)));
        let ui = Arc::new(ConsoleUi::new());
        Self {
            config,
            accounts: backend.clone(),
            documents: backend,
            storage: Arc::new(MemoryStore::new()),
            navigator: ui.clone(),
            alerter: ui,
        }
    }
}
