use std::{fmt, sync::Arc};

use chartshot_core::{MediaStorage, PostgresDatabase};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PostgresDatabase>,
    pub storage: Arc<MediaStorage>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(db: PostgresDatabase, config: Config) -> Self {
        let storage = MediaStorage::new(config.storage.public_root.clone());
        Self {
            db: Arc::new(db),
            storage: Arc::new(storage),
            config: Arc::new(config),
        }
    }
}
