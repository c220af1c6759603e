use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::{Livret, StudentRecord};
use super::repository::LivretRepository;
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// File-backed student store: one JSON document mapping `id -> StudentRecord`.
#[derive(Clone)]
pub struct FileLivretStore {
    store: Arc<JsonMapStore<String, StudentRecord>>,
}

impl FileLivretStore {
    /// Initialize the store from the given file path. Creates the file if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, StudentRecord>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }
}

#[async_trait]
impl LivretRepository for FileLivretStore {
    async fn list(&self) -> Vec<StudentRecord> {
        self.store.list().await.into_iter().map(|(_, v)| v).collect()
    }

    async fn get(&self, id: &str) -> Option<StudentRecord> {
        self.store.get(&id.to_string()).await
    }

    async fn insert_if_absent(&self, record: StudentRecord) -> Result<(StudentRecord, bool), ServiceError> {
        let key = record.id.clone();
        self.store.get_or_insert_with(key, move || record).await
    }

    async fn replace_livret(&self, id: &str, livret: Livret, saved_at: DateTime<Utc>) -> Result<Option<StudentRecord>, ServiceError> {
        self.store
            .update_entry(&id.to_string(), move |r| {
                r.livret = livret;
                r.last_saved = Some(saved_at);
            })
            .await
    }
}
