use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::{Livret, StudentRecord};
use crate::errors::ServiceError;

/// Persistence seam for student records.
/// Implementations can be file-backed, database-backed, or a remote KV.
#[async_trait]
pub trait LivretRepository: Send + Sync {
    async fn list(&self) -> Vec<StudentRecord>;
    async fn get(&self, id: &str) -> Option<StudentRecord>;
    /// Store `record` unless its id is taken. Returns the stored record and
    /// whether it was inserted. Check and insert happen atomically.
    async fn insert_if_absent(&self, record: StudentRecord) -> Result<(StudentRecord, bool), ServiceError>;
    /// Replace the booklet and stamp `saved_at`; `None` when the id is unknown.
    async fn replace_livret(&self, id: &str, livret: Livret, saved_at: DateTime<Utc>) -> Result<Option<StudentRecord>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockLivretRepository {
        records: Mutex<HashMap<String, StudentRecord>>,
    }

    #[async_trait]
    impl LivretRepository for MockLivretRepository {
        async fn list(&self) -> Vec<StudentRecord> {
            self.records.lock().unwrap().values().cloned().collect()
        }

        async fn get(&self, id: &str) -> Option<StudentRecord> {
            self.records.lock().unwrap().get(id).cloned()
        }

        async fn insert_if_absent(&self, record: StudentRecord) -> Result<(StudentRecord, bool), ServiceError> {
            let mut records = self.records.lock().unwrap();
            if let Some(existing) = records.get(&record.id) {
                return Ok((existing.clone(), false));
            }
            records.insert(record.id.clone(), record.clone());
            Ok((record, true))
        }

        async fn replace_livret(&self, id: &str, livret: Livret, saved_at: DateTime<Utc>) -> Result<Option<StudentRecord>, ServiceError> {
            let mut records = self.records.lock().unwrap();
            Ok(records.get_mut(id).map(|r| {
                r.livret = livret;
                r.last_saved = Some(saved_at);
                r.clone()
            }))
        }
    }
}
