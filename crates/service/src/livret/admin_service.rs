use std::sync::Arc;

use tracing::{instrument, warn};

use super::domain::{StudentRecord, StudentSummary};
use super::repository::LivretRepository;
use crate::errors::ServiceError;

/// Teacher-facing operations, all gated by the shared admin secret.
///
/// The secret is compared as plaintext; there is no hashing or rate limiting.
pub struct AdminService {
    repo: Arc<dyn LivretRepository>,
    secret: String,
}

impl AdminService {
    pub fn new(repo: Arc<dyn LivretRepository>, secret: impl Into<String>) -> Self {
        Self { repo, secret: secret.into() }
    }

    pub fn verify(&self, password: Option<&str>) -> Result<(), ServiceError> {
        match password {
            Some(p) if p == self.secret => Ok(()),
            _ => {
                warn!(event = "admin_auth_failed", "rejected admin password");
                Err(ServiceError::Unauthorized)
            }
        }
    }

    /// Summaries of every student, sorted by id.
    #[instrument(skip_all)]
    pub async fn list_students(&self, password: Option<&str>) -> Result<Vec<StudentSummary>, ServiceError> {
        self.verify(password)?;
        let mut eleves: Vec<StudentSummary> = self.repo.list().await.iter().map(StudentRecord::summary).collect();
        eleves.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(eleves)
    }

    #[instrument(skip(self, password))]
    pub async fn get_student(&self, password: Option<&str>, id: &str) -> Result<StudentRecord, ServiceError> {
        self.verify(password)?;
        self.repo.get(id).await.ok_or_else(|| ServiceError::not_found("eleve"))
    }
}
