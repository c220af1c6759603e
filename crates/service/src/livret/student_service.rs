use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use super::domain::{normalize_code, LoadOutcome, Livret, LoginInput, LoginOutcome, StudentRecord};
use super::repository::LivretRepository;
use crate::errors::ServiceError;

/// Student-facing operations: login (create-or-verify), save and load.
pub struct StudentService {
    repo: Arc<dyn LivretRepository>,
}

fn required(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!("{field} is required"))),
    }
}

impl StudentService {
    pub fn new(repo: Arc<dyn LivretRepository>) -> Self { Self { repo } }

    /// Create the record on first use of a code, otherwise check that the
    /// caller matches the identity that claimed it.
    ///
    /// # Examples
    /// ```
    /// use service::livret::{StudentService, domain::LoginInput, repository::mock::MockLivretRepository};
    /// use std::sync::Arc;
    /// let svc = StudentService::new(Arc::new(MockLivretRepository::default()));
    /// let input = LoginInput { nom: Some("Dupont".into()), prenom: Some("Lea".into()), classe: Some("CM2".into()), code: Some("ABC123".into()) };
    /// let out = tokio_test::block_on(svc.login(input)).unwrap();
    /// assert_eq!(out.id, "abc123");
    /// assert!(!out.has_data);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginOutcome, ServiceError> {
        let nom = required(input.nom, "nom")?;
        let prenom = required(input.prenom, "prenom")?;
        let classe = required(input.classe, "classe")?;
        let code = required(input.code, "code")?;
        let id = normalize_code(&code);

        let fresh = StudentRecord {
            id: id.clone(),
            nom: nom.clone(),
            prenom: prenom.clone(),
            classe,
            code,
            created_at: Utc::now(),
            last_saved: None,
            livret: Livret::new(),
        };
        let (record, created) = self.repo.insert_if_absent(fresh).await?;

        if created {
            info!(eleve_id = %record.id, classe = %record.classe, "eleve_created");
        } else if !record.same_identity(&nom, &prenom) {
            warn!(eleve_id = %record.id, "login refused: code claimed by another identity");
            return Err(ServiceError::AuthConflict);
        } else {
            debug!(eleve_id = %record.id, "eleve_login");
        }

        Ok(LoginOutcome {
            id: record.id.clone(),
            last_saved: record.last_saved,
            has_data: record.has_data(),
            created,
        })
    }

    /// Replace the whole booklet; no merge with the previous content.
    #[instrument(skip(self, livret), fields(entries = livret.len()))]
    pub async fn save(&self, id: &str, livret: Livret) -> Result<DateTime<Utc>, ServiceError> {
        let now = Utc::now();
        let record = self
            .repo
            .replace_livret(id, livret, now)
            .await?
            .ok_or_else(|| ServiceError::not_found("eleve"))?;
        info!(eleve_id = %record.id, "livret_saved");
        Ok(now)
    }

    #[instrument(skip(self))]
    pub async fn load(&self, id: &str) -> Result<LoadOutcome, ServiceError> {
        let record = self.repo.get(id).await.ok_or_else(|| ServiceError::not_found("eleve"))?;
        Ok(LoadOutcome { livret: record.livret, last_saved: record.last_saved })
    }
}
