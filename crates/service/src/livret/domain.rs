use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booklet content. Opaque to the backend; only its emptiness is inspected.
pub type Livret = serde_json::Map<String, serde_json::Value>;

/// Persisted student record, keyed by `id` in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub nom: String,
    pub prenom: String,
    pub classe: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
    #[serde(default)]
    pub livret: Livret,
}

impl StudentRecord {
    pub fn has_data(&self) -> bool {
        !self.livret.is_empty()
    }

    /// Case-insensitive match on the identity used to claim a code.
    pub fn same_identity(&self, nom: &str, prenom: &str) -> bool {
        self.nom.to_lowercase() == nom.to_lowercase()
            && self.prenom.to_lowercase() == prenom.to_lowercase()
    }

    pub fn summary(&self) -> StudentSummary {
        StudentSummary {
            id: self.id.clone(),
            nom: self.nom.clone(),
            prenom: self.prenom.clone(),
            classe: self.classe.clone(),
            last_saved: self.last_saved,
            has_data: self.has_data(),
        }
    }
}

/// Derive the record id from an access code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Student login input. Fields are optional so that absence surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub classe: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub id: String,
    pub last_saved: Option<DateTime<Utc>>,
    pub has_data: bool,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub livret: Livret,
    pub last_saved: Option<DateTime<Utc>>,
}

/// Admin list projection: booklet presence, not content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub nom: String,
    pub prenom: String,
    pub classe: String,
    pub last_saved: Option<DateTime<Utc>>,
    pub has_data: bool,
}
