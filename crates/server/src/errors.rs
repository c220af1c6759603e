use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{debug, error};

pub const WRONG_PASSWORD: &str = "Mot de passe incorrect.";
pub const NOT_AUTHORIZED: &str = "Non autorisé.";

/// Request-level error: every service failure maps to a status code and a
/// `{"error": ...}` body with the message shown by the front-end.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServiceError,
    unauthorized_message: &'static str,
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self { Self::new(e) }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self { Self::new(ServiceError::Validation(e.body_text())) }
}

impl ApiError {
    pub fn new(error: ServiceError) -> Self {
        Self { error, unauthorized_message: WRONG_PASSWORD }
    }

    /// For password-gated reads: a bad secret reads as "Non autorisé.".
    pub fn not_authorized(error: ServiceError) -> Self {
        Self { error, unauthorized_message: NOT_AUTHORIZED }
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::AuthConflict | ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match &self.error {
            ServiceError::Validation(_) => "Tous les champs sont requis.",
            ServiceError::AuthConflict => "Ce code existe déjà avec un autre nom. Vérifiez vos informations.",
            ServiceError::Unauthorized => self.unauthorized_message,
            ServiceError::NotFound(_) => "Élève non trouvé.",
            ServiceError::Storage(_) => "Erreur interne du serveur.",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.error, code = self.error.code(), "request failed");
        } else {
            debug!(error = %self.error, code = self.error.code(), "request rejected");
        }
        (status, Json(serde_json::json!({"error": self.message()}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage init failed: {0}")]
    Storage(#[from] ServiceError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_api_contract() {
        assert_eq!(ApiError::new(ServiceError::Validation("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::new(ServiceError::AuthConflict).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::new(ServiceError::Unauthorized).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::new(ServiceError::not_found("eleve")).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::new(ServiceError::Storage("disk".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_text_depends_on_the_endpoint() {
        assert_eq!(ApiError::new(ServiceError::Unauthorized).message(), WRONG_PASSWORD);
        assert_eq!(ApiError::not_authorized(ServiceError::Unauthorized).message(), NOT_AUTHORIZED);
        let other = ApiError::not_authorized(ServiceError::not_found("eleve"));
        assert_eq!(other.status(), StatusCode::NOT_FOUND);
        assert_eq!(other.message(), "Élève non trouvé.");
    }

    #[test]
    fn storage_details_stay_out_of_the_body() {
        let msg = ApiError::new(ServiceError::Storage("/srv/data/livrets.json: EACCES".into())).message();
        assert!(!msg.contains("livrets.json"));
    }
}
