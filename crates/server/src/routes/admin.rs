use axum::{extract::{rejection::JsonRejection, Path, State}, Json};
use serde::{Deserialize, Serialize};
use service::livret::domain::{StudentRecord, StudentSummary};

use crate::errors::ApiError;
use crate::state::ServerState;

/// Body of every admin call: the shared secret travels with each request.
#[derive(Deserialize, Debug, Default)]
pub struct PasswordRequest {
    pub password: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize, Debug)]
pub struct ElevesResponse {
    pub success: bool,
    pub eleves: Vec<StudentSummary>,
}

#[derive(Serialize, Debug)]
pub struct EleveResponse {
    pub success: bool,
    pub eleve: StudentRecord,
}

pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<PasswordRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(body) = payload?;
    state.admin.verify(body.password.as_deref())?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn list_eleves(
    State(state): State<ServerState>,
    payload: Result<Json<PasswordRequest>, JsonRejection>,
) -> Result<Json<ElevesResponse>, ApiError> {
    let Json(body) = payload?;
    let eleves = state.admin.list_students(body.password.as_deref()).await.map_err(ApiError::not_authorized)?;
    Ok(Json(ElevesResponse { success: true, eleves }))
}

pub async fn get_eleve(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<PasswordRequest>, JsonRejection>,
) -> Result<Json<EleveResponse>, ApiError> {
    let Json(body) = payload?;
    let eleve = state.admin.get_student(body.password.as_deref(), &id).await.map_err(ApiError::not_authorized)?;
    Ok(Json(EleveResponse { success: true, eleve }))
}
