use axum::{extract::{rejection::JsonRejection, Path, State}, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service::errors::ServiceError;
use service::livret::domain::{Livret, LoginInput};

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub eleve_id: String,
    pub last_saved: Option<DateTime<Utc>>,
    pub has_data: bool,
}

#[derive(Deserialize, Debug)]
pub struct SaveRequest {
    pub livret: Option<Livret>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub last_saved: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub success: bool,
    pub livret: Livret,
    pub last_saved: Option<DateTime<Utc>>,
}

pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(input) = payload?;
    let out = state.students.login(input).await?;
    Ok(Json(LoginResponse { success: true, eleve_id: out.id, last_saved: out.last_saved, has_data: out.has_data }))
}

pub async fn save(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(body) = payload?;
    let livret = body.livret.ok_or_else(|| ServiceError::Validation("livret is required".into()))?;
    let last_saved = state.students.save(&id, livret).await?;
    Ok(Json(SaveResponse { success: true, last_saved }))
}

pub async fn load(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<LoadResponse>, ApiError> {
    let out = state.students.load(&id).await?;
    Ok(Json(LoadResponse { success: true, livret: out.livret, last_saved: out.last_saved }))
}
