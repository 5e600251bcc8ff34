use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::unknown_fields;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::models::study::{
    CreateStudyRequest, StudyPlan, StudyUpdate, STUDY_UPDATE_FIELDS,
};
use crate::state::AppState;

/// GET /api/studies - caller's study plans by planned date ascending
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<StudyPlan>>, ApiError> {
    let plans = state.studies.list_for_user(user.id).await?;
    Ok(Json(plans))
}

/// POST /api/studies - create a study plan owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<StudyPlan>), ApiError> {
    let request: CreateStudyRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e), None))?;

    let plan = state.studies.insert(request.into_new(user.id)?).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// PUT /api/studies/:id - full update, owner-scoped, schema allow-listed
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<StudyPlan>, ApiError> {
    let map = body
        .as_object()
        .ok_or_else(|| ApiError::validation("Request body must be a JSON object", None))?;

    let unknown = unknown_fields(map, STUDY_UPDATE_FIELDS);
    if !unknown.is_empty() {
        let field_errors: HashMap<String, String> = unknown
            .into_iter()
            .map(|key| (key, "Unknown field".to_string()))
            .collect();
        return Err(ApiError::validation(
            "Unknown fields in request body",
            Some(field_errors),
        ));
    }

    let update: StudyUpdate = serde_json::from_value(body.clone())
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e), None))?;

    let mut plan = state
        .studies
        .find_owned(id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Study plan not found"))?;

    update.apply(&mut plan);
    let plan = state.studies.update(&plan).await?;
    Ok(Json(plan))
}

/// DELETE /api/studies/:id - owner-scoped delete
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.studies.delete_owned(id, user.id).await? {
        return Err(ApiError::not_found("Study plan not found"));
    }
    Ok(Json(json!({ "message": "Study plan deleted successfully" })))
}
