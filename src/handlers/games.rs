use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::unknown_fields;
use crate::error::ApiError;
use crate::middleware::auth::{bearer_token, resolve_identity, AuthUser};
use crate::models::game::{
    validate_rating, CreateGameRequest, GamePatch, GamePlan, GameUpdate, TrendingGame,
    GAME_PATCH_FIELDS, GAME_UPDATE_FIELDS,
};
use crate::state::AppState;

/// GET /api/games - caller's game plans by planned date ascending
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<GamePlan>>, ApiError> {
    let plans = state.games.list_for_user(user.id).await?;
    Ok(Json(plans))
}

/// POST /api/games - create a game plan owned by the caller.
/// Any client-supplied owner is ignored.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<GamePlan>), ApiError> {
    let request: CreateGameRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e), None))?;

    let plan = state.games.insert(request.into_new(user.id)?).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /api/games/recommendations - caller's top five by rating.
/// Sits outside the credential verifier layer; the caller is resolved here
/// from an optional bearer token instead (see DESIGN.md).
pub async fn recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<GamePlan>>, ApiError> {
    let token = bearer_token(&headers).ok_or_else(|| {
        ApiError::unauthenticated("No authentication token, access denied")
    })?;
    let user = resolve_identity(&state, &token).await?;

    let plans = state.games.top_rated_for_user(user.id, 5).await?;
    Ok(Json(plans))
}

/// GET /api/games/trending - global aggregation across all users
pub async fn trending(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrendingGame>>, ApiError> {
    let rows = state.games.trending(10).await?;
    Ok(Json(rows))
}

/// PUT /api/games/:id - full update, owner-scoped.
/// Body keys are checked against the known schema; unknown keys are
/// rejected rather than written through.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<GamePlan>, ApiError> {
    let map = body
        .as_object()
        .ok_or_else(|| ApiError::validation("Request body must be a JSON object", None))?;

    let unknown = unknown_fields(map, GAME_UPDATE_FIELDS);
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

    let update: GameUpdate = serde_json::from_value(body.clone())
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e), None))?;
    if let Some(rating) = update.rating {
        validate_rating(rating)?;
    }

    let mut plan = state
        .games
        .find_owned(id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;

    update.apply(&mut plan);
    let plan = state.games.update(&plan).await?;
    Ok(Json(plan))
}

/// PATCH /api/games/:id - partial update restricted to
/// {status, rating, notes, lastPlayed}.
/// Deliberately registered outside the credential verifier and looked up by
/// id alone; see DESIGN.md for the ownership caveat pending a product call.
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<GamePlan>, ApiError> {
    let map = body
        .as_object()
        .ok_or_else(|| ApiError::invalid_update("Invalid updates"))?;

    if !unknown_fields(map, GAME_PATCH_FIELDS).is_empty() {
        return Err(ApiError::invalid_update("Invalid updates"));
    }

    let patch: GamePatch = serde_json::from_value(body.clone())
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e), None))?;
    if let Some(rating) = patch.rating {
        validate_rating(rating)?;
    }

    let mut plan = state
        .games
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Game not found"))?;

    patch.apply(&mut plan);
    let plan = state.games.update(&plan).await?;
    Ok(Json(plan))
}

/// DELETE /api/games/:id - owner-scoped delete
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.games.delete_owned(id, user.id).await? {
        return Err(ApiError::not_found("Game not found"));
    }
    Ok(Json(json!({ "message": "Game deleted successfully" })))
}
