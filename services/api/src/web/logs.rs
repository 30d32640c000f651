//! services/api/src/web/logs.rs
//!
//! Log endpoints. Saving a log is a full replace of the log and its item sets.

use adventurers_log_core::domain::LogInput;
use adventurers_log_core::leveling::compute_levels;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::web::{
    protocol::{LogRequest, LogResponse},
    rest::port_error,
    state::AppState,
};

/// Levels `log_id` contributes on its character's timeline, or 0 for logs
/// without a character.
async fn levels_gained(
    app_state: &AppState,
    user_id: Uuid,
    character_id: Option<Uuid>,
    log_id: Uuid,
) -> Result<i32, (StatusCode, String)> {
    let Some(character_id) = character_id else {
        return Ok(0);
    };
    let character = app_state
        .db
        .get_character(user_id, character_id)
        .await
        .map_err(|e| port_error(e, "Failed to load character"))?;
    Ok(compute_levels(&character.logs, None).levels_for(log_id))
}

/// Create or replace a log.
#[utoipa::path(
    post,
    path = "/logs",
    request_body = LogRequest,
    responses(
        (status = 200, description = "Log saved", body = LogResponse),
        (status = 400, description = "Rejected, e.g. the character would pass level 20"),
        (status = 404, description = "Character not found")
    )
)]
pub async fn save_log_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<LogRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let input = LogInput::from(req);
    if input.name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Log name is required".to_string()));
    }
    if input.magic_items_gained.iter().chain(&input.story_awards_gained).any(|i| i.name.is_empty()) {
        return Err((StatusCode::BAD_REQUEST, "Every item needs a name".to_string()));
    }

    let log = app_state
        .db
        .save_log(user_id, input)
        .await
        .map_err(|e| port_error(e, "Failed to save log"))?;
    let levels = levels_gained(&app_state, user_id, log.character_id, log.id).await?;
    Ok(Json(LogResponse::new(&log, levels)))
}

/// Get a single log.
#[utoipa::path(
    get,
    path = "/logs/{id}",
    params(("id" = Uuid, Path, description = "Log id")),
    responses(
        (status = 200, description = "Log found", body = LogResponse),
        (status = 404, description = "Log not found")
    )
)]
pub async fn get_log_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let log = app_state
        .db
        .get_log(user_id, id)
        .await
        .map_err(|e| port_error(e, "Failed to load log"))?;
    let levels = levels_gained(&app_state, user_id, log.character_id, log.id).await?;
    Ok(Json(LogResponse::new(&log, levels)))
}

/// Delete a log. Items it gained are removed; items it lost return to the character.
#[utoipa::path(
    delete,
    path = "/logs/{id}",
    params(("id" = Uuid, Path, description = "Log id")),
    responses(
        (status = 204, description = "Log deleted"),
        (status = 404, description = "Log not found")
    )
)]
pub async fn delete_log_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .db
        .delete_log(user_id, id)
        .await
        .map_err(|e| port_error(e, "Failed to delete log"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the logs the signed-in user recorded as a Dungeon Master.
#[utoipa::path(
    get,
    path = "/dm-logs",
    responses((status = 200, description = "DM logs", body = [LogResponse]))
)]
pub async fn list_dm_logs_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let logs = app_state
        .db
        .list_dm_logs(user_id)
        .await
        .map_err(|e| port_error(e, "Failed to list DM logs"))?;
    let response: Vec<LogResponse> = logs.iter().map(|log| LogResponse::new(log, 0)).collect();
    Ok(Json(response))
}
