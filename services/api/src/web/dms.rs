//! services/api/src/web/dms.rs
//!
//! Dungeon Master record endpoints.

use adventurers_log_core::domain::DungeonMaster;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::web::{
    protocol::{DungeonMasterRequest, DungeonMasterResponse},
    rest::port_error,
    state::AppState,
};

/// List the Dungeon Masters the signed-in user has played with.
#[utoipa::path(
    get,
    path = "/dms",
    responses((status = 200, description = "Dungeon Masters", body = [DungeonMasterResponse]))
)]
pub async fn list_dms_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let dms = app_state
        .db
        .list_dungeon_masters(user_id)
        .await
        .map_err(|e| port_error(e, "Failed to list Dungeon Masters"))?;
    let response: Vec<DungeonMasterResponse> = dms.iter().map(DungeonMasterResponse::from).collect();
    Ok(Json(response))
}

/// Rename a Dungeon Master or change their DCI number.
#[utoipa::path(
    put,
    path = "/dms/{id}",
    params(("id" = Uuid, Path, description = "Dungeon Master id")),
    request_body = DungeonMasterRequest,
    responses(
        (status = 200, description = "Dungeon Master updated", body = DungeonMasterResponse),
        (status = 404, description = "Dungeon Master not found")
    )
)]
pub async fn update_dm_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<DungeonMasterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Dungeon Master name is required".to_string()));
    }
    let dm = DungeonMaster {
        id,
        name,
        dci: req.dci,
        user_id: None,
    };
    let updated = app_state
        .db
        .update_dungeon_master(user_id, dm)
        .await
        .map_err(|e| port_error(e, "Failed to update Dungeon Master"))?;
    Ok(Json(DungeonMasterResponse::from(&updated)))
}

/// Delete a Dungeon Master that no log references.
#[utoipa::path(
    delete,
    path = "/dms/{id}",
    params(("id" = Uuid, Path, description = "Dungeon Master id")),
    responses(
        (status = 204, description = "Dungeon Master deleted"),
        (status = 400, description = "Dungeon Master still has logs"),
        (status = 404, description = "Dungeon Master not found")
    )
)]
pub async fn delete_dm_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .db
        .delete_dungeon_master(user_id, id)
        .await
        .map_err(|e| port_error(e, "Failed to delete Dungeon Master"))?;
    Ok(StatusCode::NO_CONTENT)
}
