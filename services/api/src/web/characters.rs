//! services/api/src/web/characters.rs
//!
//! Character endpoints. Every response derives level, tier, currencies and
//! inventory from the character's logs at request time.

use adventurers_log_core::domain::{CharacterInput, ItemKind};
use adventurers_log_core::inventory::droppable_items;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::web::{
    protocol::{CharacterOverview, CharacterRequest, CharacterResponse, DroppableResponse},
    rest::port_error,
    state::AppState,
};

fn validated(req: CharacterRequest) -> Result<CharacterInput, (StatusCode, String)> {
    let input = CharacterInput::from(req);
    if input.name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Character name is required".to_string()));
    }
    Ok(input)
}

/// List the signed-in user's characters.
#[utoipa::path(
    get,
    path = "/characters",
    responses(
        (status = 200, description = "Characters with derived level and tier", body = [CharacterOverview]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_characters_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let characters = app_state
        .db
        .list_characters(user_id)
        .await
        .map_err(|e| port_error(e, "Failed to list characters"))?;
    let overview: Vec<CharacterOverview> = characters.iter().map(CharacterOverview::from).collect();
    Ok(Json(overview))
}

/// Create a character.
#[utoipa::path(
    post,
    path = "/characters",
    request_body = CharacterRequest,
    responses(
        (status = 201, description = "Character created", body = CharacterResponse),
        (status = 400, description = "Missing name")
    )
)]
pub async fn create_character_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CharacterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let input = validated(req)?;
    let character = app_state
        .db
        .create_character(user_id, input)
        .await
        .map_err(|e| port_error(e, "Failed to create character"))?;
    Ok((StatusCode::CREATED, Json(CharacterResponse::from(&character))))
}

/// Get a character with its summary and logs.
#[utoipa::path(
    get,
    path = "/characters/{id}",
    params(("id" = Uuid, Path, description = "Character id")),
    responses(
        (status = 200, description = "Character found", body = CharacterResponse),
        (status = 403, description = "Character belongs to another user"),
        (status = 404, description = "Character not found")
    )
)]
pub async fn get_character_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let character = app_state
        .db
        .get_character(user_id, id)
        .await
        .map_err(|e| port_error(e, "Failed to load character"))?;
    Ok(Json(CharacterResponse::from(&character)))
}

/// Replace a character's metadata.
#[utoipa::path(
    put,
    path = "/characters/{id}",
    params(("id" = Uuid, Path, description = "Character id")),
    request_body = CharacterRequest,
    responses(
        (status = 200, description = "Character updated", body = CharacterResponse),
        (status = 404, description = "Character not found")
    )
)]
pub async fn update_character_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<CharacterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let input = validated(req)?;
    let character = app_state
        .db
        .update_character(user_id, id, input)
        .await
        .map_err(|e| port_error(e, "Failed to update character"))?;
    Ok(Json(CharacterResponse::from(&character)))
}

/// Delete a character and all of its logs.
#[utoipa::path(
    delete,
    path = "/characters/{id}",
    params(("id" = Uuid, Path, description = "Character id")),
    responses(
        (status = 204, description = "Character deleted"),
        (status = 404, description = "Character not found")
    )
)]
pub async fn delete_character_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .db
        .delete_character(user_id, id)
        .await
        .map_err(|e| port_error(e, "Failed to delete character"))?;
    info!("User {} deleted character {}", user_id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// Items a log may mark as lost.
///
/// Lists what the character held just before the log, minus items another
/// log already claimed, plus the log's own current losses. A log id that is
/// not on the character (e.g. a log not saved yet) considers the whole history.
#[utoipa::path(
    get,
    path = "/characters/{id}/logs/{log_id}/droppable",
    params(
        ("id" = Uuid, Path, description = "Character id"),
        ("log_id" = Uuid, Path, description = "Log being edited")
    ),
    responses(
        (status = 200, description = "Droppable items", body = DroppableResponse),
        (status = 404, description = "Character not found")
    )
)]
pub async fn droppable_items_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((id, log_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let character = app_state
        .db
        .get_character(user_id, id)
        .await
        .map_err(|e| port_error(e, "Failed to load character"))?;

    let magic_items = droppable_items(&character.logs, ItemKind::MagicItem, log_id);
    let story_awards = droppable_items(&character.logs, ItemKind::StoryAward, log_id);
    Ok(Json(DroppableResponse::new(&magic_items, &story_awards)))
}
