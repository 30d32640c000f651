//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the shared mapping
//! from port errors to HTTP responses.

use adventurers_log_core::ports::PortError;
use axum::http::StatusCode;
use tracing::{error, warn};
use utoipa::OpenApi;

use crate::web::{auth, characters, dms, logs, protocol};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        characters::list_characters_handler,
        characters::create_character_handler,
        characters::get_character_handler,
        characters::update_character_handler,
        characters::delete_character_handler,
        characters::droppable_items_handler,
        logs::save_log_handler,
        logs::get_log_handler,
        logs::delete_log_handler,
        logs::list_dm_logs_handler,
        dms::list_dms_handler,
        dms::update_dm_handler,
        dms::delete_dm_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            protocol::CharacterRequest,
            protocol::ItemRequest,
            protocol::LogRequest,
            protocol::DungeonMasterRequest,
            protocol::ItemResponse,
            protocol::DungeonMasterResponse,
            protocol::LogResponse,
            protocol::SummaryResponse,
            protocol::CharacterResponse,
            protocol::CharacterOverview,
            protocol::DroppableResponse,
        )
    ),
    tags(
        (name = "Adventurers League Log API", description = "Character, log and Dungeon Master endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Converts a port error into the status/message pair handlers return.
///
/// Rule violations are shown to the user verbatim; unexpected failures are
/// logged and replaced by `context`.
pub fn port_error(e: PortError, context: &str) -> (StatusCode, String) {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Rejected(message) => {
            warn!("{}: {}", context, message);
            (StatusCode::BAD_REQUEST, message)
        }
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
        PortError::Unexpected(detail) => {
            error!("{}: {}", context, detail);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}
