//! services/api/src/web/router.rs
//!
//! Assembles the HTTP router: public auth routes, session-protected routes,
//! CORS, and the Swagger UI.

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use crate::web::{
    auth::{login_handler, logout_handler, signup_handler},
    characters::{
        create_character_handler, delete_character_handler, droppable_items_handler,
        get_character_handler, list_characters_handler, update_character_handler,
    },
    dms::{delete_dm_handler, list_dms_handler, update_dm_handler},
    logs::{delete_log_handler, get_log_handler, list_dm_logs_handler, save_log_handler},
    middleware::require_auth,
    rest::ApiDoc,
    state::AppState,
};

pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/characters", get(list_characters_handler).post(create_character_handler))
        .route(
            "/characters/{id}",
            get(get_character_handler)
                .put(update_character_handler)
                .delete(delete_character_handler),
        )
        .route("/characters/{id}/logs/{log_id}/droppable", get(droppable_items_handler))
        .route("/logs", post(save_log_handler))
        .route("/logs/{id}", get(get_log_handler).delete(delete_log_handler))
        .route("/dm-logs", get(list_dm_logs_handler))
        .route("/dms", get(list_dms_handler))
        .route("/dms/{id}", put(update_dm_handler).delete(delete_dm_handler))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), require_auth));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
