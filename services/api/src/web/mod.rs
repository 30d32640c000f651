pub mod auth;
pub mod characters;
pub mod dms;
pub mod logs;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use router::build_router;

mod router;
