//! crates/adventurers_log_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the logbook's persistence.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the database that backs it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Character, CharacterInput, DungeonMaster, Log, LogInput, User, UserCredentials};
use crate::rules::LogRuleError;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Rejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
}

impl From<LogRuleError> for PortError {
    fn from(err: LogRuleError) -> Self {
        match err {
            LogRuleError::CharacterNotFound => PortError::NotFound(err.to_string()),
            other => PortError::Rejected(other.to_string()),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(&self, email: &str, hashed_password: &str)
        -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Characters ---
    async fn create_character(&self, user_id: Uuid, input: CharacterInput)
        -> PortResult<Character>;

    async fn update_character(
        &self,
        user_id: Uuid,
        character_id: Uuid,
        input: CharacterInput,
    ) -> PortResult<Character>;

    /// Loads a character with its logs sorted by effective date.
    async fn get_character(&self, user_id: Uuid, character_id: Uuid) -> PortResult<Character>;

    /// Lists a user's characters, each with its logs.
    async fn list_characters(&self, user_id: Uuid) -> PortResult<Vec<Character>>;

    async fn delete_character(&self, user_id: Uuid, character_id: Uuid) -> PortResult<()>;

    // --- Logs ---
    async fn get_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<Log>;

    /// Creates or fully replaces a log, reconciling its items in one transaction.
    async fn save_log(&self, user_id: Uuid, input: LogInput) -> PortResult<Log>;

    /// Deletes a log and the items it gained; items it lost are returned.
    async fn delete_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<()>;

    async fn list_dm_logs(&self, user_id: Uuid) -> PortResult<Vec<Log>>;

    // --- Dungeon Masters ---
    async fn list_dungeon_masters(&self, user_id: Uuid) -> PortResult<Vec<DungeonMaster>>;

    async fn update_dungeon_master(
        &self,
        user_id: Uuid,
        dm: DungeonMaster,
    ) -> PortResult<DungeonMaster>;

    /// Fails with `Rejected` while any log still references the DM.
    async fn delete_dungeon_master(&self, user_id: Uuid, dm_id: Uuid) -> PortResult<()>;
}
