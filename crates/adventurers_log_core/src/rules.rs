//! crates/adventurers_log_core/src/rules.rs
//!
//! Checks a log must pass before it is written. The messages are shown to the
//! user as-is.

use crate::domain::{Log, LogInput};
use crate::leveling::{compute_levels, MAX_LEVEL};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogRuleError {
    #[error("Character is already level 20")]
    AlreadyMaxLevel,
    #[error("Character cannot level past 20")]
    LevelCap,
    #[error("Applied date is required")]
    AppliedDateRequired,
    #[error("Could not save Dungeon Master")]
    DungeonMaster,
    #[error("Character not found")]
    CharacterNotFound,
}

/// Validates `candidate` against the logs its character already has.
///
/// `character_logs` may contain a previous version of the candidate; it is
/// left out so an edit is judged against the other logs only.
pub fn validate_log_save(character_logs: &[Log], candidate: &LogInput) -> Result<(), LogRuleError> {
    if candidate.is_dm_log && candidate.character_id.is_some() && candidate.applied_date.is_none() {
        return Err(LogRuleError::AppliedDateRequired);
    }
    if candidate.character_id.is_none() {
        return Ok(());
    }

    let others: Vec<Log> = character_logs
        .iter()
        .filter(|log| Some(log.id) != candidate.id)
        .cloned()
        .collect();
    let current = compute_levels(&others, None).total_level;

    if candidate.level > 0 {
        if current >= MAX_LEVEL {
            return Err(LogRuleError::AlreadyMaxLevel);
        }
        if i64::from(current) + i64::from(candidate.level) > i64::from(MAX_LEVEL) {
            return Err(LogRuleError::LevelCap);
        }
    }
    Ok(())
}
