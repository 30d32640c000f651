pub mod domain;
pub mod inventory;
pub mod leveling;
pub mod ports;
pub mod rules;
pub mod summary;

pub use domain::{
    sort_logs, Character, CharacterInput, DungeonMaster, Item, ItemInput, ItemKind, Log, LogInput,
    LogType, User, UserCredentials,
};
pub use inventory::{current_items, droppable_items, InventoryOptions};
pub use leveling::{compute_levels, LevelBase, LevelProgress, Tier, MAX_LEVEL};
pub use ports::{DatabaseService, PortError, PortResult};
pub use rules::{validate_log_save, LogRuleError};
pub use summary::CharacterSummary;
