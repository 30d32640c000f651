//! crates/adventurers_log_core/src/summary.rs
//!
//! The derived view of a character that every read recomputes from its logs.

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::{Item, ItemKind, Log};
use crate::inventory::{current_items, InventoryOptions};
use crate::leveling::{compute_levels, Tier};

#[derive(Debug, Clone)]
pub struct CharacterSummary {
    pub level: i32,
    pub tier: Tier,
    pub total_gold: i64,
    pub total_tcp: i64,
    pub total_dtd: i64,
    pub log_levels: BTreeMap<Uuid, i32>,
    pub magic_items: Vec<Item>,
    pub story_awards: Vec<Item>,
}

impl CharacterSummary {
    /// `logs` must be sorted by effective date.
    pub fn from_logs(logs: &[Log]) -> Self {
        let progress = compute_levels(logs, None);
        Self {
            level: progress.total_level,
            tier: Tier::from_level(progress.total_level),
            total_gold: logs.iter().map(|log| i64::from(log.gold)).sum(),
            total_tcp: logs.iter().map(|log| i64::from(log.tcp)).sum(),
            total_dtd: logs.iter().map(|log| i64::from(log.dtd)).sum(),
            log_levels: progress.log_levels,
            magic_items: current_items(logs, ItemKind::MagicItem, InventoryOptions::default()),
            story_awards: current_items(logs, ItemKind::StoryAward, InventoryOptions::default()),
        }
    }
}
