//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API server,
//! and their conversions to and from the core domain types.

use adventurers_log_core::domain::{
    Character, CharacterInput, DungeonMaster, Item, ItemInput, Log, LogInput, LogType,
};
use adventurers_log_core::summary::CharacterSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client TO the Server
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CharacterRequest {
    pub name: String,
    pub campaign: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub character_sheet_url: Option<String>,
    pub image_url: Option<String>,
}

impl From<CharacterRequest> for CharacterInput {
    fn from(req: CharacterRequest) -> Self {
        CharacterInput {
            name: req.name.trim().to_string(),
            campaign: req.campaign,
            race: req.race,
            class: req.class,
            character_sheet_url: req.character_sheet_url,
            image_url: req.image_url,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ItemRequest {
    /// Omit for a newly gained item.
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A full log submission. Saving replaces every field and item set of the log.
#[derive(Deserialize, ToSchema)]
pub struct LogRequest {
    /// Omit to create a new log.
    pub id: Option<Uuid>,
    pub name: String,
    pub date: DateTime<Utc>,
    /// `game` or `nongame`.
    #[serde(default = "default_log_type")]
    pub log_type: String,
    #[serde(default)]
    pub is_dm_log: bool,
    pub applied_date: Option<DateTime<Utc>>,
    pub character_id: Option<Uuid>,
    #[serde(default)]
    pub experience: i32,
    #[serde(default)]
    pub acp: i32,
    #[serde(default)]
    pub tcp: i32,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub gold: i32,
    #[serde(default)]
    pub dtd: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dm_name: String,
    pub dm_dci: Option<i64>,
    #[serde(default)]
    pub magic_items_gained: Vec<ItemRequest>,
    #[serde(default)]
    pub magic_items_lost: Vec<Uuid>,
    #[serde(default)]
    pub story_awards_gained: Vec<ItemRequest>,
    #[serde(default)]
    pub story_awards_lost: Vec<Uuid>,
}

fn default_log_type() -> String {
    LogType::Game.as_str().to_string()
}

fn item_inputs(items: Vec<ItemRequest>) -> Vec<ItemInput> {
    items
        .into_iter()
        .map(|item| ItemInput {
            id: item.id,
            name: item.name.trim().to_string(),
            description: item.description,
        })
        .collect()
}

impl From<LogRequest> for LogInput {
    fn from(req: LogRequest) -> Self {
        LogInput {
            id: req.id,
            name: req.name.trim().to_string(),
            date: req.date,
            log_type: LogType::from(req.log_type.as_str()),
            is_dm_log: req.is_dm_log,
            applied_date: req.applied_date,
            character_id: req.character_id,
            experience: req.experience,
            acp: req.acp,
            tcp: req.tcp,
            level: req.level,
            gold: req.gold,
            dtd: req.dtd,
            description: req.description,
            dm_name: req.dm_name,
            dm_dci: req.dm_dci,
            magic_items_gained: item_inputs(req.magic_items_gained),
            magic_items_lost: req.magic_items_lost,
            story_awards_gained: item_inputs(req.story_awards_gained),
            story_awards_lost: req.story_awards_lost,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct DungeonMasterRequest {
    pub name: String,
    pub dci: Option<i64>,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub log_gained_id: Uuid,
    pub log_lost_id: Option<Uuid>,
}

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            log_gained_id: item.log_gained_id,
            log_lost_id: item.log_lost_id,
        }
    }
}

fn item_responses(items: &[Item]) -> Vec<ItemResponse> {
    items.iter().map(ItemResponse::from).collect()
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct DungeonMasterResponse {
    pub id: Uuid,
    pub name: String,
    pub dci: Option<i64>,
    pub user_id: Option<Uuid>,
}

impl From<&DungeonMaster> for DungeonMasterResponse {
    fn from(dm: &DungeonMaster) -> Self {
        Self {
            id: dm.id,
            name: dm.name.clone(),
            dci: dm.dci,
            user_id: dm.user_id,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct LogResponse {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub log_type: String,
    pub is_dm_log: bool,
    pub applied_date: Option<DateTime<Utc>>,
    pub character_id: Option<Uuid>,
    pub experience: i32,
    pub acp: i32,
    pub tcp: i32,
    pub level: i32,
    pub gold: i32,
    pub dtd: i32,
    pub description: String,
    pub dm: DungeonMasterResponse,
    /// Levels this log contributed on its character's timeline.
    pub levels_gained: i32,
    pub magic_items_gained: Vec<ItemResponse>,
    pub magic_items_lost: Vec<ItemResponse>,
    pub story_awards_gained: Vec<ItemResponse>,
    pub story_awards_lost: Vec<ItemResponse>,
}

impl LogResponse {
    pub fn new(log: &Log, levels_gained: i32) -> Self {
        Self {
            id: log.id,
            name: log.name.clone(),
            date: log.date,
            log_type: log.log_type.as_str().to_string(),
            is_dm_log: log.is_dm_log,
            applied_date: log.applied_date,
            character_id: log.character_id,
            experience: log.experience,
            acp: log.acp,
            tcp: log.tcp,
            level: log.level,
            gold: log.gold,
            dtd: log.dtd,
            description: log.description.clone(),
            dm: DungeonMasterResponse::from(&log.dm),
            levels_gained,
            magic_items_gained: item_responses(&log.magic_items_gained),
            magic_items_lost: item_responses(&log.magic_items_lost),
            story_awards_gained: item_responses(&log.story_awards_gained),
            story_awards_lost: item_responses(&log.story_awards_lost),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct SummaryResponse {
    pub level: i32,
    pub tier: u8,
    pub total_gold: i64,
    pub total_tcp: i64,
    pub total_dtd: i64,
    pub magic_items: Vec<ItemResponse>,
    pub story_awards: Vec<ItemResponse>,
}

impl From<&CharacterSummary> for SummaryResponse {
    fn from(summary: &CharacterSummary) -> Self {
        Self {
            level: summary.level,
            tier: summary.tier.as_u8(),
            total_gold: summary.total_gold,
            total_tcp: summary.total_tcp,
            total_dtd: summary.total_dtd,
            magic_items: item_responses(&summary.magic_items),
            story_awards: item_responses(&summary.story_awards),
        }
    }
}

/// A character with its derived summary and full log history.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct CharacterResponse {
    pub id: Uuid,
    pub name: String,
    pub campaign: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub character_sheet_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub summary: SummaryResponse,
    pub logs: Vec<LogResponse>,
}

impl From<&Character> for CharacterResponse {
    fn from(character: &Character) -> Self {
        let summary = CharacterSummary::from_logs(&character.logs);
        let logs = character
            .logs
            .iter()
            .map(|log| {
                let levels = summary.log_levels.get(&log.id).copied().unwrap_or(0);
                LogResponse::new(log, levels)
            })
            .collect();
        Self {
            id: character.id,
            name: character.name.clone(),
            campaign: character.campaign.clone(),
            race: character.race.clone(),
            class: character.class.clone(),
            character_sheet_url: character.character_sheet_url.clone(),
            image_url: character.image_url.clone(),
            created_at: character.created_at,
            summary: SummaryResponse::from(&summary),
            logs,
        }
    }
}

/// One row of the character list.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct CharacterOverview {
    pub id: Uuid,
    pub name: String,
    pub campaign: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub image_url: Option<String>,
    pub level: i32,
    pub tier: u8,
    pub total_gold: i64,
    pub total_dtd: i64,
    pub log_count: usize,
}

impl From<&Character> for CharacterOverview {
    fn from(character: &Character) -> Self {
        let summary = CharacterSummary::from_logs(&character.logs);
        Self {
            id: character.id,
            name: character.name.clone(),
            campaign: character.campaign.clone(),
            race: character.race.clone(),
            class: character.class.clone(),
            image_url: character.image_url.clone(),
            level: summary.level,
            tier: summary.tier.as_u8(),
            total_gold: summary.total_gold,
            total_dtd: summary.total_dtd,
            log_count: character.logs.len(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct DroppableResponse {
    pub magic_items: Vec<ItemResponse>,
    pub story_awards: Vec<ItemResponse>,
}

impl DroppableResponse {
    pub fn new(magic_items: &[Item], story_awards: &[Item]) -> Self {
        Self {
            magic_items: item_responses(magic_items),
            story_awards: item_responses(story_awards),
        }
    }
}
