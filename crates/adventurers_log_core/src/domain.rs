//! crates/adventurers_log_core/src/domain.rs
//!
//! Defines the pure, core data structures for the logbook.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// An adventurer owned by a user. Level, tier, gold and inventory are never
/// stored here; they are derived from `logs` on every read.
#[derive(Debug, Clone)]
pub struct Character {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub campaign: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub character_sheet_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Sorted ascending by effective date.
    pub logs: Vec<Log>,
}

/// A Dungeon Master record as entered by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonMaster {
    pub id: Uuid,
    pub name: String,
    pub dci: Option<i64>,
    /// Set when the DM record represents a registered user.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Game,
    Nongame,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Game => "game",
            LogType::Nongame => "nongame",
        }
    }
}

impl From<&str> for LogType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nongame" => LogType::Nongame,
            _ => LogType::Game,
        }
    }
}

/// The two inventory buckets. Magic items and story awards share a shape but
/// are tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    MagicItem,
    StoryAward,
}

/// A magic item or story award. Created by exactly one log (`log_gained_id`),
/// optionally marked lost by one later log (`log_lost_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub log_gained_id: Uuid,
    pub log_lost_id: Option<Uuid>,
}

/// A single play session (or downtime activity) record.
///
/// Numeric fields are per-log deltas, not running totals.
#[derive(Debug, Clone)]
pub struct Log {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub log_type: LogType,
    pub is_dm_log: bool,
    pub applied_date: Option<DateTime<Utc>>,
    pub experience: i32,
    pub acp: i32,
    pub tcp: i32,
    pub level: i32,
    pub gold: i32,
    pub dtd: i32,
    pub description: String,
    pub character_id: Option<Uuid>,
    pub dm: DungeonMaster,
    pub magic_items_gained: Vec<Item>,
    pub magic_items_lost: Vec<Item>,
    pub story_awards_gained: Vec<Item>,
    pub story_awards_lost: Vec<Item>,
}

impl Log {
    /// The date this log sorts by on a character's timeline. A DM log that has
    /// been applied to a character orders by its applied date.
    pub fn effective_date(&self) -> DateTime<Utc> {
        match (self.is_dm_log, self.applied_date) {
            (true, Some(applied)) => applied,
            _ => self.date,
        }
    }

    pub fn gained(&self, kind: ItemKind) -> &[Item] {
        match kind {
            ItemKind::MagicItem => &self.magic_items_gained,
            ItemKind::StoryAward => &self.story_awards_gained,
        }
    }

    pub fn lost(&self, kind: ItemKind) -> &[Item] {
        match kind {
            ItemKind::MagicItem => &self.magic_items_lost,
            ItemKind::StoryAward => &self.story_awards_lost,
        }
    }
}

/// Sorts logs ascending by effective date. The sort is stable, so logs that
/// share a date keep their input order.
pub fn sort_logs(logs: &mut [Log]) {
    logs.sort_by_key(|log| log.effective_date());
}

/// An item as submitted with a log. `id` is absent for newly created items.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
}

/// The full replacement payload for creating or editing a log.
#[derive(Debug, Clone)]
pub struct LogInput {
    /// `None` creates a new log.
    pub id: Option<Uuid>,
    pub name: String,
    pub date: DateTime<Utc>,
    pub log_type: LogType,
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
    pub dm_name: String,
    pub dm_dci: Option<i64>,
    pub magic_items_gained: Vec<ItemInput>,
    /// Ids of previously gained items this log marks as lost.
    pub magic_items_lost: Vec<Uuid>,
    pub story_awards_gained: Vec<ItemInput>,
    pub story_awards_lost: Vec<Uuid>,
}

/// The editable metadata of a character.
#[derive(Debug, Clone)]
pub struct CharacterInput {
    pub name: String,
    pub campaign: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub character_sheet_url: Option<String>,
    pub image_url: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn dm() -> DungeonMaster {
        DungeonMaster {
            id: Uuid::nil(),
            name: "Table DM".to_string(),
            dci: None,
            user_id: None,
        }
    }

    /// A log dated `day` days into January 2024 with no deltas or items.
    pub fn log(day: u32) -> Log {
        Log {
            id: Uuid::new_v4(),
            name: format!("Session {day}"),
            date: Utc.with_ymd_and_hms(2024, 1, day, 18, 0, 0).unwrap(),
            log_type: LogType::Game,
            is_dm_log: false,
            applied_date: None,
            experience: 0,
            acp: 0,
            tcp: 0,
            level: 0,
            gold: 0,
            dtd: 0,
            description: String::new(),
            character_id: None,
            dm: dm(),
            magic_items_gained: Vec::new(),
            magic_items_lost: Vec::new(),
            story_awards_gained: Vec::new(),
            story_awards_lost: Vec::new(),
        }
    }

    pub fn item(name: &str, gained_by: &Log) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            log_gained_id: gained_by.id,
            log_lost_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dm_log_orders_by_applied_date() {
        let mut dm_log = log(20);
        dm_log.is_dm_log = true;
        dm_log.applied_date = Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        let player_log = log(10);

        let mut logs = vec![player_log.clone(), dm_log.clone()];
        sort_logs(&mut logs);
        assert_eq!(logs[0].id, dm_log.id);
        assert_eq!(logs[1].id, player_log.id);
    }

    #[test]
    fn applied_date_ignored_on_player_logs() {
        let mut player_log = log(20);
        player_log.applied_date = Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(player_log.effective_date(), player_log.date);
    }

    #[test]
    fn sort_keeps_input_order_for_equal_dates() {
        let first = log(5);
        let mut second = log(5);
        second.name = "Same day".to_string();
        let mut logs = vec![first.clone(), second.clone()];
        sort_logs(&mut logs);
        assert_eq!(logs[0].id, first.id);
        assert_eq!(logs[1].id, second.id);
    }

    #[test]
    fn log_type_parses_leniently() {
        assert_eq!(LogType::from("nongame"), LogType::Nongame);
        assert_eq!(LogType::from("GAME"), LogType::Game);
        assert_eq!(LogType::from("unknown"), LogType::Game);
        assert_eq!(LogType::Nongame.as_str(), "nongame");
    }
}
