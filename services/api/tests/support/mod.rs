//! In-memory `DatabaseService` used to exercise the HTTP handlers without PostgreSQL.

use adventurers_log_core::domain::{
    sort_logs, Character, CharacterInput, DungeonMaster, Item, ItemKind, Log, LogInput, User,
    UserCredentials,
};
use adventurers_log_core::ports::{DatabaseService, PortError, PortResult};
use adventurers_log_core::rules::{validate_log_save, LogRuleError};
use api_lib::{config::Config, web::state::AppState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
pub struct FakeDb {
    characters: Mutex<Vec<Character>>,
}

fn unsupported<T>() -> PortResult<T> {
    Err(PortError::Unexpected("not supported by the fake".to_string()))
}

fn items_from(inputs: &[adventurers_log_core::domain::ItemInput], log_id: Uuid) -> Vec<Item> {
    inputs
        .iter()
        .map(|input| Item {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            name: input.name.clone(),
            description: input.description.clone(),
            log_gained_id: log_id,
            log_lost_id: None,
        })
        .collect()
}

/// Marks `lost` as lost by `log_id` across the character and returns the items.
fn mark_lost(logs: &mut [Log], kind: ItemKind, log_id: Uuid, lost: &[Uuid]) -> Vec<Item> {
    let mut marked = Vec::new();
    for log in logs.iter_mut() {
        let gained = match kind {
            ItemKind::MagicItem => &mut log.magic_items_gained,
            ItemKind::StoryAward => &mut log.story_awards_gained,
        };
        for item in gained.iter_mut() {
            if lost.contains(&item.id) {
                item.log_lost_id = Some(log_id);
                marked.push(item.clone());
            }
        }
    }
    marked
}

#[async_trait]
impl DatabaseService for FakeDb {
    async fn create_user_with_email(&self, _email: &str, _hash: &str) -> PortResult<User> {
        unsupported()
    }

    async fn get_user_by_email(&self, _email: &str) -> PortResult<UserCredentials> {
        unsupported()
    }

    async fn create_auth_session(&self, _id: &str, _user: Uuid, _exp: DateTime<Utc>) -> PortResult<()> {
        unsupported()
    }

    async fn validate_auth_session(&self, _id: &str) -> PortResult<Uuid> {
        Err(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, _id: &str) -> PortResult<()> {
        unsupported()
    }

    async fn create_character(&self, user_id: Uuid, input: CharacterInput) -> PortResult<Character> {
        let character = Character {
            id: Uuid::new_v4(),
            user_id,
            name: input.name,
            campaign: input.campaign,
            race: input.race,
            class: input.class,
            character_sheet_url: input.character_sheet_url,
            image_url: input.image_url,
            created_at: Utc::now(),
            logs: Vec::new(),
        };
        self.characters.lock().unwrap().push(character.clone());
        Ok(character)
    }

    async fn update_character(&self, _user: Uuid, _id: Uuid, _input: CharacterInput) -> PortResult<Character> {
        unsupported()
    }

    async fn get_character(&self, user_id: Uuid, character_id: Uuid) -> PortResult<Character> {
        let characters = self.characters.lock().unwrap();
        let character = characters
            .iter()
            .find(|c| c.id == character_id)
            .ok_or_else(|| PortError::from(LogRuleError::CharacterNotFound))?;
        if character.user_id != user_id {
            return Err(PortError::Forbidden);
        }
        Ok(character.clone())
    }

    async fn list_characters(&self, user_id: Uuid) -> PortResult<Vec<Character>> {
        let characters = self.characters.lock().unwrap();
        Ok(characters.iter().filter(|c| c.user_id == user_id).cloned().collect())
    }

    async fn delete_character(&self, _user: Uuid, _id: Uuid) -> PortResult<()> {
        unsupported()
    }

    async fn get_log(&self, _user: Uuid, _id: Uuid) -> PortResult<Log> {
        unsupported()
    }

    async fn save_log(&self, user_id: Uuid, input: LogInput) -> PortResult<Log> {
        let character_id = input
            .character_id
            .ok_or_else(|| PortError::Unexpected("fake only stores character logs".to_string()))?;
        let mut characters = self.characters.lock().unwrap();
        let character = characters
            .iter_mut()
            .find(|c| c.id == character_id && c.user_id == user_id)
            .ok_or_else(|| PortError::from(LogRuleError::CharacterNotFound))?;
        validate_log_save(&character.logs, &input)?;

        let log_id = input.id.unwrap_or_else(Uuid::new_v4);
        character.logs.retain(|log| log.id != log_id);
        let magic_items_lost = mark_lost(&mut character.logs, ItemKind::MagicItem, log_id, &input.magic_items_lost);
        let story_awards_lost =
            mark_lost(&mut character.logs, ItemKind::StoryAward, log_id, &input.story_awards_lost);

        let log = Log {
            id: log_id,
            name: input.name,
            date: input.date,
            log_type: input.log_type,
            is_dm_log: input.is_dm_log,
            applied_date: input.applied_date,
            experience: input.experience,
            acp: input.acp,
            tcp: input.tcp,
            level: input.level,
            gold: input.gold,
            dtd: input.dtd,
            description: input.description,
            character_id: Some(character_id),
            dm: DungeonMaster {
                id: Uuid::new_v4(),
                name: input.dm_name,
                dci: input.dm_dci,
                user_id: None,
            },
            magic_items_gained: items_from(&input.magic_items_gained, log_id),
            magic_items_lost,
            story_awards_gained: items_from(&input.story_awards_gained, log_id),
            story_awards_lost,
        };
        character.logs.push(log.clone());
        sort_logs(&mut character.logs);
        Ok(log)
    }

    async fn delete_log(&self, _user: Uuid, _id: Uuid) -> PortResult<()> {
        unsupported()
    }

    async fn list_dm_logs(&self, _user: Uuid) -> PortResult<Vec<Log>> {
        Ok(Vec::new())
    }

    async fn list_dungeon_masters(&self, _user: Uuid) -> PortResult<Vec<DungeonMaster>> {
        Ok(Vec::new())
    }

    async fn update_dungeon_master(&self, _user: Uuid, _dm: DungeonMaster) -> PortResult<DungeonMaster> {
        unsupported()
    }

    async fn delete_dungeon_master(&self, _user: Uuid, _id: Uuid) -> PortResult<()> {
        unsupported()
    }
}

pub fn app_state() -> Arc<AppState> {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/logbook_test".to_string()),
        _ => None,
    })
    .expect("test config");
    Arc::new(AppState {
        db: Arc::new(FakeDb::default()),
        config: Arc::new(config),
    })
}
