//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the core crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use adventurers_log_core::domain::{
    sort_logs, Character, CharacterInput, DungeonMaster, Item, ItemInput, ItemKind, Log, LogInput,
    LogType, User, UserCredentials,
};
use adventurers_log_core::ports::{DatabaseService, PortError, PortResult};
use adventurers_log_core::rules::{validate_log_save, LogRuleError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn item_table(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::MagicItem => "magic_items",
        ItemKind::StoryAward => "story_awards",
    }
}

const ITEM_KINDS: [ItemKind; 2] = [ItemKind::MagicItem, ItemKind::StoryAward];

/// Items touching any log in `$1`, in the order they were gained.
fn item_select(kind: ItemKind) -> String {
    format!(
        "SELECT id, name, description, log_gained_id, log_lost_id FROM {} \
         WHERE log_gained_id = ANY($1) OR log_lost_id = ANY($1) ORDER BY position ASC",
        item_table(kind)
    )
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct CharacterRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    campaign: Option<String>,
    race: Option<String>,
    class: Option<String>,
    character_sheet_url: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}
impl CharacterRecord {
    fn to_domain(self, logs: Vec<Log>) -> Character {
        Character {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            campaign: self.campaign,
            race: self.race,
            class: self.class,
            character_sheet_url: self.character_sheet_url,
            image_url: self.image_url,
            created_at: self.created_at,
            logs,
        }
    }
}

#[derive(FromRow)]
struct DungeonMasterRecord {
    id: Uuid,
    name: String,
    dci: Option<i64>,
    user_id: Option<Uuid>,
}
impl DungeonMasterRecord {
    fn to_domain(self) -> DungeonMaster {
        DungeonMaster {
            id: self.id,
            name: self.name,
            dci: self.dci,
            user_id: self.user_id,
        }
    }
}

#[derive(FromRow)]
struct LogRecord {
    id: Uuid,
    character_id: Option<Uuid>,
    name: String,
    date: DateTime<Utc>,
    log_type: String,
    is_dm_log: bool,
    applied_date: Option<DateTime<Utc>>,
    experience: i32,
    acp: i32,
    tcp: i32,
    level: i32,
    gold: i32,
    dtd: i32,
    description: String,
    dm_id: Uuid,
    dm_name: String,
    dm_dci: Option<i64>,
    dm_user_id: Option<Uuid>,
}
impl LogRecord {
    fn to_domain(self) -> Log {
        Log {
            id: self.id,
            name: self.name,
            date: self.date,
            log_type: LogType::from(self.log_type.as_str()),
            is_dm_log: self.is_dm_log,
            applied_date: self.applied_date,
            experience: self.experience,
            acp: self.acp,
            tcp: self.tcp,
            level: self.level,
            gold: self.gold,
            dtd: self.dtd,
            description: self.description,
            character_id: self.character_id,
            dm: DungeonMaster {
                id: self.dm_id,
                name: self.dm_name,
                dci: self.dm_dci,
                user_id: self.dm_user_id,
            },
            magic_items_gained: Vec::new(),
            magic_items_lost: Vec::new(),
            story_awards_gained: Vec::new(),
            story_awards_lost: Vec::new(),
        }
    }
}

#[derive(FromRow)]
struct ItemRecord {
    id: Uuid,
    name: String,
    description: String,
    log_gained_id: Uuid,
    log_lost_id: Option<Uuid>,
}
impl ItemRecord {
    fn to_domain(self) -> Item {
        Item {
            id: self.id,
            name: self.name,
            description: self.description,
            log_gained_id: self.log_gained_id,
            log_lost_id: self.log_lost_id,
        }
    }
}

//=========================================================================================
// Query Helpers (shared by pool connections and transactions)
//=========================================================================================

const LOG_SELECT: &str = "SELECT l.id, l.character_id, l.name, l.date, l.log_type, l.is_dm_log, \
     l.applied_date, l.experience, l.acp, l.tcp, l.level, l.gold, l.dtd, l.description, \
     d.id AS dm_id, d.name AS dm_name, d.dci AS dm_dci, d.user_id AS dm_user_id \
     FROM logs l JOIN dungeon_masters d ON d.id = l.dungeon_master_id";

const CHARACTER_SELECT: &str = "SELECT id, user_id, name, campaign, race, class, \
     character_sheet_url, image_url, created_at FROM characters";

/// Loads the logs matching `filter` with their gained and lost items attached,
/// sorted by effective date. `filter` may reference `binds` as `$1..$n`.
async fn load_logs(conn: &mut PgConnection, filter: &str, binds: &[Uuid]) -> PortResult<Vec<Log>> {
    let sql = format!("{LOG_SELECT} WHERE {filter} ORDER BY l.date ASC, l.created_at ASC");
    let mut query = sqlx::query_as::<_, LogRecord>(&sql);
    for bind in binds {
        query = query.bind(*bind);
    }
    let records = query.fetch_all(&mut *conn).await.map_err(unexpected)?;

    let mut logs: Vec<Log> = records.into_iter().map(|r| r.to_domain()).collect();
    if logs.is_empty() {
        return Ok(logs);
    }

    let log_ids: Vec<Uuid> = logs.iter().map(|log| log.id).collect();
    let index: HashMap<Uuid, usize> = log_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    for kind in ITEM_KINDS {
        let sql = item_select(kind);
        let items = sqlx::query_as::<_, ItemRecord>(&sql)
            .bind(log_ids.clone())
            .fetch_all(&mut *conn)
            .await
            .map_err(unexpected)?;

        for item in items.into_iter().map(|r| r.to_domain()) {
            if let Some(lost_on) = item.log_lost_id.and_then(|id| index.get(&id)) {
                let log = &mut logs[*lost_on];
                match kind {
                    ItemKind::MagicItem => log.magic_items_lost.push(item.clone()),
                    ItemKind::StoryAward => log.story_awards_lost.push(item.clone()),
                }
            }
            if let Some(gained_on) = index.get(&item.log_gained_id) {
                let log = &mut logs[*gained_on];
                match kind {
                    ItemKind::MagicItem => log.magic_items_gained.push(item),
                    ItemKind::StoryAward => log.story_awards_gained.push(item),
                }
            }
        }
    }

    sort_logs(&mut logs);
    Ok(logs)
}

/// Confirms the character exists and belongs to `user_id`.
async fn ensure_character_owner(
    conn: &mut PgConnection,
    user_id: Uuid,
    character_id: Uuid,
) -> PortResult<()> {
    let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM characters WHERE id = $1")
        .bind(character_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(unexpected)?;
    match owner {
        None => Err(LogRuleError::CharacterNotFound.into()),
        Some(owner) if owner != user_id => Err(PortError::Forbidden),
        Some(_) => Ok(()),
    }
}

/// Finds or creates the Dungeon Master a log should reference. DM logs point at
/// the user's own DM record; player logs match on name and DCI number.
async fn resolve_dungeon_master(
    conn: &mut PgConnection,
    user_id: Uuid,
    input: &LogInput,
) -> PortResult<Uuid> {
    let name = input.dm_name.trim();

    let existing: Option<Uuid> = if input.is_dm_log {
        sqlx::query_scalar(
            "SELECT id FROM dungeon_masters WHERE owner_id = $1 AND user_id = $1 LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(unexpected)?
    } else {
        sqlx::query_scalar(
            "SELECT id FROM dungeon_masters \
             WHERE owner_id = $1 AND name = $2 AND dci IS NOT DISTINCT FROM $3 LIMIT 1",
        )
        .bind(user_id)
        .bind(name)
        .bind(input.dm_dci)
        .fetch_optional(&mut *conn)
        .await
        .map_err(unexpected)?
    };
    if let Some(id) = existing {
        return Ok(id);
    }

    if name.is_empty() {
        return Err(LogRuleError::DungeonMaster.into());
    }
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO dungeon_masters (id, owner_id, name, dci, user_id) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(user_id)
    .bind(name)
    .bind(input.dm_dci)
    .bind(input.is_dm_log.then_some(user_id))
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        warn!("Failed to insert dungeon master: {:?}", e);
        PortError::from(LogRuleError::DungeonMaster)
    })?;
    Ok(id)
}

/// Makes the stored gained items of `log_id` match `items`: unlisted items are
/// deleted, listed ones updated, new ones inserted.
async fn reconcile_gained(
    conn: &mut PgConnection,
    kind: ItemKind,
    log_id: Uuid,
    items: &[ItemInput],
) -> PortResult<()> {
    let table = item_table(kind);
    let keep: Vec<Uuid> = items.iter().filter_map(|item| item.id).collect();

    let sql = format!("DELETE FROM {table} WHERE log_gained_id = $1 AND NOT (id = ANY($2))");
    sqlx::query(&sql)
        .bind(log_id)
        .bind(keep)
        .execute(&mut *conn)
        .await
        .map_err(unexpected)?;

    let update_sql =
        format!("UPDATE {table} SET name = $1, description = $2 WHERE id = $3 AND log_gained_id = $4");
    let insert_sql = format!(
        "INSERT INTO {table} (id, name, description, log_gained_id) VALUES ($1, $2, $3, $4)"
    );
    for item in items {
        match item.id {
            Some(id) => {
                sqlx::query(&update_sql)
                    .bind(&item.name)
                    .bind(&item.description)
                    .bind(id)
                    .bind(log_id)
                    .execute(&mut *conn)
                    .await
                    .map_err(unexpected)?;
            }
            None => {
                sqlx::query(&insert_sql)
                    .bind(Uuid::new_v4())
                    .bind(&item.name)
                    .bind(&item.description)
                    .bind(log_id)
                    .execute(&mut *conn)
                    .await
                    .map_err(unexpected)?;
            }
        }
    }
    Ok(())
}

/// Moves the lost relation: items this log no longer lists are returned to the
/// character, listed items (gained by the same character) are marked lost here.
async fn reconcile_lost(
    conn: &mut PgConnection,
    kind: ItemKind,
    log_id: Uuid,
    character_id: Option<Uuid>,
    lost: &[Uuid],
) -> PortResult<()> {
    let table = item_table(kind);

    let sql = format!("UPDATE {table} SET log_lost_id = NULL WHERE log_lost_id = $1 AND NOT (id = ANY($2))");
    sqlx::query(&sql)
        .bind(log_id)
        .bind(lost.to_vec())
        .execute(&mut *conn)
        .await
        .map_err(unexpected)?;

    let Some(character_id) = character_id else {
        return Ok(());
    };
    if lost.is_empty() {
        return Ok(());
    }
    let sql = format!(
        "UPDATE {table} SET log_lost_id = $1 WHERE id = ANY($2) \
         AND log_gained_id IN (SELECT id FROM logs WHERE character_id = $3)"
    );
    sqlx::query(&sql)
        .bind(log_id)
        .bind(lost.to_vec())
        .bind(character_id)
        .execute(&mut *conn)
        .await
        .map_err(unexpected)?;
    Ok(())
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Rejected("Email is already registered".to_string())
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users \
             WHERE email = $1 AND hashed_password IS NOT NULL",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_character(&self, user_id: Uuid, input: CharacterInput) -> PortResult<Character> {
        let record = sqlx::query_as::<_, CharacterRecord>(
            "INSERT INTO characters (id, user_id, name, campaign, race, class, character_sheet_url, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, user_id, name, campaign, race, class, character_sheet_url, image_url, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.campaign)
        .bind(&input.race)
        .bind(&input.class)
        .bind(&input.character_sheet_url)
        .bind(&input.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        info!("Created character {} for user {}", record.id, user_id);
        Ok(record.to_domain(Vec::new()))
    }

    async fn update_character(
        &self,
        user_id: Uuid,
        character_id: Uuid,
        input: CharacterInput,
    ) -> PortResult<Character> {
        let result = sqlx::query(
            "UPDATE characters SET name = $1, campaign = $2, race = $3, class = $4, \
             character_sheet_url = $5, image_url = $6 WHERE id = $7 AND user_id = $8",
        )
        .bind(&input.name)
        .bind(&input.campaign)
        .bind(&input.race)
        .bind(&input.class)
        .bind(&input.character_sheet_url)
        .bind(&input.image_url)
        .bind(character_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(LogRuleError::CharacterNotFound.into());
        }
        self.get_character(user_id, character_id).await
    }

    async fn get_character(&self, user_id: Uuid, character_id: Uuid) -> PortResult<Character> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        let sql = format!("{CHARACTER_SELECT} WHERE id = $1");
        let record = sqlx::query_as::<_, CharacterRecord>(&sql)
            .bind(character_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::from(LogRuleError::CharacterNotFound))?;
        if record.user_id != user_id {
            return Err(PortError::Forbidden);
        }
        let logs = load_logs(&mut conn, "l.character_id = $1", &[character_id]).await?;
        Ok(record.to_domain(logs))
    }

    async fn list_characters(&self, user_id: Uuid) -> PortResult<Vec<Character>> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        let sql = format!("{CHARACTER_SELECT} WHERE user_id = $1 ORDER BY created_at ASC");
        let records = sqlx::query_as::<_, CharacterRecord>(&sql)
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(unexpected)?;

        let logs = load_logs(
            &mut conn,
            "l.owner_id = $1 AND l.character_id IS NOT NULL",
            &[user_id],
        )
        .await?;
        let mut by_character: HashMap<Uuid, Vec<Log>> = HashMap::new();
        for log in logs {
            if let Some(character_id) = log.character_id {
                by_character.entry(character_id).or_default().push(log);
            }
        }

        let characters = records
            .into_iter()
            .map(|r| {
                let logs = by_character.remove(&r.id).unwrap_or_default();
                r.to_domain(logs)
            })
            .collect();
        Ok(characters)
    }

    async fn delete_character(&self, user_id: Uuid, character_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1 AND user_id = $2")
            .bind(character_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(LogRuleError::CharacterNotFound.into());
        }
        info!("Deleted character {}", character_id);
        Ok(())
    }

    async fn get_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<Log> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        load_logs(&mut conn, "l.id = $1 AND l.owner_id = $2", &[log_id, user_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PortError::NotFound(format!("Log {} not found", log_id)))
    }

    async fn save_log(&self, user_id: Uuid, input: LogInput) -> PortResult<Log> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let character_logs = match input.character_id {
            Some(character_id) => {
                ensure_character_owner(&mut tx, user_id, character_id).await?;
                load_logs(&mut tx, "l.character_id = $1", &[character_id]).await?
            }
            None => Vec::new(),
        };
        if let Err(rule) = validate_log_save(&character_logs, &input) {
            warn!("Rejected log save for user {}: {}", user_id, rule);
            return Err(rule.into());
        }

        let dm_id = resolve_dungeon_master(&mut tx, user_id, &input).await?;
        let log_id = input.id.unwrap_or_else(Uuid::new_v4);
        let applied_date = if input.is_dm_log { input.applied_date } else { None };

        let result = sqlx::query(
            "INSERT INTO logs (id, owner_id, character_id, dungeon_master_id, name, date, log_type, \
             is_dm_log, applied_date, experience, acp, tcp, level, gold, dtd, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             ON CONFLICT (id) DO UPDATE SET character_id = EXCLUDED.character_id, \
             dungeon_master_id = EXCLUDED.dungeon_master_id, name = EXCLUDED.name, \
             date = EXCLUDED.date, log_type = EXCLUDED.log_type, is_dm_log = EXCLUDED.is_dm_log, \
             applied_date = EXCLUDED.applied_date, experience = EXCLUDED.experience, \
             acp = EXCLUDED.acp, tcp = EXCLUDED.tcp, level = EXCLUDED.level, gold = EXCLUDED.gold, \
             dtd = EXCLUDED.dtd, description = EXCLUDED.description \
             WHERE logs.owner_id = EXCLUDED.owner_id",
        )
        .bind(log_id)
        .bind(user_id)
        .bind(input.character_id)
        .bind(dm_id)
        .bind(&input.name)
        .bind(input.date)
        .bind(input.log_type.as_str())
        .bind(input.is_dm_log)
        .bind(applied_date)
        .bind(input.experience)
        .bind(input.acp)
        .bind(input.tcp)
        .bind(input.level)
        .bind(input.gold)
        .bind(input.dtd)
        .bind(&input.description)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::Forbidden);
        }

        reconcile_gained(&mut tx, ItemKind::MagicItem, log_id, &input.magic_items_gained).await?;
        reconcile_gained(&mut tx, ItemKind::StoryAward, log_id, &input.story_awards_gained).await?;
        reconcile_lost(&mut tx, ItemKind::MagicItem, log_id, input.character_id, &input.magic_items_lost)
            .await?;
        reconcile_lost(&mut tx, ItemKind::StoryAward, log_id, input.character_id, &input.story_awards_lost)
            .await?;

        let saved = load_logs(&mut tx, "l.id = $1", &[log_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PortError::Unexpected(format!("Log {} vanished after save", log_id)))?;
        tx.commit().await.map_err(unexpected)?;

        info!("Saved log {} for user {}", log_id, user_id);
        Ok(saved)
    }

    async fn delete_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let owner: Option<Uuid> = sqlx::query_scalar("SELECT owner_id FROM logs WHERE id = $1")
            .bind(log_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(unexpected)?;
        match owner {
            None => return Err(PortError::NotFound(format!("Log {} not found", log_id))),
            Some(owner) if owner != user_id => return Err(PortError::Forbidden),
            Some(_) => {}
        }

        for kind in ITEM_KINDS {
            let table = item_table(kind);
            let release = format!("UPDATE {table} SET log_lost_id = NULL WHERE log_lost_id = $1");
            sqlx::query(&release)
                .bind(log_id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
            let remove = format!("DELETE FROM {table} WHERE log_gained_id = $1");
            sqlx::query(&remove)
                .bind(log_id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
        }
        sqlx::query("DELETE FROM logs WHERE id = $1")
            .bind(log_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        info!("Deleted log {}", log_id);
        Ok(())
    }

    async fn list_dm_logs(&self, user_id: Uuid) -> PortResult<Vec<Log>> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        load_logs(&mut conn, "l.is_dm_log AND l.owner_id = $1", &[user_id]).await
    }

    async fn list_dungeon_masters(&self, user_id: Uuid) -> PortResult<Vec<DungeonMaster>> {
        let records = sqlx::query_as::<_, DungeonMasterRecord>(
            "SELECT id, name, dci, user_id FROM dungeon_masters WHERE owner_id = $1 ORDER BY name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_dungeon_master(&self, user_id: Uuid, dm: DungeonMaster) -> PortResult<DungeonMaster> {
        let record = sqlx::query_as::<_, DungeonMasterRecord>(
            "UPDATE dungeon_masters SET name = $1, dci = $2 WHERE id = $3 AND owner_id = $4 \
             RETURNING id, name, dci, user_id",
        )
        .bind(&dm.name)
        .bind(dm.dci)
        .bind(dm.id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Dungeon Master {} not found", dm.id)))?;
        Ok(record.to_domain())
    }

    async fn delete_dungeon_master(&self, user_id: Uuid, dm_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let in_use: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE dungeon_master_id = $1")
            .bind(dm_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;
        if in_use > 0 {
            return Err(PortError::Rejected(
                "Dungeon Master still has logs and cannot be deleted".to_string(),
            ));
        }
        let result = sqlx::query("DELETE FROM dungeon_masters WHERE id = $1 AND owner_id = $2")
            .bind(dm_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Dungeon Master {} not found", dm_id)));
        }
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_load_in_insertion_order() {
        for kind in ITEM_KINDS {
            let sql = item_select(kind);
            assert!(sql.contains(item_table(kind)));
            assert!(sql.ends_with("ORDER BY position ASC"), "{sql}");
        }
    }
}
