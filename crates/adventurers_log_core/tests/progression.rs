//! End-to-end checks of level and inventory replay through the public API.

use adventurers_log_core::{
    compute_levels, current_items, sort_logs, CharacterSummary, DungeonMaster, InventoryOptions,
    Item, ItemKind, Log, LogType, Tier,
};
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

fn session(index: i64, experience: i32, acp: i32, level: i32) -> Log {
    Log {
        id: Uuid::new_v4(),
        name: format!("Session {index}"),
        date: Utc.with_ymd_and_hms(2023, 6, 1, 18, 0, 0).unwrap() + Duration::days(index),
        log_type: LogType::Game,
        is_dm_log: false,
        applied_date: None,
        experience,
        acp,
        tcp: 0,
        level,
        gold: 0,
        dtd: 0,
        description: String::new(),
        character_id: None,
        dm: DungeonMaster {
            id: Uuid::nil(),
            name: "Table DM".to_string(),
            dci: Some(1234567890),
            user_id: None,
        },
        magic_items_gained: Vec::new(),
        magic_items_lost: Vec::new(),
        story_awards_gained: Vec::new(),
        story_awards_lost: Vec::new(),
    }
}

fn gain(log: &mut Log, name: &str) -> Item {
    let item = Item {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: String::new(),
        log_gained_id: log.id,
        log_lost_id: None,
    };
    log.magic_items_gained.push(item.clone());
    item
}

fn lose(log: &mut Log, item: &mut Item) {
    item.log_lost_id = Some(log.id);
    log.magic_items_lost.push(item.clone());
}

fn mixed_career() -> Vec<Log> {
    let mut logs = Vec::new();
    for index in 0..30 {
        let (xp, acp, level) = match index % 3 {
            0 => (1800, 0, 0),
            1 => (0, 6, 0),
            _ => (0, 0, 1),
        };
        logs.push(session(index, xp, acp, level));
    }
    logs
}

#[test]
fn prefixes_never_outlevel_the_full_history() {
    let logs = mixed_career();
    let full = compute_levels(&logs, None).total_level;
    let mut previous = 1;
    for end in 0..=logs.len() {
        let level = compute_levels(&logs[..end], None).total_level;
        assert!(level <= full, "prefix {end} reached {level} above {full}");
        assert!(level >= previous, "prefix {end} dropped from {previous} to {level}");
        previous = level;
    }
}

#[test]
fn level_always_within_bounds() {
    let cases = vec![
        vec![],
        vec![session(0, -5000, -10, -3)],
        vec![session(0, 1_000_000, 0, 0)],
        vec![session(0, 0, 10_000, 0)],
        vec![session(0, 0, 0, 40)],
        vec![session(0, 0, 0, -2_000_000_000), session(1, 0, 0, -2_000_000_000)],
        vec![session(0, 0, 0, i32::MIN), session(1, 100_000, 40, i32::MIN)],
        vec![session(0, 0, 0, i32::MAX), session(1, 0, 0, 1)],
        vec![session(0, 0, 0, i32::MAX), session(1, 0, 0, i32::MAX)],
        mixed_career(),
    ];
    for logs in cases {
        let level = compute_levels(&logs, None).total_level;
        assert!((1..=20).contains(&level), "level {level} out of range");
    }
}

#[test]
fn extreme_grants_clamp_to_the_right_end() {
    let sunk = vec![session(0, 0, 0, -2_000_000_000), session(1, 0, 0, -2_000_000_000)];
    assert_eq!(compute_levels(&sunk, None).total_level, 1);

    let soared = vec![session(0, 0, 0, i32::MAX), session(1, 0, 0, 1)];
    let progress = compute_levels(&soared, None);
    assert_eq!(progress.total_level, 20);
    assert_eq!(progress.levels_for(soared[0].id), i32::MAX);
}

#[test]
fn experience_scenario() {
    let logs = vec![session(0, 300, 0, 0), session(1, 600, 0, 0)];
    let progress = compute_levels(&logs, None);
    assert_eq!(progress.total_level, 3);
    assert_eq!(progress.levels_for(logs[0].id), 1);
    assert_eq!(progress.levels_for(logs[1].id), 1);
}

#[test]
fn manual_grant_adds_exactly_its_levels() {
    let base_logs = vec![session(0, 2700, 0, 0), session(1, 0, 5, 0)];
    let before = compute_levels(&base_logs, None).total_level;

    let mut with_grant = base_logs.clone();
    with_grant.push(session(2, 0, 0, 2));
    let after = compute_levels(&with_grant, None).total_level;
    assert_eq!(after, before + 2);
}

#[test]
fn inventory_scenario() {
    let mut first = session(0, 0, 0, 0);
    let mut second = session(1, 0, 0, 0);
    let mut sword = gain(&mut first, "Sword");
    let bow = gain(&mut second, "Bow");
    lose(&mut second, &mut sword);
    first.magic_items_gained[0] = sword.clone();
    let logs = vec![first, second.clone()];

    let now = current_items(&logs, ItemKind::MagicItem, InventoryOptions::default());
    assert_eq!(now, vec![bow]);

    let before_second = current_items(
        &logs,
        ItemKind::MagicItem,
        InventoryOptions {
            cutoff_log_id: Some(second.id),
            exclude_dropped: false,
        },
    );
    assert_eq!(before_second.len(), 1);
    assert_eq!(before_second[0].id, sword.id);
}

#[test]
fn cutoff_hides_items_from_later_logs() {
    let mut logs: Vec<Log> = (0..6).map(|index| session(index, 0, 0, 0)).collect();
    for (index, log) in logs.iter_mut().enumerate() {
        gain(log, &format!("Trinket {index}"));
    }
    let cutoff = logs[3].clone();

    let items = current_items(
        &logs,
        ItemKind::MagicItem,
        InventoryOptions {
            cutoff_log_id: Some(cutoff.id),
            exclude_dropped: false,
        },
    );
    assert_eq!(items.len(), 3);
    for item in &items {
        let source = logs
            .iter()
            .find(|log| log.id == item.log_gained_id)
            .expect("item has a source log");
        assert!(source.effective_date() < cutoff.effective_date());
    }
}

#[test]
fn summary_of_unsorted_history_after_sorting() {
    let mut logs = vec![session(3, 0, 0, 1), session(1, 6500, 0, 0), session(2, 0, 0, 0)];
    logs[2].gold = 120;
    logs[2].dtd = 10;
    sort_logs(&mut logs);
    assert_eq!(logs[0].experience, 6500);

    let summary = CharacterSummary::from_logs(&logs);
    assert_eq!(summary.level, 6);
    assert_eq!(summary.tier, Tier::Two);
    assert_eq!(summary.total_gold, 120);
    assert_eq!(summary.total_dtd, 10);
}
