//! crates/adventurers_log_core/src/leveling.rs
//!
//! Character level calculation. Three progression tracks are replayed over an
//! ordered log sequence and summed:
//!
//! - experience points against the fixed XP table,
//! - advancement checkpoints (ACP), continuing from wherever the XP track left off,
//! - explicit level grants recorded on each log.

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::Log;

pub const MAX_LEVEL: i32 = 20;

/// Cumulative experience needed to reach each level; index 0 is level 1.
pub const XP_THRESHOLDS: [i64; 20] = [
    0, 300, 900, 2700, 6500, 14000, 23000, 34000, 48000, 64000, 85000, 100000, 120000, 140000,
    165000, 195000, 225000, 265000, 305000, 355000,
];

/// ACP cost of leaving `level` for the next one.
fn acp_cost(level: usize) -> i64 {
    if level <= 3 {
        4
    } else {
        8
    }
}

/// Cumulative ACP needed to reach each level; index 0 is level 1.
pub fn acp_thresholds() -> [i64; 20] {
    let mut table = [0i64; 20];
    for level in 1..table.len() {
        table[level] = table[level - 1] + acp_cost(level);
    }
    table
}

/// Level, experience and ACP carried over from outside the log sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelBase {
    pub level: i32,
    pub experience: i32,
    pub acp: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelProgress {
    /// Always within `1..=MAX_LEVEL`.
    pub total_level: i32,
    /// Levels gained per log. Logs that contributed nothing are absent.
    pub log_levels: BTreeMap<Uuid, i32>,
}

impl LevelProgress {
    pub fn levels_for(&self, log_id: Uuid) -> i32 {
        self.log_levels.get(&log_id).copied().unwrap_or(0)
    }
}

/// Computes the character level for `logs`, which must already be sorted by
/// effective date.
pub fn compute_levels(logs: &[Log], base: Option<LevelBase>) -> LevelProgress {
    let base = base.unwrap_or_default();
    let mut log_levels: BTreeMap<Uuid, i64> = BTreeMap::new();

    // Experience track. The base level offset is seeded into the XP total
    // as well as added to the final level.
    let mut xp_total = i64::from(base.level) + i64::from(base.experience);
    let mut xp_level: usize = 1;
    for log in logs {
        xp_total += i64::from(log.experience);
        let mut gained = 0;
        while xp_level < XP_THRESHOLDS.len() && xp_total >= XP_THRESHOLDS[xp_level] {
            xp_level += 1;
            gained += 1;
        }
        if gained > 0 {
            *log_levels.entry(log.id).or_insert(0) += gained;
        }
    }

    // ACP track, seeded with the partial progress toward the next XP level.
    let mut acp_gained: i64 = 0;
    if (xp_level as i32) < MAX_LEVEL {
        let acp_table = acp_thresholds();
        let floor = XP_THRESHOLDS[xp_level - 1];
        let span = XP_THRESHOLDS[xp_level] - floor;
        let carried = (xp_total - floor).clamp(0, span);
        let step = acp_table[xp_level] - acp_table[xp_level - 1];

        let mut acp_total = acp_table[xp_level - 1] + carried * step / span + i64::from(base.acp);
        let mut acp_level = xp_level;
        for log in logs {
            acp_total += i64::from(log.acp);
            let mut gained = 0;
            while acp_level < acp_table.len() && acp_total >= acp_table[acp_level] {
                acp_level += 1;
                gained += 1;
            }
            if gained > 0 {
                *log_levels.entry(log.id).or_insert(0) += gained;
            }
        }
        acp_gained = (acp_level - xp_level) as i64;
    }

    // Manual level grants. Summed wide so arbitrary stored grants cannot overflow.
    let mut manual_levels: i64 = 0;
    for log in logs.iter().filter(|log| log.level != 0) {
        manual_levels += i64::from(log.level);
        *log_levels.entry(log.id).or_insert(0) += i64::from(log.level);
    }

    let total = xp_level as i64 + acp_gained + manual_levels + i64::from(base.level);
    let total_level = narrow(total.clamp(1, i64::from(MAX_LEVEL)));

    LevelProgress {
        total_level,
        log_levels: log_levels
            .into_iter()
            .filter(|(_, levels)| *levels != 0)
            .map(|(id, levels)| (id, narrow(levels)))
            .collect(),
    }
}

fn narrow(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Coarse bracket derived from total level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Tier {
    pub fn from_level(level: i32) -> Self {
        match level {
            l if l >= 17 => Tier::Four,
            l if l >= 11 => Tier::Three,
            l if l >= 5 => Tier::Two,
            _ => Tier::One,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}
