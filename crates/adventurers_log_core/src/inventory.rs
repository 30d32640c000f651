//! crates/adventurers_log_core/src/inventory.rs
//!
//! Rebuilds a character's magic items or story awards by replaying the
//! gained/lost sets of each log in order.

use tracing::debug;
use uuid::Uuid;

use crate::domain::{Item, ItemKind, Log};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryOptions {
    /// Stop replaying before the log with this id. An id that matches no log
    /// replays the whole sequence.
    pub cutoff_log_id: Option<Uuid>,
    /// Hide items that any log has marked lost, even one after the cutoff.
    pub exclude_dropped: bool,
}

/// Returns the items of `kind` held after replaying `logs`, which must already
/// be sorted by effective date. Items keep the order they were gained in.
///
/// Dangling references never fail: losing an item that is not held is a no-op.
pub fn current_items(logs: &[Log], kind: ItemKind, options: InventoryOptions) -> Vec<Item> {
    let mut held: Vec<Item> = Vec::new();

    for log in logs {
        if options.cutoff_log_id == Some(log.id) {
            break;
        }
        held.extend(log.gained(kind).iter().cloned());
        for lost in log.lost(kind) {
            match held.iter().position(|item| item.id == lost.id) {
                Some(index) => {
                    held.remove(index);
                }
                None => debug!(
                    item_id = %lost.id,
                    log_id = %log.id,
                    "lost item not held at this point of the replay"
                ),
            }
        }
    }

    if options.exclude_dropped {
        held.retain(|item| item.log_lost_id.is_none());
    }
    held
}

/// Items a log may choose to drop: everything held just before it that no
/// other log has claimed, followed by whatever the log itself already dropped.
pub fn droppable_items(logs: &[Log], kind: ItemKind, log_id: Uuid) -> Vec<Item> {
    let mut items = current_items(
        logs,
        kind,
        InventoryOptions {
            cutoff_log_id: Some(log_id),
            exclude_dropped: true,
        },
    );
    if let Some(log) = logs.iter().find(|log| log.id == log_id) {
        let already_dropped: Vec<Item> = log
            .lost(kind)
            .iter()
            .filter(|lost| !items.iter().any(|item| item.id == lost.id))
            .cloned()
            .collect();
        items.extend(already_dropped);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{item, log};

    fn ids(items: &[Item]) -> Vec<Uuid> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn loss_removes_earlier_gain() {
        let mut first = log(1);
        let mut second = log(2);
        let mut sword = item("Sword of Answering", &first);
        let cloak = item("Cloak of Elvenkind", &second);
        sword.log_lost_id = Some(second.id);
        first.magic_items_gained.push(sword.clone());
        second.magic_items_gained.push(cloak.clone());
        second.magic_items_lost.push(sword.clone());
        let logs = vec![first, second.clone()];

        let now = current_items(&logs, ItemKind::MagicItem, InventoryOptions::default());
        assert_eq!(ids(&now), vec![cloak.id]);

        let before_second = current_items(
            &logs,
            ItemKind::MagicItem,
            InventoryOptions {
                cutoff_log_id: Some(second.id),
                exclude_dropped: false,
            },
        );
        assert_eq!(ids(&before_second), vec![sword.id]);
    }

    #[test]
    fn exclude_dropped_hides_items_claimed_later() {
        let mut first = log(1);
        let second = log(2);
        let mut third = log(3);
        let mut potion = item("Potion of Healing", &first);
        potion.log_lost_id = Some(third.id);
        first.magic_items_gained.push(potion.clone());
        third.magic_items_lost.push(potion.clone());
        let logs = vec![first, second.clone(), third];

        let options = InventoryOptions {
            cutoff_log_id: Some(second.id),
            exclude_dropped: true,
        };
        assert!(current_items(&logs, ItemKind::MagicItem, options).is_empty());
    }

    #[test]
    fn unknown_cutoff_replays_everything() {
        let mut first = log(1);
        let ring = item("Ring of Protection", &first);
        first.magic_items_gained.push(ring.clone());
        let options = InventoryOptions {
            cutoff_log_id: Some(Uuid::new_v4()),
            exclude_dropped: false,
        };
        assert_eq!(
            ids(&current_items(&[first], ItemKind::MagicItem, options)),
            vec![ring.id]
        );
    }

    #[test]
    fn losing_an_unheld_item_is_a_no_op() {
        let first = log(1);
        let mut second = log(2);
        let ghost = item("Ghost item", &first);
        let staff = item("Staff of Power", &second);
        second.magic_items_gained.push(staff.clone());
        second.magic_items_lost.push(ghost);

        let items = current_items(&[first, second], ItemKind::MagicItem, InventoryOptions::default());
        assert_eq!(ids(&items), vec![staff.id]);
    }

    #[test]
    fn kinds_are_tracked_separately() {
        let mut first = log(1);
        let award = item("Friend of the Harpers", &first);
        let wand = item("Wand of Magic Missiles", &first);
        first.story_awards_gained.push(award.clone());
        first.magic_items_gained.push(wand.clone());
        let logs = vec![first];

        assert_eq!(
            ids(&current_items(&logs, ItemKind::StoryAward, InventoryOptions::default())),
            vec![award.id]
        );
        assert_eq!(
            ids(&current_items(&logs, ItemKind::MagicItem, InventoryOptions::default())),
            vec![wand.id]
        );
    }

    #[test]
    fn replay_leaves_input_untouched() {
        let mut first = log(1);
        let mut second = log(2);
        let shield = item("Shield +1", &first);
        first.magic_items_gained.push(shield.clone());
        second.magic_items_lost.push(shield);
        let logs = vec![first, second];

        let once = current_items(&logs, ItemKind::MagicItem, InventoryOptions::default());
        let twice = current_items(&logs, ItemKind::MagicItem, InventoryOptions::default());
        assert_eq!(once, twice);
        assert_eq!(logs[0].magic_items_gained.len(), 1);
        assert_eq!(logs[1].magic_items_lost.len(), 1);
    }

    #[test]
    fn droppable_includes_own_losses() {
        let mut first = log(1);
        let mut second = log(2);
        let mut third = log(3);
        let mut boots = item("Boots of Speed", &first);
        let mut bag = item("Bag of Holding", &first);
        let gloves = item("Gloves of Thievery", &first);
        boots.log_lost_id = Some(second.id);
        bag.log_lost_id = Some(third.id);
        first.magic_items_gained.extend([boots.clone(), bag.clone(), gloves.clone()]);
        second.magic_items_lost.push(boots.clone());
        third.magic_items_lost.push(bag.clone());
        let logs = vec![first, second.clone(), third];

        let items = droppable_items(&logs, ItemKind::MagicItem, second.id);
        assert_eq!(ids(&items), vec![gloves.id, boots.id]);
    }
}
