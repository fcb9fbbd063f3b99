//! Feeding, playing and cosmetic changes.
//!
//! Care actions on a dead companion are no-ops, not errors.

use chrono::{DateTime, Utc};
use petwatch_types::models::{AccessoryType, Companion, CompanionColor};

use crate::config::CareConfig;

/// Returns false when nothing changed because the companion is dead.
pub fn feed(companion: &mut Companion, now: DateTime<Utc>, config: &CareConfig) -> bool {
    if !companion.is_alive() {
        return false;
    }
    companion.hunger = companion.hunger.saturating_sub(config.feed_hunger_relief);
    companion.happiness = add_capped(companion.happiness, config.feed_happiness);
    companion.last_fed = now;
    true
}

/// Returns false when nothing changed because the companion is dead.
pub fn play(companion: &mut Companion, config: &CareConfig) -> bool {
    if !companion.is_alive() {
        return false;
    }
    companion.happiness = add_capped(companion.happiness, config.play_happiness);
    companion.hunger = add_capped(companion.hunger, config.play_hunger_cost);
    true
}

/// Why a cosmetic change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CosmeticError {
    #[error("{} is not owned", .0.label())]
    AccessoryNotOwned(AccessoryType),

    #[error("color {0:?} is not unlocked")]
    ColorLocked(CompanionColor),
}

/// Flip an owned accessory. Equipping it takes off whatever else sits in the
/// same slot. Returns the new equipped state.
pub fn toggle_accessory(
    companion: &mut Companion,
    id: AccessoryType,
) -> Result<bool, CosmeticError> {
    let equip = match companion.accessories.iter().find(|a| a.id == id) {
        Some(accessory) => !accessory.equipped,
        None => return Err(CosmeticError::AccessoryNotOwned(id)),
    };

    for accessory in &mut companion.accessories {
        if accessory.id == id {
            accessory.equipped = equip;
        } else if equip && accessory.id.slot() == id.slot() {
            accessory.equipped = false;
        }
    }
    Ok(equip)
}

pub fn change_color(companion: &mut Companion, color: CompanionColor) -> Result<(), CosmeticError> {
    if !companion.can_wear_color(color) {
        return Err(CosmeticError::ColorLocked(color));
    }
    companion.color = color;
    Ok(())
}

pub fn add_capped(stat: u8, amount: u8) -> u8 {
    stat.saturating_add(amount).min(100)
}
