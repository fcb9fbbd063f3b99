//! Idempotent cosmetic grants.
//!
//! Every rule is checked independently; a single pass may grant several
//! unlocks. Grants are set unions and never remove anything.

use chrono::{DateTime, Datelike, Utc};
use petwatch_types::events::{CompanionEvent, Unlock};
use petwatch_types::models::{Accessory, AccessoryType, Companion, CompanionColor, Pattern};
use tracing::info;

use crate::config::SimConfig;

/// Grant everything the companion currently qualifies for and does not own.
pub fn evaluate(
    companion: &mut Companion,
    now: DateTime<Utc>,
    config: &SimConfig,
) -> Vec<CompanionEvent> {
    let rules = &config.unlocks;
    let month = now.month();
    let mut granted = Vec::new();

    if companion.level >= rules.crown_level && grant_accessory(companion, AccessoryType::Crown) {
        granted.push(Unlock::Accessory(AccessoryType::Crown));
    }
    if month == rules.winter_month && grant_accessory(companion, AccessoryType::SantaHat) {
        granted.push(Unlock::Accessory(AccessoryType::SantaHat));
    }
    if rules.summer_months.contains(&month) && grant_accessory(companion, AccessoryType::Sunglasses)
    {
        granted.push(Unlock::Accessory(AccessoryType::Sunglasses));
    }

    let color_rules = [
        (rules.silver_series, CompanionColor::Silver),
        (rules.gold_series, CompanionColor::Gold),
        (rules.rainbow_series, CompanionColor::Rainbow),
    ];
    for (threshold, color) in color_rules {
        if companion.total_series_watched >= threshold && companion.unlocked_colors.insert(color) {
            granted.push(Unlock::Color(color));
        }
    }

    if companion.episodes_watched >= rules.galaxy_episodes
        && companion.unlocked_patterns.insert(Pattern::Galaxy)
    {
        granted.push(Unlock::Pattern(Pattern::Galaxy));
    }

    let points = rules
        .achievement_points_per_unlock
        .saturating_mul(granted.len() as u32);
    companion.achievement_points = companion.achievement_points.saturating_add(points);

    granted
        .into_iter()
        .inspect(|unlock| info!(companion = %companion.id, ?unlock, "unlocked"))
        .map(CompanionEvent::Unlocked)
        .collect()
}

/// Add an unequipped accessory. Returns false if already owned.
fn grant_accessory(companion: &mut Companion, id: AccessoryType) -> bool {
    if companion.owns_accessory(id) {
        return false;
    }
    companion.accessories.push(Accessory {
        id,
        equipped: false,
    });
    true
}
