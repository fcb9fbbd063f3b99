use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Species {
    Cat,
    Dog,
    Bird,
    Dragon,
    Fox,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::Cat,
        Species::Dog,
        Species::Bird,
        Species::Dragon,
        Species::Fox,
    ];

    /// Base color a freshly created companion of this species wears.
    pub fn default_color(self) -> CompanionColor {
        match self {
            Species::Cat => CompanionColor::Orange,
            Species::Dog => CompanionColor::Brown,
            Species::Bird => CompanionColor::Blue,
            Species::Dragon => CompanionColor::Green,
            Species::Fox => CompanionColor::Orange,
        }
    }
}

/// Body colors. The first six are the base palette every companion may use;
/// the metallic and rainbow coats must be unlocked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompanionColor {
    Orange,
    Brown,
    Gray,
    Black,
    Blue,
    Green,
    Silver,
    Gold,
    Rainbow,
}

impl CompanionColor {
    pub fn is_base(self) -> bool {
        !matches!(
            self,
            CompanionColor::Silver | CompanionColor::Gold | CompanionColor::Rainbow
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pattern {
    Galaxy,
}

/// Where an accessory sits on the companion. Two accessories sharing a slot
/// cannot be equipped together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessorySlot {
    Head,
    Face,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessoryType {
    Crown,
    SantaHat,
    Sunglasses,
}

impl AccessoryType {
    pub fn label(self) -> &'static str {
        match self {
            AccessoryType::Crown => "Crown",
            AccessoryType::SantaHat => "Santa Hat",
            AccessoryType::Sunglasses => "Sunglasses",
        }
    }

    pub fn slot(self) -> AccessorySlot {
        match self {
            AccessoryType::Crown | AccessoryType::SantaHat => AccessorySlot::Head,
            AccessoryType::Sunglasses => AccessorySlot::Face,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: AccessoryType,
    pub equipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeathCause {
    Hunger,
    Sadness,
    Neglect,
}

/// Alive or dead. Death time and cause only exist while dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LifeState {
    Alive,
    #[serde(rename_all = "camelCase")]
    Dead {
        cause: DeathCause,
        died_at: DateTime<Utc>,
    },
}

/// A user's virtual companion.
///
/// `experience` is always banked below the cost of the current level
/// (`level * xp_per_level`); every XP grant resolves overflow immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Companion {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub species: Species,
    pub color: CompanionColor,
    pub level: u32,
    pub experience: u32,
    /// 0..=100, 100 means starving.
    pub hunger: u8,
    /// 0..=100.
    pub happiness: u8,
    pub last_fed: DateTime<Utc>,
    pub last_status_update: DateTime<Utc>,
    pub episodes_watched: u32,
    pub total_series_watched: u32,
    pub achievement_points: u32,
    pub life: LifeState,
    pub revive_count: u32,
    pub favorite_genre: String,
    pub accessories: Vec<Accessory>,
    pub unlocked_colors: BTreeSet<CompanionColor>,
    pub unlocked_patterns: BTreeSet<Pattern>,
    pub created_at: DateTime<Utc>,
    /// Bumped by the store on every conditional write.
    pub version: u64,
}

impl Companion {
    pub fn is_alive(&self) -> bool {
        matches!(self.life, LifeState::Alive)
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        match self.life {
            LifeState::Alive => None,
            LifeState::Dead { cause, .. } => Some(cause),
        }
    }

    pub fn owns_accessory(&self, id: AccessoryType) -> bool {
        self.accessories.iter().any(|a| a.id == id)
    }

    pub fn can_wear_color(&self, color: CompanionColor) -> bool {
        color.is_base() || self.unlocked_colors.contains(&color)
    }
}

/// Derived display state. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mood {
    Ecstatic,
    Content,
    Sad,
    Starving,
    Dead,
}

/// A user's watch streak for one calendar year. Owned by the media-tracking
/// side; the streak shield is the only writer on this side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStreak {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_watch_date: Option<NaiveDate>,
    pub last_shield_used_date: Option<DateTime<Utc>>,
    pub shield_used_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_species_starts_in_a_base_color() {
        for species in Species::ALL {
            assert!(species.default_color().is_base(), "{species:?}");
        }
    }

    #[test]
    fn head_accessories_share_a_slot() {
        assert_eq!(AccessoryType::Crown.slot(), AccessoryType::SantaHat.slot());
        assert_ne!(AccessoryType::Crown.slot(), AccessoryType::Sunglasses.slot());
        assert_eq!(AccessoryType::SantaHat.label(), "Santa Hat");
    }
}
