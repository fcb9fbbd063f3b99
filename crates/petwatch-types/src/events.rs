use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AccessoryType, CompanionColor, DeathCause, Pattern};

/// Cosmetic option granted by the unlock evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Unlock {
    Accessory(AccessoryType),
    Color(CompanionColor),
    Pattern(Pattern),
}

/// Things that happened to a companion during one action, returned to the
/// caller so the UI can tell the user about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CompanionEvent {
    /// The companion gained one or more levels
    LevelUp { from: u32, to: u32 },

    /// Pending decay or an action pushed a stat past its limit
    Died {
        cause: DeathCause,
        at: DateTime<Utc>,
    },

    /// The companion was brought back, possibly losing a level
    Revived { level: u32, revive_count: u32 },

    /// A cosmetic was granted
    Unlocked(Unlock),

    /// Companion XP was spent to rescue a watch streak
    ShieldActivated {
        xp_spent: u32,
        streak_date: NaiveDate,
    },
}
