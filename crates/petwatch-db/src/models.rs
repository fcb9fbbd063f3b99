//! Stored record shapes.
//!
//! Distinct from the petwatch-types domain models: records are lenient about
//! missing or corrupt fields (old clients, legacy layout) and conversion into
//! the domain model recovers locally instead of failing the read.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use petwatch_types::models::{
    Accessory, Companion, CompanionColor, DeathCause, LifeState, Pattern, Species, WatchStreak,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::Result;

/// Values substituted for missing or corrupt stats.
#[derive(Debug, Clone, Copy)]
pub struct RecordDefaults {
    pub hunger: u8,
    pub happiness: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanionRecord {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub name: Option<String>,
    pub species: Option<Species>,
    pub color_key: Option<CompanionColor>,
    pub level: Option<u32>,
    pub experience: Option<u32>,
    pub hunger: Option<f64>,
    pub happiness: Option<f64>,
    pub last_fed: Option<Value>,
    pub last_status_update: Option<Value>,
    pub episodes_watched: u32,
    pub total_series_watched: u32,
    pub achievement_points: u32,
    pub is_alive: Option<bool>,
    pub death_time: Option<Value>,
    pub death_cause: Option<DeathCause>,
    pub revive_count: u32,
    pub favorite_genre: Option<String>,
    pub accessories: Vec<Accessory>,
    pub unlocked_colors: Vec<CompanionColor>,
    pub unlocked_patterns: Vec<Pattern>,
    pub created_at: Option<Value>,
    pub version: u64,
}

impl CompanionRecord {
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Every field as a multi-field update. Absent optional fields are
    /// written as `null`, which clears them in the store.
    pub fn to_fields(&self) -> Result<Map<String, Value>> {
        Ok(serde_json::to_value(self)?.as_object().cloned().unwrap_or_default())
    }

    /// Convert into the domain model, substituting safe values for anything
    /// missing or unparseable.
    pub fn into_companion(
        self,
        id: &str,
        owner_id: &str,
        now: DateTime<Utc>,
        defaults: RecordDefaults,
    ) -> Companion {
        let species = self.species.unwrap_or_else(|| {
            warn!("Companion '{}' has no species, assuming cat", id);
            Species::Cat
        });

        let hunger = recover_stat(self.hunger, defaults.hunger, "hunger", id);
        let happiness = recover_stat(self.happiness, defaults.happiness, "happiness", id);
        let last_fed = recover_timestamp(self.last_fed.as_ref(), now, "lastFed", id);
        let last_status_update =
            recover_timestamp(self.last_status_update.as_ref(), now, "lastStatusUpdate", id);
        let created_at = recover_timestamp(self.created_at.as_ref(), now, "createdAt", id);

        let life = if self.is_alive.unwrap_or(true) {
            LifeState::Alive
        } else {
            LifeState::Dead {
                cause: self.death_cause.unwrap_or_else(|| {
                    warn!("Dead companion '{}' has no death cause, assuming neglect", id);
                    DeathCause::Neglect
                }),
                died_at: recover_timestamp(self.death_time.as_ref(), now, "deathTime", id),
            }
        };

        let mut accessories: Vec<Accessory> = Vec::with_capacity(self.accessories.len());
        for accessory in self.accessories {
            if !accessories.iter().any(|a| a.id == accessory.id) {
                accessories.push(accessory);
            }
        }

        Companion {
            id: id.to_string(),
            owner_id: self.owner_id.unwrap_or_else(|| owner_id.to_string()),
            name: self.name.unwrap_or_else(|| "Buddy".to_string()),
            species,
            color: self.color_key.unwrap_or_else(|| species.default_color()),
            level: self.level.unwrap_or(1).max(1),
            experience: self.experience.unwrap_or(0),
            hunger,
            happiness,
            last_fed,
            last_status_update,
            episodes_watched: self.episodes_watched,
            total_series_watched: self.total_series_watched,
            achievement_points: self.achievement_points,
            life,
            revive_count: self.revive_count,
            favorite_genre: self.favorite_genre.unwrap_or_else(|| "Drama".to_string()),
            accessories,
            unlocked_colors: self.unlocked_colors.into_iter().collect::<BTreeSet<_>>(),
            unlocked_patterns: self.unlocked_patterns.into_iter().collect::<BTreeSet<_>>(),
            created_at,
            version: self.version,
        }
    }
}

impl From<&Companion> for CompanionRecord {
    fn from(c: &Companion) -> Self {
        let (is_alive, death_time, death_cause) = match c.life {
            LifeState::Alive => (true, None, None),
            LifeState::Dead { cause, died_at } => {
                (false, Some(timestamp_value(died_at)), Some(cause))
            }
        };

        Self {
            id: Some(c.id.clone()),
            owner_id: Some(c.owner_id.clone()),
            name: Some(c.name.clone()),
            species: Some(c.species),
            color_key: Some(c.color),
            level: Some(c.level),
            experience: Some(c.experience),
            hunger: Some(f64::from(c.hunger)),
            happiness: Some(f64::from(c.happiness)),
            last_fed: Some(timestamp_value(c.last_fed)),
            last_status_update: Some(timestamp_value(c.last_status_update)),
            episodes_watched: c.episodes_watched,
            total_series_watched: c.total_series_watched,
            achievement_points: c.achievement_points,
            is_alive: Some(is_alive),
            death_time,
            death_cause,
            revive_count: c.revive_count,
            favorite_genre: Some(c.favorite_genre.clone()),
            accessories: c.accessories.clone(),
            unlocked_colors: c.unlocked_colors.iter().copied().collect(),
            unlocked_patterns: c.unlocked_patterns.iter().copied().collect(),
            created_at: Some(timestamp_value(c.created_at)),
            version: c.version,
        }
    }
}

const SHIELD_FIELDS: [&str; 3] = ["lastWatchDate", "lastShieldUsedDate", "shieldUsedCount"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatchStreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_watch_date: Option<String>,
    pub last_shield_used_date: Option<Value>,
    pub shield_used_count: u32,
}

impl WatchStreakRecord {
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_fields(&self) -> Result<Map<String, Value>> {
        Ok(serde_json::to_value(self)?.as_object().cloned().unwrap_or_default())
    }

    /// Only the fields a shield activation owns. The streak counters belong
    /// to media tracking and are left alone.
    pub fn shield_fields(&self) -> Result<Map<String, Value>> {
        let mut fields = self.to_fields()?;
        fields.retain(|key, _| SHIELD_FIELDS.contains(&key.as_str()));
        Ok(fields)
    }

    pub fn into_streak(self) -> WatchStreak {
        let last_watch_date = self.last_watch_date.and_then(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| warn!("Corrupt lastWatchDate '{}': {}", raw, e))
                .ok()
        });
        let last_shield_used_date = self.last_shield_used_date.and_then(|raw| {
            let parsed = parse_timestamp(&raw);
            if parsed.is_none() {
                warn!("Corrupt lastShieldUsedDate '{}'", raw);
            }
            parsed
        });

        WatchStreak {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_watch_date,
            last_shield_used_date,
            shield_used_count: self.shield_used_count,
        }
    }
}

impl From<&WatchStreak> for WatchStreakRecord {
    fn from(s: &WatchStreak) -> Self {
        Self {
            current_streak: s.current_streak,
            longest_streak: s.longest_streak,
            last_watch_date: s.last_watch_date.map(|d| d.format("%Y-%m-%d").to_string()),
            last_shield_used_date: s.last_shield_used_date.map(timestamp_value),
            shield_used_count: s.shield_used_count,
        }
    }
}

/// Timestamps are written as RFC 3339 strings.
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339())
}

/// Accepts RFC 3339, SQLite-style `YYYY-MM-DD HH:MM:SS`, or epoch milliseconds.
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64)),
        Value::String(s) => s.parse::<DateTime<Utc>>().ok().or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
                .ok()
        }),
        _ => None,
    }
}

fn recover_timestamp(
    raw: Option<&Value>,
    now: DateTime<Utc>,
    field: &str,
    companion_id: &str,
) -> DateTime<Utc> {
    match raw.and_then(parse_timestamp) {
        Some(at) => at,
        None => {
            warn!("Corrupt {} {:?} on companion '{}', using now", field, raw, companion_id);
            now
        }
    }
}

fn recover_stat(raw: Option<f64>, default: u8, field: &str, companion_id: &str) -> u8 {
    match raw {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0) as u8,
        _ => {
            warn!("Corrupt {} {:?} on companion '{}', using {}", field, raw, companion_id, default);
            default
        }
    }
}
