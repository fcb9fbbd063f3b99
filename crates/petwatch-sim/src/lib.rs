//! # petwatch-sim
//!
//! Companion simulation with no storage or runtime dependencies. Every
//! function takes the current time explicitly; nothing ticks in the
//! background.
//!
//! ## Modules
//!
//! - [`decay`]: lazy hunger/happiness decay
//! - [`lifecycle`]: death precedence and revival
//! - [`leveling`]: progressive XP ledger and episode rewards
//! - [`unlocks`]: idempotent cosmetic grants
//! - [`shield`]: streak shield transaction
//! - [`care`]: feed, play, accessories, colors

pub mod care;
pub mod config;
pub mod decay;
pub mod genre;
pub mod leveling;
pub mod lifecycle;
pub mod mood;
pub mod shield;
pub mod unlocks;

use chrono::{DateTime, Utc};
use petwatch_types::events::CompanionEvent;
use petwatch_types::models::Companion;

pub use config::SimConfig;

/// Bring a companion up to date: apply pending decay, then check for death.
///
/// Returns `true` if anything changed and needs persisting.
pub fn refresh(
    companion: &mut Companion,
    now: DateTime<Utc>,
    config: &SimConfig,
    events: &mut Vec<CompanionEvent>,
) -> bool {
    match decay::materialize(companion, now, &config.decay) {
        decay::Materialization::Applied => {
            events.extend(lifecycle::evaluate_death(companion, now, config));
            true
        }
        decay::Materialization::Debounced | decay::Materialization::Dead => false,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn refresh_reports_death() {
        let now = Utc::now();
        let config = SimConfig::default();
        let mut pet = testing::companion_at(now - Duration::hours(40));
        pet.hunger = 90;
        let mut events = Vec::new();

        assert!(refresh(&mut pet, now, &config, &mut events));
        assert!(matches!(events.as_slice(), [CompanionEvent::Died { .. }]));
    }

    #[test]
    fn refresh_debounced_is_clean() {
        let now = Utc::now();
        let config = SimConfig::default();
        let mut pet = testing::companion_at(now);
        let mut events = Vec::new();

        assert!(!refresh(&mut pet, now + Duration::seconds(10), &config, &mut events));
        assert!(events.is_empty());
    }
}
