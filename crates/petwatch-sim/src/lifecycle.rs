//! Alive/Dead state machine.
//!
//! `Dead` is terminal until an explicit revive.

use chrono::{DateTime, Duration, Utc};
use petwatch_types::events::CompanionEvent;
use petwatch_types::models::{Companion, DeathCause, LifeState};
use tracing::info;

use crate::config::SimConfig;

/// Decide whether freshly decayed stats kill the companion.
///
/// Precedence is fixed: hunger, then sadness, then neglect.
pub fn death_cause(
    companion: &Companion,
    now: DateTime<Utc>,
    config: &SimConfig,
) -> Option<DeathCause> {
    let lifecycle = &config.lifecycle;
    if companion.hunger >= lifecycle.hunger_death_threshold {
        Some(DeathCause::Hunger)
    } else if companion.happiness <= lifecycle.happiness_death_threshold {
        Some(DeathCause::Sadness)
    } else if now - companion.last_fed >= Duration::days(lifecycle.neglect_days) {
        Some(DeathCause::Neglect)
    } else {
        None
    }
}

/// Transition `Alive -> Dead` if any death condition holds.
pub fn evaluate_death(
    companion: &mut Companion,
    now: DateTime<Utc>,
    config: &SimConfig,
) -> Option<CompanionEvent> {
    if !companion.is_alive() {
        return None;
    }
    let cause = death_cause(companion, now, config)?;

    companion.life = LifeState::Dead { cause, died_at: now };
    info!(
        companion = %companion.id,
        ?cause,
        hunger = companion.hunger,
        happiness = companion.happiness,
        "companion died"
    );
    Some(CompanionEvent::Died { cause, at: now })
}

/// Transition `Dead -> Alive`. No-op on a living companion.
///
/// Reviving costs a level: a companion above level 1 drops one level and its
/// experience lands exactly on `(level - 1) * xp_per_level` of the new level,
/// forfeiting any partial progress.
pub fn revive(
    companion: &mut Companion,
    now: DateTime<Utc>,
    config: &SimConfig,
) -> Option<CompanionEvent> {
    if companion.is_alive() {
        return None;
    }

    companion.hunger = config.lifecycle.revival_hunger;
    companion.happiness = config.lifecycle.revival_happiness;
    companion.last_fed = now;
    companion.last_status_update = now;
    companion.revive_count = companion.revive_count.saturating_add(1);

    if companion.level > 1 {
        companion.level -= 1;
        companion.experience = (companion.level - 1).saturating_mul(config.leveling.xp_per_level);
    }
    companion.life = LifeState::Alive;

    info!(
        companion = %companion.id,
        level = companion.level,
        revive_count = companion.revive_count,
        "companion revived"
    );
    Some(CompanionEvent::Revived {
        level: companion.level,
        revive_count: companion.revive_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::materialize;
    use crate::testing::companion_at;

    fn kill(companion: &mut Companion, now: DateTime<Utc>) {
        companion.life = LifeState::Dead {
            cause: DeathCause::Hunger,
            died_at: now,
        };
    }

    #[test]
    fn healthy_companion_survives() {
        let now = Utc::now();
        let pet = companion_at(now);
        assert_eq!(death_cause(&pet, now, &SimConfig::default()), None);
    }

    #[test]
    fn hunger_wins_over_sadness() {
        let now = Utc::now();
        let mut pet = companion_at(now);
        pet.hunger = 100;
        pet.happiness = 0;
        pet.last_fed = now - Duration::days(30);

        let event = evaluate_death(&mut pet, now, &SimConfig::default());
        assert_eq!(
            event,
            Some(CompanionEvent::Died {
                cause: DeathCause::Hunger,
                at: now
            })
        );
        assert_eq!(pet.death_cause(), Some(DeathCause::Hunger));
    }

    #[test]
    fn sadness_wins_over_neglect() {
        let now = Utc::now();
        let mut pet = companion_at(now);
        pet.hunger = 50;
        pet.happiness = 0;
        pet.last_fed = now - Duration::days(30);

        assert_eq!(death_cause(&pet, now, &SimConfig::default()), Some(DeathCause::Sadness));
    }

    #[test]
    fn neglect_after_threshold_days() {
        let now = Utc::now();
        let config = SimConfig::default();
        let mut pet = companion_at(now);
        pet.hunger = 10;
        pet.happiness = 90;

        pet.last_fed = now - Duration::days(7) + Duration::seconds(1);
        assert_eq!(death_cause(&pet, now, &config), None);

        pet.last_fed = now - Duration::days(7);
        assert_eq!(death_cause(&pet, now, &config), Some(DeathCause::Neglect));
    }

    #[test]
    fn starving_forty_hours_dies_of_hunger() {
        let now = Utc::now();
        let config = SimConfig::default();
        let mut pet = companion_at(now - Duration::hours(40));
        pet.hunger = 90;
        pet.happiness = 90;
        pet.last_fed = now - Duration::hours(40);

        materialize(&mut pet, now, &config.decay);
        assert_eq!(pet.hunger, 100);

        let event = evaluate_death(&mut pet, now, &config);
        assert!(matches!(
            event,
            Some(CompanionEvent::Died {
                cause: DeathCause::Hunger,
                ..
            })
        ));
        assert!(!pet.is_alive());
    }

    #[test]
    fn already_dead_is_not_killed_again() {
        let now = Utc::now();
        let mut pet = companion_at(now);
        kill(&mut pet, now - Duration::hours(1));
        pet.happiness = 0;

        assert_eq!(evaluate_death(&mut pet, now, &SimConfig::default()), None);
        assert_eq!(
            pet.life,
            LifeState::Dead {
                cause: DeathCause::Hunger,
                died_at: now - Duration::hours(1)
            }
        );
    }

    #[test]
    fn revive_drops_a_level_onto_the_boundary() {
        let now = Utc::now();
        let config = SimConfig::default();
        for level in 2..=8u32 {
            let mut pet = companion_at(now);
            pet.level = level;
            pet.experience = 37;
            kill(&mut pet, now);

            revive(&mut pet, now, &config);
            assert_eq!(pet.level, level - 1);
            let expected = if level - 1 > 1 { (level - 2) * 100 } else { 0 };
            assert_eq!(pet.experience, expected);
        }
    }

    #[test]
    fn revive_restores_stats_and_counts() {
        let now = Utc::now();
        let config = SimConfig::default();
        let mut pet = companion_at(now - Duration::days(2));
        pet.hunger = 100;
        pet.happiness = 3;
        pet.experience = 42;
        kill(&mut pet, now - Duration::days(1));

        let event = revive(&mut pet, now, &config);
        assert_eq!(
            event,
            Some(CompanionEvent::Revived {
                level: 1,
                revive_count: 1
            })
        );
        assert!(pet.is_alive());
        assert_eq!(pet.hunger, config.lifecycle.revival_hunger);
        assert_eq!(pet.happiness, config.lifecycle.revival_happiness);
        assert_eq!(pet.last_fed, now);
        assert_eq!(pet.level, 1);
        assert_eq!(pet.experience, 42);
    }

    #[test]
    fn revive_alive_is_noop() {
        let now = Utc::now();
        let mut pet = companion_at(now);
        pet.level = 4;
        let before = pet.clone();

        assert_eq!(revive(&mut pet, now, &SimConfig::default()), None);
        assert_eq!(pet, before);
    }
}
