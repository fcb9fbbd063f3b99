//! Streak shield: spend companion XP to rescue a lapsing watch streak.
//!
//! All preconditions are checked before anything is mutated. A rejection
//! leaves both the companion and the streak exactly as they were.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use petwatch_types::events::CompanionEvent;
use petwatch_types::models::{Companion, WatchStreak};
use serde::Serialize;
use tracing::info;

use crate::config::SimConfig;
use crate::leveling::level_cost;

/// Where a watch streak stands, classified the same way the streak tracker
/// does it: by whole calendar days since the last watched episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum StreakStatus {
    /// No streak to protect.
    Inactive,
    /// Watched today.
    Active,
    /// Last watched yesterday; watching today keeps it alive.
    AtRisk,
    /// Missed days, but still inside the grace window.
    #[serde(rename_all = "camelCase")]
    Shieldable { missed_days: i64 },
    /// Too many missed days.
    Lost,
}

pub fn streak_status(
    streak: &WatchStreak,
    now: DateTime<Utc>,
    max_missed_days: i64,
) -> StreakStatus {
    let Some(last_watch) = streak.last_watch_date else {
        return StreakStatus::Inactive;
    };
    if streak.current_streak == 0 {
        return StreakStatus::Inactive;
    }

    let days_since = (now.date_naive() - last_watch).num_days();
    match days_since {
        ..=0 => StreakStatus::Active,
        1 => StreakStatus::AtRisk,
        d if d <= max_missed_days + 1 => StreakStatus::Shieldable { missed_days: d - 1 },
        _ => StreakStatus::Lost,
    }
}

/// Why a shield activation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShieldRejection {
    #[error("companion is dead")]
    CompanionDead,

    #[error("not enough experience: have {available}, need {required}")]
    InsufficientXp { available: u64, required: u64 },

    #[error("shield on cooldown until {available_at}")]
    Cooldown { available_at: DateTime<Utc> },

    #[error("streak is not shieldable ({0:?})")]
    NotEligible(StreakStatus),
}

/// Both records after a successful activation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShieldOutcome {
    pub companion: Companion,
    pub streak: WatchStreak,
    pub event: CompanionEvent,
}

/// XP the shield may draw on: everything below the current level counted
/// at `xp_per_level` per level, plus the current bank.
pub fn spendable_xp(companion: &Companion, xp_per_level: u32) -> u64 {
    u64::from(companion.level.saturating_sub(1)) * u64::from(xp_per_level)
        + u64::from(companion.experience)
}

/// Validate and apply a shield activation.
pub fn activate(
    companion: &Companion,
    streak: &WatchStreak,
    now: DateTime<Utc>,
    config: &SimConfig,
) -> Result<ShieldOutcome, ShieldRejection> {
    let shield = &config.shield;
    let xp_per_level = config.leveling.xp_per_level;

    if !companion.is_alive() {
        return Err(ShieldRejection::CompanionDead);
    }

    let available = spendable_xp(companion, xp_per_level);
    if available < u64::from(shield.xp_cost) {
        return Err(ShieldRejection::InsufficientXp {
            available,
            required: u64::from(shield.xp_cost),
        });
    }

    if let Some(last_used) = streak.last_shield_used_date {
        let available_at = last_used + Duration::days(shield.cooldown_days);
        if now < available_at {
            return Err(ShieldRejection::Cooldown { available_at });
        }
    }

    let status = streak_status(streak, now, shield.max_missed_days);
    if !matches!(status, StreakStatus::Shieldable { .. }) {
        return Err(ShieldRejection::NotEligible(status));
    }

    let mut companion = companion.clone();
    deduct_xp(&mut companion, shield.xp_cost, xp_per_level);
    companion.happiness = companion.happiness.saturating_sub(shield.happiness_cost);

    let streak_date = yesterday(now);
    let mut streak = streak.clone();
    streak.last_watch_date = Some(streak_date);
    streak.last_shield_used_date = Some(now);
    streak.shield_used_count = streak.shield_used_count.saturating_add(1);

    info!(
        companion = %companion.id,
        level = companion.level,
        experience = companion.experience,
        "streak shield activated"
    );
    Ok(ShieldOutcome {
        companion,
        streak,
        event: CompanionEvent::ShieldActivated {
            xp_spent: shield.xp_cost,
            streak_date,
        },
    })
}

/// Pay `cost` from the current bank, borrowing from lower levels (each worth
/// its progressive cost) whenever the bank runs dry. Never drops below level 1.
fn deduct_xp(companion: &mut Companion, cost: u32, xp_per_level: u32) {
    let mut bank = i64::from(companion.experience) - i64::from(cost);
    while bank < 0 && companion.level > 1 {
        companion.level -= 1;
        bank += i64::from(level_cost(companion.level, xp_per_level));
    }
    companion.experience = bank.max(0) as u32;
}

fn yesterday(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::days(1)).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::companion_at;
    use chrono::TimeZone;
    use petwatch_types::models::{DeathCause, LifeState};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 20, 18, 0, 0).unwrap()
    }

    fn lapsed_streak(days_ago: i64) -> WatchStreak {
        WatchStreak {
            current_streak: 12,
            longest_streak: 20,
            last_watch_date: Some((now() - Duration::days(days_ago)).date_naive()),
            last_shield_used_date: None,
            shield_used_count: 0,
        }
    }

    fn rich_companion() -> Companion {
        let mut pet = companion_at(now());
        pet.level = 3;
        pet.experience = 180;
        pet.happiness = 90;
        pet
    }

    #[test]
    fn status_windows() {
        let max = SimConfig::default().shield.max_missed_days;
        assert_eq!(streak_status(&lapsed_streak(0), now(), max), StreakStatus::Active);
        assert_eq!(streak_status(&lapsed_streak(1), now(), max), StreakStatus::AtRisk);
        assert_eq!(
            streak_status(&lapsed_streak(2), now(), max),
            StreakStatus::Shieldable { missed_days: 1 }
        );
        assert_eq!(
            streak_status(&lapsed_streak(3), now(), max),
            StreakStatus::Shieldable { missed_days: 2 }
        );
        assert_eq!(streak_status(&lapsed_streak(4), now(), max), StreakStatus::Lost);
        assert_eq!(
            streak_status(&WatchStreak::default(), now(), max),
            StreakStatus::Inactive
        );
    }

    #[test]
    fn pays_from_the_bank_first() {
        let config = SimConfig::default();
        let outcome = activate(&rich_companion(), &lapsed_streak(2), now(), &config)
            .expect("activate");

        assert_eq!(outcome.companion.level, 3);
        assert_eq!(outcome.companion.experience, 30);
        assert_eq!(outcome.companion.happiness, 70);
        assert_eq!(
            outcome.streak.last_watch_date,
            Some(NaiveDate::from_ymd_opt(2026, 3, 19).unwrap())
        );
        assert_eq!(outcome.streak.last_shield_used_date, Some(now()));
        assert_eq!(outcome.streak.shield_used_count, 1);
        assert_eq!(outcome.streak.current_streak, 12);
    }

    #[test]
    fn borrows_from_lower_levels() {
        let config = SimConfig::default();
        let mut pet = rich_companion();
        pet.experience = 20;

        // 20 - 150 = -130, level 3 -> 2 adds 200
        let outcome = activate(&pet, &lapsed_streak(3), now(), &config).expect("activate");
        assert_eq!(outcome.companion.level, 2);
        assert_eq!(outcome.companion.experience, 70);
    }

    #[test]
    fn borrowing_walks_down_several_levels() {
        let mut pet = rich_companion();
        pet.level = 4;
        pet.experience = 10;

        // 10 - 550 = -540, +300 (L3) = -240, +200 (L2) = -40, +100 (L1) = 60
        deduct_xp(&mut pet, 550, 100);
        assert_eq!(pet.level, 1);
        assert_eq!(pet.experience, 60);
    }

    #[test]
    fn borrowing_never_goes_below_level_one() {
        let mut pet = rich_companion();
        pet.level = 2;
        pet.experience = 10;

        deduct_xp(&mut pet, 1_000, 100);
        assert_eq!(pet.level, 1);
        assert_eq!(pet.experience, 0);
    }

    #[test]
    fn insufficient_xp_rejected() {
        let config = SimConfig::default();
        let mut pet = companion_at(now());
        pet.level = 2;
        pet.experience = 49;

        let result = activate(&pet, &lapsed_streak(2), now(), &config);
        assert_eq!(
            result,
            Err(ShieldRejection::InsufficientXp {
                available: 149,
                required: 150
            })
        );
    }

    #[test]
    fn dead_companion_rejected_first() {
        let config = SimConfig::default();
        let mut pet = companion_at(now());
        pet.life = LifeState::Dead {
            cause: DeathCause::Neglect,
            died_at: now(),
        };
        let result = activate(&pet, &WatchStreak::default(), now(), &config);
        assert_eq!(result, Err(ShieldRejection::CompanionDead));
    }

    #[test]
    fn cooldown_rejected() {
        let config = SimConfig::default();
        let mut streak = lapsed_streak(2);
        streak.last_shield_used_date = Some(now() - Duration::days(6));

        let result = activate(&rich_companion(), &streak, now(), &config);
        assert_eq!(
            result,
            Err(ShieldRejection::Cooldown {
                available_at: now() + Duration::days(1)
            })
        );

        streak.last_shield_used_date = Some(now() - Duration::days(7));
        assert!(activate(&rich_companion(), &streak, now(), &config).is_ok());
    }

    #[test]
    fn at_risk_and_lost_streaks_rejected() {
        let config = SimConfig::default();
        assert_eq!(
            activate(&rich_companion(), &lapsed_streak(1), now(), &config),
            Err(ShieldRejection::NotEligible(StreakStatus::AtRisk))
        );
        assert_eq!(
            activate(&rich_companion(), &lapsed_streak(5), now(), &config),
            Err(ShieldRejection::NotEligible(StreakStatus::Lost))
        );
    }

    #[test]
    fn shielded_streak_is_at_risk_afterwards() {
        let config = SimConfig::default();
        let outcome = activate(&rich_companion(), &lapsed_streak(3), now(), &config)
            .expect("activate");
        assert_eq!(
            streak_status(&outcome.streak, now(), config.shield.max_missed_days),
            StreakStatus::AtRisk
        );
    }

    #[test]
    fn happiness_floors_at_zero() {
        let config = SimConfig::default();
        let mut pet = rich_companion();
        pet.happiness = 5;
        let outcome = activate(&pet, &lapsed_streak(2), now(), &config).expect("activate");
        assert_eq!(outcome.companion.happiness, 0);
    }
}
