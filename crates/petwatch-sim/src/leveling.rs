//! Progressive-cost experience ledger.
//!
//! Level `n` costs `n * xp_per_level`. Experience is always banked below the
//! cost of the current level; a single grant may cross several levels.

use chrono::{DateTime, Utc};
use petwatch_types::events::CompanionEvent;
use petwatch_types::models::Companion;
use tracing::{debug, info};

use crate::config::{LevelingConfig, SimConfig};
use crate::genre::GenreMatcher;
use crate::unlocks;

/// XP needed to finish `level`.
pub fn level_cost(level: u32, xp_per_level: u32) -> u32 {
    level.saturating_mul(xp_per_level)
}

/// Add experience and resolve level-ups.
///
/// Any level-up fully restores the companion and runs the unlock evaluator.
pub fn grant_xp(
    companion: &mut Companion,
    amount: u32,
    now: DateTime<Utc>,
    config: &SimConfig,
) -> Vec<CompanionEvent> {
    let xp_per_level = config.leveling.xp_per_level;
    let mut events = Vec::new();
    if xp_per_level == 0 {
        return events;
    }

    let from = companion.level;
    companion.experience = companion.experience.saturating_add(amount);
    while companion.experience >= level_cost(companion.level, xp_per_level) {
        companion.experience -= level_cost(companion.level, xp_per_level);
        companion.level += 1;
    }

    if companion.level > from {
        companion.happiness = 100;
        companion.hunger = 0;
        info!(companion = %companion.id, from, to = companion.level, "level up");
        events.push(CompanionEvent::LevelUp {
            from,
            to: companion.level,
        });
        events.extend(unlocks::evaluate(companion, now, config));
    }
    events
}

/// XP and happiness earned by one watched episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeReward {
    pub xp: u32,
    pub happiness_bonus: u8,
    pub genre_match: bool,
    pub healthy: bool,
}

/// A companion is healthy when well fed and happy.
pub fn is_healthy(companion: &Companion, config: &LevelingConfig) -> bool {
    companion.hunger < config.healthy_hunger_threshold
        && companion.happiness > config.healthy_happiness_threshold
}

/// Work out the reward for an episode tagged with `genres`.
///
/// A favorite-genre match replaces the base amount with a flat bonus; the
/// healthy multiplier is applied afterwards to whatever amount resulted.
pub fn episode_reward(
    companion: &Companion,
    genres: &[String],
    matcher: &dyn GenreMatcher,
    config: &LevelingConfig,
) -> EpisodeReward {
    let mut xp = config.base_xp_per_episode;
    let mut happiness_bonus = 0;

    let genre_match = matcher.matches(&companion.favorite_genre, genres);
    if genre_match {
        xp = config.genre_match_xp;
        happiness_bonus = config.genre_happiness_bonus;
    }

    let healthy = is_healthy(companion, config);
    if healthy {
        xp = (f64::from(xp) * config.healthy_multiplier).floor() as u32;
    }

    debug!(companion = %companion.id, xp, genre_match, healthy, "episode reward");
    EpisodeReward {
        xp,
        happiness_bonus,
        genre_match,
        healthy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genre::AliasTableMatcher;
    use crate::testing::companion_at;
    use chrono::TimeZone;

    fn april() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn level_cost_is_progressive() {
        assert_eq!(level_cost(1, 100), 100);
        assert_eq!(level_cost(5, 100), 500);
    }

    #[test]
    fn exact_grant_crosses_one_level() {
        let config = SimConfig::default();
        let mut pet = companion_at(april());

        let events = grant_xp(&mut pet, 100, april(), &config);
        assert_eq!(pet.level, 2);
        assert_eq!(pet.experience, 0);
        assert_eq!(events, vec![CompanionEvent::LevelUp { from: 1, to: 2 }]);

        grant_xp(&mut pet, 250, april(), &config);
        assert_eq!(pet.level, 3);
        assert_eq!(pet.experience, 50);
    }

    #[test]
    fn large_grant_crosses_several_levels() {
        let config = SimConfig::default();
        let mut pet = companion_at(april());

        // 100 + 200 + 300 = 600 reaches level 4 with 20 left over
        let events = grant_xp(&mut pet, 620, april(), &config);
        assert_eq!(pet.level, 4);
        assert_eq!(pet.experience, 20);
        assert_eq!(events[0], CompanionEvent::LevelUp { from: 1, to: 4 });
    }

    #[test]
    fn partial_grant_banks_experience() {
        let config = SimConfig::default();
        let mut pet = companion_at(april());
        pet.hunger = 40;
        pet.happiness = 40;

        let events = grant_xp(&mut pet, 99, april(), &config);
        assert!(events.is_empty());
        assert_eq!(pet.level, 1);
        assert_eq!(pet.experience, 99);
        assert_eq!(pet.hunger, 40);
        assert_eq!(pet.happiness, 40);
    }

    #[test]
    fn level_up_fully_restores() {
        let config = SimConfig::default();
        let mut pet = companion_at(april());
        pet.hunger = 70;
        pet.happiness = 10;

        grant_xp(&mut pet, 100, april(), &config);
        assert_eq!(pet.hunger, 0);
        assert_eq!(pet.happiness, 100);
    }

    #[test]
    fn base_reward_when_nothing_matches() {
        let config = LevelingConfig::default();
        let mut pet = companion_at(april());
        pet.favorite_genre = "Comedy".into();
        pet.hunger = 50;

        let matcher = AliasTableMatcher::default();
        let reward = episode_reward(&pet, &["Western".into()], &matcher, &config);
        assert_eq!(reward.xp, 10);
        assert_eq!(reward.happiness_bonus, 0);
        assert!(!reward.genre_match);
    }

    #[test]
    fn genre_match_replaces_then_healthy_multiplies() {
        let config = LevelingConfig::default();
        let mut pet = companion_at(april());
        pet.favorite_genre = "Science Fiction".into();
        pet.hunger = 10;
        pet.happiness = 90;

        let reward = episode_reward(
            &pet,
            &["Sci-Fi & Fantasy".into()],
            &AliasTableMatcher::default(),
            &config,
        );
        assert!(reward.genre_match);
        assert!(reward.healthy);
        // flat 25 replaces the base 10, then * 1.5
        assert_eq!(reward.xp, 37);
        assert_eq!(reward.happiness_bonus, 5);
    }

    #[test]
    fn healthy_multiplier_without_genre_match() {
        let config = LevelingConfig::default();
        let mut pet = companion_at(april());
        pet.favorite_genre = "Drama".into();
        pet.hunger = 0;
        pet.happiness = 100;

        let matcher = AliasTableMatcher::default();
        let reward = episode_reward(&pet, &["Animation".into()], &matcher, &config);
        assert_eq!(reward.xp, 15);
    }
}
