use petwatch_types::models::{Companion, Mood};

use crate::config::SimConfig;
use crate::leveling::is_healthy;

/// Display mood, derived from current stats.
pub fn mood(companion: &Companion, config: &SimConfig) -> Mood {
    if !companion.is_alive() {
        Mood::Dead
    } else if companion.hunger > config.decay.high_hunger_threshold {
        Mood::Starving
    } else if companion.happiness < config.lifecycle.sad_happiness_threshold {
        Mood::Sad
    } else if is_healthy(companion, &config.leveling) {
        Mood::Ecstatic
    } else {
        Mood::Content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::companion_at;
    use chrono::Utc;
    use petwatch_types::models::{DeathCause, LifeState};

    #[test]
    fn moods_follow_stats() {
        let config = SimConfig::default();
        let mut pet = companion_at(Utc::now());

        pet.hunger = 10;
        pet.happiness = 95;
        assert_eq!(mood(&pet, &config), Mood::Ecstatic);

        pet.hunger = 50;
        assert_eq!(mood(&pet, &config), Mood::Content);

        pet.happiness = 20;
        assert_eq!(mood(&pet, &config), Mood::Sad);

        pet.hunger = 90;
        assert_eq!(mood(&pet, &config), Mood::Starving);

        pet.life = LifeState::Dead {
            cause: DeathCause::Hunger,
            died_at: Utc::now(),
        };
        assert_eq!(mood(&pet, &config), Mood::Dead);
    }
}
