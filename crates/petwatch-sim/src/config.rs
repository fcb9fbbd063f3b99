//! Tunable simulation constants, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub decay: DecayConfig,
    #[serde(default)]
    pub care: CareConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub leveling: LevelingConfig,
    #[serde(default)]
    pub unlocks: UnlockConfig,
    #[serde(default)]
    pub shield: ShieldConfig,
    #[serde(default)]
    pub pets: PetLimits,
}

/// Time-driven stat decay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Hunger gained per elapsed hour.
    #[serde(default = "default_hunger_per_hour")]
    pub hunger_per_hour: f64,
    /// Happiness lost per elapsed hour.
    #[serde(default = "default_happiness_per_hour")]
    pub happiness_per_hour: f64,
    /// Reads closer together than this do not decay.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: i64,
    /// Above this hunger the companion is starving.
    #[serde(default = "default_high_hunger")]
    pub high_hunger_threshold: u8,
    /// Extra happiness lost on every materialization while starving.
    #[serde(default = "default_starving_penalty")]
    pub starving_happiness_penalty: u8,
    #[serde(default = "default_initial_hunger")]
    pub initial_hunger: u8,
    #[serde(default = "default_initial_happiness")]
    pub initial_happiness: u8,
}

/// Feed and play transforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareConfig {
    #[serde(default = "default_feed_hunger_relief")]
    pub feed_hunger_relief: u8,
    #[serde(default = "default_feed_happiness")]
    pub feed_happiness: u8,
    #[serde(default = "default_play_happiness")]
    pub play_happiness: u8,
    #[serde(default = "default_play_hunger_cost")]
    pub play_hunger_cost: u8,
}

/// Death thresholds and revival values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default = "default_hunger_death")]
    pub hunger_death_threshold: u8,
    #[serde(default)]
    pub happiness_death_threshold: u8,
    /// Days without food before the companion dies of neglect.
    #[serde(default = "default_neglect_days")]
    pub neglect_days: i64,
    #[serde(default = "default_revival_hunger")]
    pub revival_hunger: u8,
    #[serde(default = "default_revival_happiness")]
    pub revival_happiness: u8,
    /// Below this happiness the companion looks sad.
    #[serde(default = "default_sad_happiness")]
    pub sad_happiness_threshold: u8,
}

/// XP sources and the level cost formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelingConfig {
    /// Level `n` costs `n * xp_per_level`.
    #[serde(default = "default_xp_per_level")]
    pub xp_per_level: u32,
    #[serde(default = "default_base_xp_per_episode")]
    pub base_xp_per_episode: u32,
    /// Replaces the base amount when the episode matches the favorite genre.
    #[serde(default = "default_genre_match_xp")]
    pub genre_match_xp: u32,
    #[serde(default = "default_genre_happiness_bonus")]
    pub genre_happiness_bonus: u8,
    #[serde(default = "default_healthy_hunger")]
    pub healthy_hunger_threshold: u8,
    #[serde(default = "default_healthy_happiness")]
    pub healthy_happiness_threshold: u8,
    #[serde(default = "default_healthy_multiplier")]
    pub healthy_multiplier: f64,
    #[serde(default = "default_series_completion_xp")]
    pub series_completion_xp: u32,
}

/// Cosmetic unlock rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockConfig {
    #[serde(default = "default_crown_level")]
    pub crown_level: u32,
    /// Calendar month (1-12) that grants the santa hat.
    #[serde(default = "default_winter_month")]
    pub winter_month: u32,
    /// Calendar months (1-12) that grant sunglasses.
    #[serde(default = "default_summer_months")]
    pub summer_months: Vec<u32>,
    #[serde(default = "default_silver_series")]
    pub silver_series: u32,
    #[serde(default = "default_gold_series")]
    pub gold_series: u32,
    #[serde(default = "default_rainbow_series")]
    pub rainbow_series: u32,
    #[serde(default = "default_galaxy_episodes")]
    pub galaxy_episodes: u32,
    #[serde(default = "default_points_per_unlock")]
    pub achievement_points_per_unlock: u32,
}

/// Streak shield economy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldConfig {
    #[serde(default = "default_shield_xp_cost")]
    pub xp_cost: u32,
    #[serde(default = "default_shield_happiness_cost")]
    pub happiness_cost: u8,
    #[serde(default = "default_shield_cooldown_days")]
    pub cooldown_days: i64,
    /// Missed days a streak survives before it is lost for good.
    #[serde(default = "default_max_missed_days")]
    pub max_missed_days: i64,
}

/// Per-user companion slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetLimits {
    #[serde(default = "default_max_pets")]
    pub max_pets: usize,
    /// Some existing companion must reach this level before another can be adopted.
    #[serde(default = "default_second_pet_level")]
    pub second_pet_level: u32,
}

// Default value functions

fn default_hunger_per_hour() -> f64 {
    1.5
}

fn default_happiness_per_hour() -> f64 {
    1.0
}

fn default_debounce_secs() -> i64 {
    60
}

fn default_high_hunger() -> u8 {
    80
}

fn default_starving_penalty() -> u8 {
    10
}

fn default_initial_hunger() -> u8 {
    30
}

fn default_initial_happiness() -> u8 {
    70
}

fn default_feed_hunger_relief() -> u8 {
    30
}

fn default_feed_happiness() -> u8 {
    5
}

fn default_play_happiness() -> u8 {
    15
}

fn default_play_hunger_cost() -> u8 {
    5
}

fn default_hunger_death() -> u8 {
    100
}

fn default_neglect_days() -> i64 {
    7
}

fn default_revival_hunger() -> u8 {
    20
}

fn default_revival_happiness() -> u8 {
    80
}

fn default_sad_happiness() -> u8 {
    30
}

fn default_xp_per_level() -> u32 {
    100
}

fn default_base_xp_per_episode() -> u32 {
    10
}

fn default_genre_match_xp() -> u32 {
    25
}

fn default_genre_happiness_bonus() -> u8 {
    5
}

fn default_healthy_hunger() -> u8 {
    30
}

fn default_healthy_happiness() -> u8 {
    70
}

fn default_healthy_multiplier() -> f64 {
    1.5
}

fn default_series_completion_xp() -> u32 {
    50
}

fn default_crown_level() -> u32 {
    10
}

fn default_winter_month() -> u32 {
    12
}

fn default_summer_months() -> Vec<u32> {
    vec![6, 7, 8]
}

fn default_silver_series() -> u32 {
    5
}

fn default_gold_series() -> u32 {
    15
}

fn default_rainbow_series() -> u32 {
    30
}

fn default_galaxy_episodes() -> u32 {
    100
}

fn default_points_per_unlock() -> u32 {
    10
}

fn default_shield_xp_cost() -> u32 {
    150
}

fn default_shield_happiness_cost() -> u8 {
    20
}

fn default_shield_cooldown_days() -> i64 {
    7
}

fn default_max_missed_days() -> i64 {
    2
}

fn default_max_pets() -> usize {
    2
}

fn default_second_pet_level() -> u32 {
    5
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            hunger_per_hour: default_hunger_per_hour(),
            happiness_per_hour: default_happiness_per_hour(),
            debounce_secs: default_debounce_secs(),
            high_hunger_threshold: default_high_hunger(),
            starving_happiness_penalty: default_starving_penalty(),
            initial_hunger: default_initial_hunger(),
            initial_happiness: default_initial_happiness(),
        }
    }
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            feed_hunger_relief: default_feed_hunger_relief(),
            feed_happiness: default_feed_happiness(),
            play_happiness: default_play_happiness(),
            play_hunger_cost: default_play_hunger_cost(),
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            hunger_death_threshold: default_hunger_death(),
            happiness_death_threshold: 0,
            neglect_days: default_neglect_days(),
            revival_hunger: default_revival_hunger(),
            revival_happiness: default_revival_happiness(),
            sad_happiness_threshold: default_sad_happiness(),
        }
    }
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            xp_per_level: default_xp_per_level(),
            base_xp_per_episode: default_base_xp_per_episode(),
            genre_match_xp: default_genre_match_xp(),
            genre_happiness_bonus: default_genre_happiness_bonus(),
            healthy_hunger_threshold: default_healthy_hunger(),
            healthy_happiness_threshold: default_healthy_happiness(),
            healthy_multiplier: default_healthy_multiplier(),
            series_completion_xp: default_series_completion_xp(),
        }
    }
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            crown_level: default_crown_level(),
            winter_month: default_winter_month(),
            summer_months: default_summer_months(),
            silver_series: default_silver_series(),
            gold_series: default_gold_series(),
            rainbow_series: default_rainbow_series(),
            galaxy_episodes: default_galaxy_episodes(),
            achievement_points_per_unlock: default_points_per_unlock(),
        }
    }
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            xp_cost: default_shield_xp_cost(),
            happiness_cost: default_shield_happiness_cost(),
            cooldown_days: default_shield_cooldown_days(),
            max_missed_days: default_max_missed_days(),
        }
    }
}

impl Default for PetLimits {
    fn default() -> Self {
        Self {
            max_pets: default_max_pets(),
            second_pet_level: default_second_pet_level(),
        }
    }
}

impl SimConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML. Missing sections and keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.leveling.xp_per_level == 0 {
            return invalid("leveling.xp_per_level must be positive");
        }
        if !self.leveling.healthy_multiplier.is_finite() || self.leveling.healthy_multiplier < 0.0 {
            return invalid("leveling.healthy_multiplier must be a non-negative number");
        }
        for rate in [self.decay.hunger_per_hour, self.decay.happiness_per_hour] {
            if !rate.is_finite() || rate < 0.0 {
                return invalid("decay rates must be non-negative numbers");
            }
        }
        if self.decay.initial_hunger > 100
            || self.decay.initial_happiness > 100
            || self.lifecycle.revival_hunger > 100
            || self.lifecycle.revival_happiness > 100
        {
            return invalid("stat values must be within 0..=100");
        }
        if self.lifecycle.revival_hunger >= self.lifecycle.hunger_death_threshold
            || self.lifecycle.revival_happiness <= self.lifecycle.happiness_death_threshold
        {
            return invalid("revival stats must not immediately kill the companion again");
        }
        let u = &self.unlocks;
        if !(u.silver_series < u.gold_series && u.gold_series < u.rainbow_series) {
            return invalid("color unlock thresholds must be strictly increasing");
        }
        if !(1..=12).contains(&u.winter_month)
            || u.summer_months.iter().any(|m| !(1..=12).contains(m))
        {
            return invalid("unlock months must be within 1..=12");
        }
        if self.decay.debounce_secs < 0 || self.lifecycle.neglect_days <= 0 {
            return invalid("durations must be positive");
        }
        if self.shield.cooldown_days < 0 || self.shield.max_missed_days < 0 {
            return invalid("shield durations must not be negative");
        }
        if self.pets.max_pets == 0 {
            return invalid("pets.max_pets must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.leveling.xp_per_level, 100);
        assert!((config.decay.hunger_per_hour - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.lifecycle.hunger_death_threshold, 100);
        assert_eq!(config.pets.max_pets, 2);
    }

    #[test]
    fn config_serialization_roundtrip() {
        let config = SimConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed = SimConfig::from_toml_str(&toml_str).expect("parse");
        assert_eq!(parsed.shield.xp_cost, config.shield.xp_cost);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml_str(
            "[leveling]\nxp_per_level = 50\n\n[shield]\ncooldown_days = 3\n",
        )
        .expect("parse");
        assert_eq!(config.leveling.xp_per_level, 50);
        assert_eq!(config.leveling.base_xp_per_episode, 10);
        assert_eq!(config.shield.cooldown_days, 3);
        assert_eq!(config.unlocks.summer_months, vec![6, 7, 8]);
    }

    #[test]
    fn zero_xp_per_level_rejected() {
        let result = SimConfig::from_toml_str("[leveling]\nxp_per_level = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unordered_color_thresholds_rejected() {
        let result = SimConfig::from_toml_str("[unlocks]\nsilver_series = 20\ngold_series = 10\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_rejected() {
        let result = SimConfig::from_toml_str("[leveling\nxp_per_level = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
