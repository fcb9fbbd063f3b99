//! Lazy time-driven stat decay.
//!
//! Nothing ticks in the background. Pending decay is applied whenever a
//! companion is read or acted upon, from `last_status_update` up to `now`.

use chrono::{DateTime, Utc};
use petwatch_types::models::Companion;
use tracing::warn;

use crate::config::DecayConfig;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// What [`materialize`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialization {
    /// Less than the debounce window has passed; nothing changed.
    Debounced,
    /// Dead companions never decay.
    Dead,
    /// Decay was applied and `last_status_update` moved to `now`.
    Applied,
}

/// Apply pending decay up to `now`.
///
/// Death is not evaluated here; see [`crate::lifecycle::evaluate_death`].
pub fn materialize(
    companion: &mut Companion,
    now: DateTime<Utc>,
    config: &DecayConfig,
) -> Materialization {
    if !companion.is_alive() {
        return Materialization::Dead;
    }

    let elapsed = now - companion.last_status_update;
    if elapsed.num_seconds() < config.debounce_secs {
        return Materialization::Debounced;
    }

    let hours = elapsed.num_milliseconds() as f64 / MILLIS_PER_HOUR;
    let hunger_gain = (hours * config.hunger_per_hour).floor();
    let happiness_loss = (hours * config.happiness_per_hour).floor();

    let mut hunger = stat_or_default(
        f64::from(companion.hunger) + hunger_gain,
        config.initial_hunger,
        "hunger",
        &companion.id,
    );
    let mut happiness = stat_or_default(
        f64::from(companion.happiness) - happiness_loss,
        config.initial_happiness,
        "happiness",
        &companion.id,
    );

    // Starving stacks an extra flat penalty on top of the regular decay.
    if hunger > config.high_hunger_threshold {
        happiness = happiness.saturating_sub(config.starving_happiness_penalty);
    }
    hunger = hunger.min(100);

    companion.hunger = hunger;
    companion.happiness = happiness;
    companion.last_status_update = now;
    Materialization::Applied
}

fn stat_or_default(value: f64, default: u8, stat: &str, companion_id: &str) -> u8 {
    if value.is_nan() {
        warn!(
            "Decayed {} of companion '{}' is not a number, resetting to {}",
            stat, companion_id, default
        );
        return default;
    }
    value.clamp(0.0, 100.0) as u8
}
