//! Companion repository and multi-pet manager.
//!
//! Every action reads the last persisted snapshot, brings it up to date with
//! the simulation, applies its transform and writes the result back as one
//! conditional multi-field update. A stale write is retried from a fresh
//! read, so concurrent actions on the same companion never drop each other.
//! Creation is the one check-then-write that spans several documents; it is
//! serialized per user within the process.

use std::collections::{BTreeSet, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use petwatch_db::legacy::{self, Migration};
use petwatch_db::models::{CompanionRecord, RecordDefaults, WatchStreakRecord};
use petwatch_db::{DbError, DocumentStore, VersionedUpdate, paths};
use petwatch_sim::genre::{AliasTableMatcher, GenreMatcher, pick_favorite_genre};
use petwatch_sim::{SimConfig, care, leveling, lifecycle, shield, unlocks};
use petwatch_types::events::CompanionEvent;
use petwatch_types::models::{
    AccessoryType, Companion, CompanionColor, LifeState, Mood, Species, WatchStreak,
};

use crate::clock::{Clock, SystemClock};
use crate::error::PetError;
use crate::retry::{self, CallKind, RetryPolicy};

pub const MAX_NAME_CHARS: usize = 24;
const MAX_ID_LEN: usize = 128;
const CREATE_LOCK_STRIPES: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Extra read-modify-write rounds after a version conflict.
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
    /// Users remembered as migrated before the memo starts over.
    #[serde(default = "default_migration_memo_capacity")]
    pub migration_memo_capacity: usize,
}

fn default_conflict_retries() -> u32 {
    3
}

fn default_migration_memo_capacity() -> usize {
    65_536
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            conflict_retries: default_conflict_retries(),
            migration_memo_capacity: default_migration_memo_capacity(),
        }
    }
}

/// A companion after an action, with whatever happened along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub companion: Companion,
    pub events: Vec<CompanionEvent>,
}

/// Both records after a successful shield activation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShieldResult {
    pub companion: Companion,
    pub streak: WatchStreak,
    pub events: Vec<CompanionEvent>,
}

pub struct CompanionService<S> {
    store: Arc<S>,
    sim: SimConfig,
    config: ServiceConfig,
    matcher: Arc<dyn GenreMatcher>,
    clock: Arc<dyn Clock>,
    /// Users whose layout was checked recently.
    migrated: RwLock<HashSet<String>>,
    /// Striped by user id; held across a create's limit check and write.
    create_locks: Vec<Mutex<()>>,
}

impl<S: DocumentStore> CompanionService<S> {
    pub fn new(store: Arc<S>, sim: SimConfig) -> Self {
        Self {
            store,
            sim,
            config: ServiceConfig::default(),
            matcher: Arc::new(AliasTableMatcher::default()),
            clock: Arc::new(SystemClock),
            migrated: RwLock::new(HashSet::new()),
            create_locks: (0..CREATE_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn GenreMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn mood(&self, companion: &Companion) -> Mood {
        petwatch_sim::mood::mood(companion, &self.sim)
    }

    // -- Reads --

    /// All of a user's companions, oldest first, brought up to date.
    pub async fn list_companions(&self, user_id: &str) -> Result<Vec<Companion>, PetError> {
        self.ensure_migrated(user_id).await?;
        let now = self.now();
        let mut companions = self.load_all(user_id, now).await?;
        let mut stale = Vec::new();
        for (idx, companion) in companions.iter_mut().enumerate() {
            let mut events = Vec::new();
            if petwatch_sim::refresh(companion, now, &self.sim, &mut events) {
                stale.push(idx);
            }
        }
        if stale.is_empty() {
            return Ok(companions);
        }

        let updates = stale
            .iter()
            .map(|&idx| versioned_update(user_id, &companions[idx]))
            .collect::<Result<Vec<_>, _>>()?;
        let results = self
            .write("save_refreshed", move |s| s.update_many_if_version(&updates))
            .await?;
        for (idx, result) in stale.into_iter().zip(results) {
            let companion = &mut companions[idx];
            match result {
                Ok(version) => companion.version = version,
                // Losing the race is fine: the next read recomputes the same thing.
                Err(DbError::VersionConflict { path, .. } | DbError::NotFound(path)) => {
                    debug!(%path, "refresh lost a race, keeping computed view");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(companions)
    }

    pub async fn get_companion(
        &self,
        user_id: &str,
        pet_id: &str,
    ) -> Result<Option<Companion>, PetError> {
        self.ensure_migrated(user_id).await?;
        check_id("companion", pet_id)?;
        let now = self.now();
        let Some(mut companion) = self.load(user_id, pet_id, now).await? else {
            return Ok(None);
        };
        let mut events = Vec::new();
        if petwatch_sim::refresh(&mut companion, now, &self.sim, &mut events) {
            self.persist_refresh(user_id, &mut companion).await?;
        }
        Ok(Some(companion))
    }

    // -- Lifecycle --

    pub async fn create_companion(
        &self,
        user_id: &str,
        name: &str,
        species: Species,
    ) -> Result<Companion, PetError> {
        self.ensure_migrated(user_id).await?;
        let name = validate_name(name)?;
        let _guard = self.create_lock(user_id).lock().await;
        let now = self.now();

        let existing = self.load_all(user_id, now).await?;
        let limits = &self.sim.pets;
        if existing.len() >= limits.max_pets {
            return Err(PetError::LimitReached(format!(
                "at most {} companions per user",
                limits.max_pets
            )));
        }
        if !existing.is_empty() && !existing.iter().any(|c| c.level >= limits.second_pet_level) {
            return Err(PetError::LimitReached(format!(
                "a companion must reach level {} before adopting another",
                limits.second_pet_level
            )));
        }

        let companion = Companion {
            id: new_companion_id(),
            owner_id: user_id.to_string(),
            name,
            species,
            color: species.default_color(),
            level: 1,
            experience: 0,
            hunger: self.sim.decay.initial_hunger,
            happiness: self.sim.decay.initial_happiness,
            last_fed: now,
            last_status_update: now,
            episodes_watched: 0,
            total_series_watched: 0,
            achievement_points: 0,
            life: LifeState::Alive,
            revive_count: 0,
            favorite_genre: pick_favorite_genre(&mut rand::rng()),
            accessories: Vec::new(),
            unlocked_colors: BTreeSet::new(),
            unlocked_patterns: BTreeSet::new(),
            created_at: now,
            version: 0,
        };

        let record = Value::Object(CompanionRecord::from(&companion).to_fields()?);
        let path = paths::pet(user_id, &companion.id);
        self.write("create_companion", move |s| s.set(&path, &record)).await?;

        if self.get_active_companion(user_id).await?.is_none() {
            self.write_active(user_id, Some(companion.id.clone())).await?;
        }

        info!(
            user = user_id,
            companion = %companion.id,
            species = ?companion.species,
            favorite_genre = %companion.favorite_genre,
            "companion created"
        );
        Ok(companion)
    }

    pub async fn delete_companion(&self, user_id: &str, pet_id: &str) -> Result<(), PetError> {
        self.ensure_migrated(user_id).await?;
        check_id("companion", pet_id)?;

        let path = paths::pet(user_id, pet_id);
        let lookup = path.clone();
        if self.read("get_companion", move |s| s.get(&lookup)).await?.is_none() {
            return Err(not_found(pet_id));
        }
        self.write("delete_companion", move |s| s.remove(&path)).await?;
        info!(user = user_id, companion = pet_id, "companion deleted");

        if self.get_active_companion(user_id).await?.as_deref() == Some(pet_id) {
            let remaining = self.load_all(user_id, self.now()).await?;
            let fallback = remaining.first().map(|c| c.id.clone());
            debug!(user = user_id, ?fallback, "active companion deleted");
            self.write_active(user_id, fallback).await?;
        }
        Ok(())
    }

    pub async fn rename_companion(
        &self,
        user_id: &str,
        pet_id: &str,
        name: &str,
    ) -> Result<Outcome, PetError> {
        let name = validate_name(name)?;
        self.mutate(user_id, pet_id, "rename", |c, _, _| {
            if c.name == name {
                return Ok(false);
            }
            c.name = name.clone();
            Ok(true)
        })
        .await
    }

    // -- Care --

    pub async fn feed(&self, user_id: &str, pet_id: &str) -> Result<Outcome, PetError> {
        self.mutate(user_id, pet_id, "feed", |c, now, _| {
            Ok(care::feed(c, now, &self.sim.care))
        })
        .await
    }

    pub async fn play(&self, user_id: &str, pet_id: &str) -> Result<Outcome, PetError> {
        self.mutate(user_id, pet_id, "play", |c, _, _| {
            Ok(care::play(c, &self.sim.care))
        })
        .await
    }

    /// No-op on a living companion.
    pub async fn revive(&self, user_id: &str, pet_id: &str) -> Result<Outcome, PetError> {
        self.mutate(user_id, pet_id, "revive", |c, now, events| {
            match lifecycle::revive(c, now, &self.sim) {
                Some(event) => {
                    events.push(event);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
        .await
    }

    // -- Watching --

    /// Dead companions earn nothing.
    pub async fn record_episode_watched(
        &self,
        user_id: &str,
        pet_id: &str,
        genres: &[String],
    ) -> Result<Outcome, PetError> {
        self.mutate(user_id, pet_id, "record_episode", |c, now, events| {
            Ok(self.apply_episode(c, genres, now, events))
        })
        .await
    }

    /// Apply one watched episode to every living companion of the user.
    ///
    /// All companions go out in one batched write. Any that lost a race in
    /// the meantime are redone one by one from a fresh read.
    pub async fn record_episode_for_all(
        &self,
        user_id: &str,
        genres: &[String],
    ) -> Result<Vec<Outcome>, PetError> {
        self.ensure_migrated(user_id).await?;
        let now = self.now();

        let mut pending = Vec::new();
        for mut companion in self.load_all(user_id, now).await? {
            if !companion.is_alive() {
                continue;
            }
            let mut events = Vec::new();
            petwatch_sim::refresh(&mut companion, now, &self.sim, &mut events);
            self.apply_episode(&mut companion, genres, now, &mut events);
            self.settle(&mut companion, now, &mut events);
            pending.push(Outcome { companion, events });
        }
        if pending.is_empty() {
            return Ok(pending);
        }

        let updates = pending
            .iter()
            .map(|o| versioned_update(user_id, &o.companion))
            .collect::<Result<Vec<_>, _>>()?;
        let results = self
            .write("save_episode_batch", move |s| s.update_many_if_version(&updates))
            .await?;

        let mut outcomes = Vec::with_capacity(pending.len());
        for (mut outcome, result) in pending.into_iter().zip(results) {
            let pet_id = outcome.companion.id.clone();
            match result {
                Ok(version) => {
                    outcome.companion.version = version;
                    outcomes.push(outcome);
                }
                Err(DbError::VersionConflict { .. }) => {
                    debug!(user = user_id, companion = %pet_id, "fan-out lost a race, redoing");
                    match self.record_episode_watched(user_id, &pet_id, genres).await {
                        Ok(outcome) => outcomes.push(outcome),
                        Err(PetError::NotFound(_)) => {
                            debug!(user = user_id, companion = %pet_id, "companion vanished");
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(DbError::NotFound(_)) => {
                    debug!(user = user_id, companion = %pet_id, "companion vanished mid fan-out");
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!(user = user_id, companions = outcomes.len(), "episode recorded for all companions");
        Ok(outcomes)
    }

    pub async fn record_series_completed(
        &self,
        user_id: &str,
        pet_id: &str,
    ) -> Result<Outcome, PetError> {
        self.mutate(user_id, pet_id, "record_series", |c, now, events| {
            if !c.is_alive() {
                return Ok(false);
            }
            c.total_series_watched = c.total_series_watched.saturating_add(1);
            events.extend(leveling::grant_xp(
                c,
                self.sim.leveling.series_completion_xp,
                now,
                &self.sim,
            ));
            events.extend(unlocks::evaluate(c, now, &self.sim));
            Ok(true)
        })
        .await
    }

    // -- Cosmetics --

    pub async fn toggle_accessory(
        &self,
        user_id: &str,
        pet_id: &str,
        accessory: AccessoryType,
    ) -> Result<Outcome, PetError> {
        self.mutate(user_id, pet_id, "toggle_accessory", |c, _, _| {
            care::toggle_accessory(c, accessory)?;
            Ok(true)
        })
        .await
    }

    pub async fn change_color(
        &self,
        user_id: &str,
        pet_id: &str,
        color: CompanionColor,
    ) -> Result<Outcome, PetError> {
        self.mutate(user_id, pet_id, "change_color", |c, _, _| {
            let changed = c.color != color;
            care::change_color(c, color)?;
            Ok(changed)
        })
        .await
    }

    // -- Active companion --

    pub async fn get_active_companion(&self, user_id: &str) -> Result<Option<String>, PetError> {
        self.ensure_migrated(user_id).await?;
        let path = paths::active_pet(user_id);
        let raw = self.read("get_active", move |s| s.get(&path)).await?;
        Ok(raw.and_then(|v| v.as_str().map(str::to_string)))
    }

    /// Only moves the pointer; the companion itself is not touched.
    pub async fn set_active_companion(&self, user_id: &str, pet_id: &str) -> Result<(), PetError> {
        self.ensure_migrated(user_id).await?;
        check_id("companion", pet_id)?;
        let path = paths::pet(user_id, pet_id);
        if self.read("get_companion", move |s| s.get(&path)).await?.is_none() {
            return Err(not_found(pet_id));
        }
        self.write_active(user_id, Some(pet_id.to_string())).await
    }

    // -- Streak shield --

    /// Spend a companion's XP and happiness to carry a lapsing watch streak
    /// over the missed days. Nothing is written unless every check passes.
    pub async fn activate_streak_shield(
        &self,
        user_id: &str,
        pet_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ShieldResult, PetError> {
        self.ensure_migrated(user_id).await?;
        check_id("companion", pet_id)?;
        let streak_path = paths::watch_streak(user_id, now.year());

        let mut attempt = 0;
        loop {
            let mut companion = self
                .load(user_id, pet_id, now)
                .await?
                .ok_or_else(|| not_found(pet_id))?;
            let mut events = Vec::new();
            petwatch_sim::refresh(&mut companion, now, &self.sim, &mut events);

            let lookup = streak_path.clone();
            let streak = match self.read("get_watch_streak", move |s| s.get(&lookup)).await? {
                Some(raw) => WatchStreakRecord::from_value(raw)?.into_streak(),
                None => return Err(PetError::NotFound(format!("watch streak {}", now.year()))),
            };

            let shield::ShieldOutcome {
                companion: mut charged,
                streak: carried,
                event,
            } = shield::activate(&companion, &streak, now, &self.sim)?;
            events.push(event);
            self.settle(&mut charged, now, &mut events);

            let version = match self.save(user_id, &charged).await {
                Ok(version) => version,
                Err(PetError::Conflict(path)) if attempt < self.config.conflict_retries => {
                    attempt += 1;
                    warn!(op = "activate_shield", %path, attempt, "version conflict, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let fields = WatchStreakRecord::from(&carried).shield_fields()?;
            let path = streak_path.clone();
            if let Err(e) = self
                .write("update_watch_streak", move |s| s.update(&path, &fields))
                .await
            {
                error!(
                    user = user_id,
                    companion = pet_id,
                    error = %e,
                    "companion paid for a shield but the streak write failed"
                );
                return Err(e);
            }

            charged.version = version;
            return Ok(ShieldResult {
                companion: charged,
                streak: carried,
                events,
            });
        }
    }

    // -- Legacy layout --

    /// Move a legacy single-companion record into the keyed layout, once per
    /// user per process. Safe to repeat when the memo is lost.
    pub async fn ensure_migrated(&self, user_id: &str) -> Result<(), PetError> {
        check_id("user", user_id)?;
        if self.migrated.read().await.contains(user_id) {
            return Ok(());
        }

        let path = paths::pets(user_id);
        let raw = self.read("get_pets", move |s| s.get(&path)).await?;

        if let Migration::Migrated {
            keyed,
            companion_id,
        } = legacy::migrate(raw.as_ref(), new_companion_id)
        {
            info!(user = user_id, companion = %companion_id, "migrating legacy companion layout");
            let mut fields = Map::new();
            fields.insert(paths::PETS.to_string(), keyed);
            fields.insert(paths::ACTIVE_PET.to_string(), Value::String(companion_id));
            let user_path = paths::user(user_id);
            self.write("migrate_legacy", move |s| s.update(&user_path, &fields)).await?;
        }

        let mut migrated = self.migrated.write().await;
        if migrated.len() >= self.config.migration_memo_capacity {
            debug!(users = migrated.len(), "migration memo full, starting over");
            migrated.clear();
        }
        migrated.insert(user_id.to_string());
        Ok(())
    }

    // -- Internals --

    /// Read, refresh, transform, conditionally write. `apply` returns whether
    /// it changed anything; when neither it nor the refresh did, nothing is
    /// written.
    async fn mutate<F>(
        &self,
        user_id: &str,
        pet_id: &str,
        op: &'static str,
        mut apply: F,
    ) -> Result<Outcome, PetError>
    where
        F: FnMut(&mut Companion, DateTime<Utc>, &mut Vec<CompanionEvent>) -> Result<bool, PetError>,
    {
        self.ensure_migrated(user_id).await?;
        check_id("companion", pet_id)?;

        let mut attempt = 0;
        loop {
            let now = self.now();
            let mut companion = self
                .load(user_id, pet_id, now)
                .await?
                .ok_or_else(|| not_found(pet_id))?;

            let mut events = Vec::new();
            let refreshed = petwatch_sim::refresh(&mut companion, now, &self.sim, &mut events);
            let changed = apply(&mut companion, now, &mut events)?;
            if changed {
                self.settle(&mut companion, now, &mut events);
            }
            if !refreshed && !changed {
                return Ok(Outcome { companion, events });
            }

            match self.save(user_id, &companion).await {
                Ok(version) => {
                    companion.version = version;
                    debug!(op, user = user_id, companion = pet_id, version, "companion saved");
                    return Ok(Outcome { companion, events });
                }
                Err(PetError::Conflict(path)) if attempt < self.config.conflict_retries => {
                    attempt += 1;
                    warn!(op, %path, attempt, "version conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Persist state that only changed by being read. Losing the race to
    /// another writer is fine: the next read recomputes the same thing.
    async fn persist_refresh(
        &self,
        user_id: &str,
        companion: &mut Companion,
    ) -> Result<(), PetError> {
        match self.save(user_id, companion).await {
            Ok(version) => {
                companion.version = version;
                Ok(())
            }
            Err(PetError::Conflict(path)) => {
                debug!(%path, "refresh lost a race, keeping computed view");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, user_id: &str, companion: &Companion) -> Result<u64, PetError> {
        let fields = CompanionRecord::from(companion).to_fields()?;
        let path = paths::pet(user_id, &companion.id);
        let expected = companion.version;
        self.write("save_companion", move |s| s.update_if_version(&path, &fields, expected)).await
    }

    /// Episode bookkeeping shared by the single and fan-out paths.
    fn apply_episode(
        &self,
        c: &mut Companion,
        genres: &[String],
        now: DateTime<Utc>,
        events: &mut Vec<CompanionEvent>,
    ) -> bool {
        if !c.is_alive() {
            return false;
        }
        let reward = leveling::episode_reward(c, genres, self.matcher.as_ref(), &self.sim.leveling);
        c.episodes_watched = c.episodes_watched.saturating_add(1);
        c.happiness = care::add_capped(c.happiness, reward.happiness_bonus);
        events.extend(leveling::grant_xp(c, reward.xp, now, &self.sim));
        events.extend(unlocks::evaluate(c, now, &self.sim));
        true
    }

    /// Apply the death rules to stats an action just moved.
    fn settle(&self, c: &mut Companion, now: DateTime<Utc>, events: &mut Vec<CompanionEvent>) {
        events.extend(lifecycle::evaluate_death(c, now, &self.sim));
    }

    fn create_lock(&self, user_id: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        user_id.hash(&mut hasher);
        &self.create_locks[hasher.finish() as usize % self.create_locks.len()]
    }

    async fn write_active(&self, user_id: &str, pet_id: Option<String>) -> Result<(), PetError> {
        let path = paths::active_pet(user_id);
        let value = pet_id.map(Value::String).unwrap_or(Value::Null);
        self.write("set_active", move |s| s.set(&path, &value)).await
    }

    async fn load(
        &self,
        user_id: &str,
        pet_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Companion>, PetError> {
        let path = paths::pet(user_id, pet_id);
        let raw = self.read("get_companion", move |s| s.get(&path)).await?;
        Ok(raw.and_then(|raw| self.decode(user_id, pet_id, raw, now)))
    }

    /// Every decodable companion of the user, ordered by creation time then id.
    async fn load_all(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Companion>, PetError> {
        let path = paths::pets(user_id);
        let raw = self.read("get_pets", move |s| s.get(&path)).await?;

        let entries = match raw {
            None => return Ok(Vec::new()),
            Some(Value::Object(entries)) => entries,
            Some(other) => {
                warn!("Companion map for user '{}' is not an object: {}", user_id, other);
                return Ok(Vec::new());
            }
        };

        let mut companions: Vec<Companion> = entries
            .into_iter()
            .filter_map(|(id, raw)| self.decode(user_id, &id, raw, now))
            .collect();
        companions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(companions)
    }

    fn decode(
        &self,
        user_id: &str,
        pet_id: &str,
        raw: Value,
        now: DateTime<Utc>,
    ) -> Option<Companion> {
        match CompanionRecord::from_value(raw) {
            Ok(record) => Some(record.into_companion(pet_id, user_id, now, self.record_defaults())),
            Err(e) => {
                warn!("Skipping unreadable companion '{}' of user '{}': {}", pet_id, user_id, e);
                None
            }
        }
    }

    fn record_defaults(&self) -> RecordDefaults {
        RecordDefaults {
            hunger: self.sim.decay.initial_hunger,
            happiness: self.sim.decay.initial_happiness,
        }
    }

    async fn read<T, F>(&self, op: &'static str, f: F) -> Result<T, PetError>
    where
        T: Send + 'static,
        F: Fn(&S) -> petwatch_db::Result<T> + Clone + Send + 'static,
    {
        retry::run(&self.store, &self.config.retry, op, CallKind::Read, f).await
    }

    async fn write<T, F>(&self, op: &'static str, f: F) -> Result<T, PetError>
    where
        T: Send + 'static,
        F: Fn(&S) -> petwatch_db::Result<T> + Clone + Send + 'static,
    {
        retry::run(&self.store, &self.config.retry, op, CallKind::Write, f).await
    }
}

fn versioned_update(user_id: &str, companion: &Companion) -> Result<VersionedUpdate, PetError> {
    Ok(VersionedUpdate {
        path: paths::pet(user_id, &companion.id),
        fields: CompanionRecord::from(companion).to_fields()?,
        expected: companion.version,
    })
}

fn new_companion_id() -> String {
    Uuid::new_v4().to_string()
}

fn not_found(pet_id: &str) -> PetError {
    PetError::NotFound(format!("companion {pet_id}"))
}

fn check_id(kind: &str, id: &str) -> Result<(), PetError> {
    if id.is_empty() || id.len() > MAX_ID_LEN || id.contains('/') {
        return Err(PetError::InvalidInput(format!("invalid {kind} id")));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<String, PetError> {
    let name = name.trim();
    let chars = name.chars().count();
    if chars == 0 || chars > MAX_NAME_CHARS {
        return Err(PetError::InvalidInput(format!(
            "name must be 1 to {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}
