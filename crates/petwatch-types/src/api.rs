use serde::{Deserialize, Serialize};

use crate::events::CompanionEvent;
use crate::models::{Companion, CompanionColor, Mood, Species, WatchStreak};

// -- Companions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCompanionRequest {
    pub name: String,
    pub species: Species,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameCompanionRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CompanionResponse {
    pub companion: Companion,
    pub mood: Mood,
}

/// Result of any action that mutates a companion.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub companion: Companion,
    pub mood: Mood,
    pub events: Vec<CompanionEvent>,
}

// -- Watching --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpisodeWatchedRequest {
    #[serde(default)]
    pub genres: Vec<String>,
}

// -- Cosmetics --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeColorRequest {
    pub color: CompanionColor,
}

// -- Active companion --

#[derive(Debug, Deserialize, Serialize)]
pub struct ActiveCompanion {
    pub companion_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetActiveCompanionRequest {
    pub companion_id: String,
}

// -- Streak shield --

#[derive(Debug, Serialize)]
pub struct ShieldResponse {
    pub companion: Companion,
    pub streak: WatchStreak,
    pub events: Vec<CompanionEvent>,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}
