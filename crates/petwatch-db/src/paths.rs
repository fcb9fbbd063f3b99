//! Store layout.
//!
//! ```text
//! users/{uid}/pets/{petId}        one companion
//! users/{uid}/pets                legacy: a bare companion record
//! users/{uid}/activePetId         active companion pointer
//! users/{uid}/watchStreak/{year}  watch streak, owned by media tracking
//! ```

/// Child of a user document holding the companions.
pub const PETS: &str = "pets";

/// Child of a user document holding the active companion id.
pub const ACTIVE_PET: &str = "activePetId";

pub fn user(user_id: &str) -> String {
    format!("users/{user_id}")
}

pub fn pets(user_id: &str) -> String {
    format!("users/{user_id}/{PETS}")
}

pub fn pet(user_id: &str, pet_id: &str) -> String {
    format!("users/{user_id}/{PETS}/{pet_id}")
}

pub fn active_pet(user_id: &str) -> String {
    format!("users/{user_id}/{ACTIVE_PET}")
}

pub fn watch_streak(user_id: &str, year: i32) -> String {
    format!("users/{user_id}/watchStreak/{year}")
}
