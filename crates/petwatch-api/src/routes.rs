use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tracing::error;

use petwatch_db::Database;
use petwatch_types::api::{
    ActionResponse, ActiveCompanion, ChangeColorRequest, CompanionResponse,
    CreateCompanionRequest, EpisodeWatchedRequest, ErrorResponse, RenameCompanionRequest,
    SetActiveCompanionRequest, ShieldResponse,
};
use petwatch_types::models::AccessoryType;

use crate::error::PetError;
use crate::service::{CompanionService, Outcome};

pub type AppState = Arc<CompanionService<Database>>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users/{user_id}/pets", get(list_companions).post(create_companion))
        .route(
            "/users/{user_id}/pets/{pet_id}",
            get(get_companion)
                .patch(rename_companion)
                .delete(delete_companion),
        )
        .route("/users/{user_id}/pets/{pet_id}/feed", post(feed))
        .route("/users/{user_id}/pets/{pet_id}/play", post(play))
        .route("/users/{user_id}/pets/{pet_id}/revive", post(revive))
        .route("/users/{user_id}/pets/{pet_id}/episodes", post(record_episode))
        .route("/users/{user_id}/pets/{pet_id}/series", post(record_series))
        .route(
            "/users/{user_id}/pets/{pet_id}/accessories/{accessory}/toggle",
            post(toggle_accessory),
        )
        .route("/users/{user_id}/pets/{pet_id}/color", put(change_color))
        .route("/users/{user_id}/pets/{pet_id}/shield", post(activate_shield))
        .route("/users/{user_id}/episodes", post(record_episode_for_all))
        .route(
            "/users/{user_id}/active-pet",
            get(get_active_companion).put(set_active_companion),
        )
        .with_state(state)
}

impl IntoResponse for PetError {
    fn into_response(self) -> Response {
        let status = match &self {
            PetError::NotFound(_) => StatusCode::NOT_FOUND,
            PetError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PetError::InvalidState(_) | PetError::Conflict(_) => StatusCode::CONFLICT,
            PetError::InsufficientResources { .. } | PetError::NotEligible(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PetError::Cooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
            PetError::LimitReached(_) | PetError::Locked(_) => StatusCode::FORBIDDEN,
            PetError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PetError::StoreFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn action_response(service: &AppState, outcome: Outcome) -> Json<ActionResponse> {
    Json(ActionResponse {
        mood: service.mood(&outcome.companion),
        companion: outcome.companion,
        events: outcome.events,
    })
}

// -- Companions --

pub async fn list_companions(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<CompanionResponse>>, PetError> {
    let companions = service.list_companions(&user_id).await?;
    Ok(Json(
        companions
            .into_iter()
            .map(|companion| CompanionResponse {
                mood: service.mood(&companion),
                companion,
            })
            .collect(),
    ))
}

pub async fn create_companion(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<CreateCompanionRequest>,
) -> Result<impl IntoResponse, PetError> {
    let companion = service
        .create_companion(&user_id, &req.name, req.species)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CompanionResponse {
            mood: service.mood(&companion),
            companion,
        }),
    ))
}

pub async fn get_companion(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> Result<Json<CompanionResponse>, PetError> {
    let companion = service
        .get_companion(&user_id, &pet_id)
        .await?
        .ok_or_else(|| PetError::NotFound(format!("companion {pet_id}")))?;
    Ok(Json(CompanionResponse {
        mood: service.mood(&companion),
        companion,
    }))
}

pub async fn rename_companion(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
    Json(req): Json<RenameCompanionRequest>,
) -> Result<Json<ActionResponse>, PetError> {
    let outcome = service.rename_companion(&user_id, &pet_id, &req.name).await?;
    Ok(action_response(&service, outcome))
}

pub async fn delete_companion(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> Result<StatusCode, PetError> {
    service.delete_companion(&user_id, &pet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Care --

pub async fn feed(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, PetError> {
    let outcome = service.feed(&user_id, &pet_id).await?;
    Ok(action_response(&service, outcome))
}

pub async fn play(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, PetError> {
    let outcome = service.play(&user_id, &pet_id).await?;
    Ok(action_response(&service, outcome))
}

pub async fn revive(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, PetError> {
    let outcome = service.revive(&user_id, &pet_id).await?;
    Ok(action_response(&service, outcome))
}

// -- Watching --

pub async fn record_episode(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
    Json(req): Json<EpisodeWatchedRequest>,
) -> Result<Json<ActionResponse>, PetError> {
    let outcome = service
        .record_episode_watched(&user_id, &pet_id, &req.genres)
        .await?;
    Ok(action_response(&service, outcome))
}

pub async fn record_episode_for_all(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<EpisodeWatchedRequest>,
) -> Result<Json<Vec<ActionResponse>>, PetError> {
    let outcomes = service.record_episode_for_all(&user_id, &req.genres).await?;
    Ok(Json(
        outcomes
            .into_iter()
            .map(|outcome| action_response(&service, outcome).0)
            .collect(),
    ))
}

pub async fn record_series(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, PetError> {
    let outcome = service.record_series_completed(&user_id, &pet_id).await?;
    Ok(action_response(&service, outcome))
}

// -- Cosmetics --

pub async fn toggle_accessory(
    State(service): State<AppState>,
    Path((user_id, pet_id, accessory)): Path<(String, String, AccessoryType)>,
) -> Result<Json<ActionResponse>, PetError> {
    let outcome = service.toggle_accessory(&user_id, &pet_id, accessory).await?;
    Ok(action_response(&service, outcome))
}

pub async fn change_color(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
    Json(req): Json<ChangeColorRequest>,
) -> Result<Json<ActionResponse>, PetError> {
    let outcome = service.change_color(&user_id, &pet_id, req.color).await?;
    Ok(action_response(&service, outcome))
}

// -- Active companion --

pub async fn get_active_companion(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ActiveCompanion>, PetError> {
    let companion_id = service.get_active_companion(&user_id).await?;
    Ok(Json(ActiveCompanion { companion_id }))
}

pub async fn set_active_companion(
    State(service): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SetActiveCompanionRequest>,
) -> Result<Json<ActiveCompanion>, PetError> {
    service
        .set_active_companion(&user_id, &req.companion_id)
        .await?;
    Ok(Json(ActiveCompanion {
        companion_id: Some(req.companion_id),
    }))
}

// -- Streak shield --

pub async fn activate_shield(
    State(service): State<AppState>,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> Result<Json<ShieldResponse>, PetError> {
    let now = service.now();
    let result = service
        .activate_streak_shield(&user_id, &pet_id, now)
        .await?;
    Ok(Json(ShieldResponse {
        companion: result.companion,
        streak: result.streak,
        events: result.events,
    }))
}
