//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderName, StatusCode, header::SET_COOKIE},
};

use crate::{
    domain::{ProfileId, RoomId, TraitStats, UserId},
    infrastructure::dto::http::{
        HealthResponse, LogInRequest, ProfileCreateRequest, ProfileInfo, ProfileUpdateRequest,
        RoomCreateRequest, RoomInfo, RoomUpdateRequest, SignUpRequest, SignUpResponse, UserInfo,
    },
    ui::state::AppState,
    usecase::{ProfileChanges, RoomChanges},
};

use super::{
    auth::{AUTH_COOKIE, CurrentUser},
    error::ApiError,
};

/// Lifetime of the `auth` cookie set on log-in, in seconds (one week).
const AUTH_COOKIE_MAX_AGE: u64 = 7 * 24 * 60 * 60;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<SignUpResponse>, ApiError> {
    let (user, token) = state
        .sign_up_usecase
        .execute(request.nickname, request.password)
        .await?;
    Ok(Json(SignUpResponse {
        user: (&user).into(),
        token: token.into_string(),
    }))
}

/// Password log-in. The new token is returned in the body and as the `auth` cookie.
pub async fn log_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogInRequest>,
) -> Result<([(HeaderName, String); 1], Json<SignUpResponse>), ApiError> {
    let (user, token) = state
        .log_in_usecase
        .execute(UserId::new(request.id), request.password)
        .await?;
    let cookie = format!(
        "{}={}; SameSite=Strict; Path=/; Secure; HttpOnly; Max-Age={}",
        AUTH_COOKIE,
        token.as_str(),
        AUTH_COOKIE_MAX_AGE
    );
    Ok((
        [(SET_COOKIE, cookie)],
        Json(SignUpResponse {
            user: (&user).into(),
            token: token.into_string(),
        }),
    ))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserInfo> {
    Json((&user).into())
}

pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ProfileCreateRequest>,
) -> Result<Json<ProfileInfo>, ApiError> {
    let stats = TraitStats::try_from(request.stats)?;
    let profile = state
        .profile_usecase
        .create(&user, request.details, stats, request.traits)
        .await?;
    Ok(Json(ProfileInfo::new(&profile, &user)))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(_): CurrentUser,
    Path(profile_id): Path<i64>,
) -> Result<Json<ProfileInfo>, ApiError> {
    let (profile, creator) = state.profile_usecase.get(ProfileId::new(profile_id)).await?;
    Ok(Json(ProfileInfo::new(&profile, &creator)))
}

pub async fn my_profiles(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ProfileInfo>>, ApiError> {
    let profiles = state.profile_usecase.list_mine(&user).await?;
    Ok(Json(
        profiles
            .iter()
            .map(|profile| ProfileInfo::new(profile, &user))
            .collect(),
    ))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(profile_id): Path<i64>,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<Json<ProfileInfo>, ApiError> {
    let changes = ProfileChanges {
        details: request.details,
        stats: request.stats.map(TraitStats::try_from).transpose()?,
        traits: request.traits,
    };
    let profile = state
        .profile_usecase
        .update(&user, ProfileId::new(profile_id), changes)
        .await?;
    Ok(Json(ProfileInfo::new(&profile, &user)))
}

pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(profile_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .profile_usecase
        .delete(&user, ProfileId::new(profile_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<RoomCreateRequest>,
) -> Result<Json<RoomInfo>, ApiError> {
    let room = state
        .room_usecase
        .create(&user, request.title, request.tags, request.description)
        .await?;
    Ok(Json(RoomInfo::new(&room, &user)))
}

pub async fn get_room(
    State(state): State<Arc<AppState>>,
    CurrentUser(_): CurrentUser,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomInfo>, ApiError> {
    let (room, creator) = state.room_usecase.get(RoomId::new(room_id)).await?;
    Ok(Json(RoomInfo::new(&room, &creator)))
}

pub async fn update_room(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(room_id): Path<i64>,
    Json(request): Json<RoomUpdateRequest>,
) -> Result<Json<RoomInfo>, ApiError> {
    let changes = RoomChanges {
        title: request.title,
        tags: request.tags,
        description: request.description,
    };
    let room = state
        .room_usecase
        .update(&user, RoomId::new(room_id), changes)
        .await?;
    Ok(Json(RoomInfo::new(&room, &user)))
}
