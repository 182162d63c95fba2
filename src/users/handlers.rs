use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{AdminUser, AuthUser, FinanceOrAdmin},
    error::ApiError,
    state::AppState,
    users::{
        dto::{parse_user_id, CreateUserRequest, UpdateUserRequest},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users).patch(update_user).post(create_user),
        )
        .route("/users/:id", get(get_user))
}

/// GET /users — admin only.
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.store.list_all().await?;
    Ok(Json(users))
}

/// GET /users/:id — admin or finance-manager. The id arrives as a raw path
/// segment so a malformed one gets the contractual plain-text 400 instead
/// of axum's rejection.
#[instrument(skip(state, _viewer))]
pub async fn get_user(
    State(state): State<AppState>,
    _viewer: FinanceOrAdmin,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadId("Id must be a number"))?;
    let user = state.store.get_by_id(id).await?;
    Ok(Json(user))
}

/// PATCH /users — admin only. Empty-string fields are "no change
/// requested" and reach the store as the unchanged marker.
#[instrument(skip(state, _admin, body))]
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let raw = body
        .user_id
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or(ApiError::BadId("Id must be a number"))?;
    let user_id = parse_user_id(raw).ok_or(ApiError::BadId("Please enter a valid Id"))?;

    let updated = state.store.update(body.into_patch(user_id)).await?;
    info!(user_id = %updated.user_id, "user updated");
    Ok(Json(updated))
}

/// POST /users — any authenticated caller. Validation failures are
/// forwarded to the shared error mapping, not answered here.
#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    body.validate().map_err(ApiError::InvalidInput)?;

    let created = state.store.create(body.into_new_user()).await?;
    info!(user_id = %created.user_id, created_by = %auth.id, "user created");
    Ok(Json(created))
}
