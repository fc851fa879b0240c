use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AdminUser,
    error::ApiError,
    state::AppState,
    users::{
        dto::{DeleteResponse, ListUsersQuery, UpdateStatusRequest, UserListResponse},
        repo_types::{PublicUser, User, UserStatus},
    },
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/status", patch(update_user_status))
        .route("/users/:id", delete(delete_user))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let (page, limit) = (query.page(), query.limit());
    let keyword = query.keyword();

    let users = PublicUser::search(&state.db, keyword, limit, query.offset()).await?;
    let total = PublicUser::count(&state.db, keyword).await?;

    Ok(Json(UserListResponse {
        users,
        total,
        page,
        limit,
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_user_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = parse_user_id(&id)?;
    let status: UserStatus = payload
        .status
        .parse()
        .map_err(|_| ApiError::validation("status", format!("invalid user status: {}", payload.status)))?;

    let user = PublicUser::update_status(&state.db, id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    info!(user_id = %id, status = %status, admin_id = %admin.id, "user status updated");
    Ok(Json(user))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_user_id(&id)?;

    // Permanent removal; tokens already issued to this user stay valid
    // until they expire.
    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        warn!(user_id = %id, "delete of unknown user");
        return Err(ApiError::NotFound("user not found".into()));
    }

    info!(user_id = %id, admin_id = %admin.id, "user deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "user deleted".into(),
    }))
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("id", "invalid user id format"))
}
