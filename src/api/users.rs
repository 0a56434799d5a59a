//! User management endpoints

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::user::{CreateUser, User, UserQuery, UserSummary},
    pagination::PagedResponse,
};

use super::{paging_route, response::ApiResponse};

/// List users of a location with search and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(UserQuery),
    responses(
        (status = 200, description = "Paged users", body = Vec<UserSummary>)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PagedResponse<UserSummary>>> {
    let page = state.services.users.list(query, &paging_route(&uri)).await?;
    Ok(Json(page))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.services.users.get_by_id(id).await?;
    Ok(Json(ApiResponse::data(user)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username taken concurrently")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let created = state.services.users.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created, "Create user successfully.")),
    ))
}

/// Disable a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User disabled"),
        (status = 404, description = "User not found"),
        (status = 422, description = "User still holds assignments")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.users.delete(id).await?;
    Ok(Json(ApiResponse::success((), "Disable user successfully.")))
}
