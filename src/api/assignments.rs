//! Assignment endpoints

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        assignment::{
            AssignmentQuery, ChangeAssignmentState, CreateAssignment, EditAssignment,
            UserAssignmentQuery,
        },
        AssignmentDetails,
    },
    pagination::PagedResponse,
};

use super::{paging_route, response::ApiResponse};

/// Assign an asset to a user
#[utoipa::path(
    post,
    path = "/assignments",
    tag = "assignments",
    request_body = CreateAssignment,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentDetails),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Asset or user not found"),
        (status = 409, description = "Asset already assigned"),
        (status = 422, description = "Assigned date precedes joined date")
    )
)]
pub async fn create_assignment(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<ApiResponse<AssignmentDetails>>)> {
    let created = state.services.assignments.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created, "Create assignment successfully.")),
    ))
}

/// List the assignments of a location
#[utoipa::path(
    get,
    path = "/assignments",
    tag = "assignments",
    params(AssignmentQuery),
    responses(
        (status = 200, description = "Paged assignments", body = Vec<AssignmentDetails>)
    )
)]
pub async fn list_assignments(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<AssignmentQuery>,
) -> AppResult<Json<PagedResponse<AssignmentDetails>>> {
    let page = state
        .services
        .assignments
        .list(query, &paging_route(&uri))
        .await?;
    Ok(Json(page))
}

/// Get assignment by ID
#[utoipa::path(
    get,
    path = "/assignments/{id}",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment details", body = AssignmentDetails),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn get_assignment(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AssignmentDetails>>> {
    let assignment = state.services.assignments.get_by_id(id).await?;
    Ok(Json(ApiResponse::data(assignment)))
}

/// Edit an assignment that is still waiting for acceptance
#[utoipa::path(
    put,
    path = "/assignments/{id}",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = CreateAssignment,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentDetails),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Assignment, asset or user not found"),
        (status = 409, description = "New asset already assigned"),
        (status = 422, description = "Assignment is no longer editable")
    )
)]
pub async fn update_assignment(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditAssignment>,
) -> AppResult<Json<ApiResponse<AssignmentDetails>>> {
    let updated = state.services.assignments.update(id, request).await?;
    Ok(Json(ApiResponse::success(updated, "Update assignment successfully.")))
}

/// Delete an assignment
#[utoipa::path(
    delete,
    path = "/assignments/{id}",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found"),
        (status = 422, description = "Assignment is accepted or has a return request")
    )
)]
pub async fn delete_assignment(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.assignments.delete(id).await?;
    Ok(Json(ApiResponse::success((), "Delete assignment successfully.")))
}

/// Accept or decline an assignment
#[utoipa::path(
    put,
    path = "/assignments/{id}/state",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = ChangeAssignmentState,
    responses(
        (status = 200, description = "State changed", body = AssignmentDetails),
        (status = 404, description = "Assignment not found"),
        (status = 422, description = "Assignment state cannot be changed")
    )
)]
pub async fn change_assignment_state(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeAssignmentState>,
) -> AppResult<Json<ApiResponse<AssignmentDetails>>> {
    let updated = state
        .services
        .assignments
        .change_state(id, request.new_state)
        .await?;
    Ok(Json(ApiResponse::success(
        updated,
        "Change assignment state successfully.",
    )))
}

/// Every assignment of a user, whatever its state
#[utoipa::path(
    get,
    path = "/users/{id}/assignments",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Assignments held by the user", body = Vec<AssignmentDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_assignments(
    State(state): State<crate::AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<AssignmentDetails>>>> {
    let assignments = state.services.assignments.list_for_user(user_id).await?;
    Ok(Json(ApiResponse::data(assignments)))
}

/// Search, filter and page the assignments of a user
#[utoipa::path(
    get,
    path = "/users/{id}/assignments/filter",
    tag = "assignments",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        UserAssignmentQuery
    ),
    responses(
        (status = 200, description = "Paged assignments", body = Vec<AssignmentDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn filter_user_assignments(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    Path(user_id): Path<Uuid>,
    Query(query): Query<UserAssignmentQuery>,
) -> AppResult<Json<PagedResponse<AssignmentDetails>>> {
    let page = state
        .services
        .assignments
        .filter_for_user(user_id, query, &paging_route(&uri))
        .await?;
    Ok(Json(page))
}
