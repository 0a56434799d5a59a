//! Return request endpoints

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        return_request::{ChangeReturnRequestState, CreateReturnRequest, ReturnRequestQuery},
        ReturnRequestDetails,
    },
    pagination::PagedResponse,
};

use super::{paging_route, response::ApiResponse};

/// Request the return of an assigned asset
#[utoipa::path(
    post,
    path = "/return-requests",
    tag = "return-requests",
    request_body = CreateReturnRequest,
    responses(
        (status = 201, description = "Return request created", body = ReturnRequestDetails),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Assignment or user not found"),
        (status = 422, description = "A return request already exists")
    )
)]
pub async fn create_return_request(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateReturnRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReturnRequestDetails>>)> {
    let created = state.services.return_requests.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created, "Create return request successfully.")),
    ))
}

/// List the return requests of a location
#[utoipa::path(
    get,
    path = "/return-requests",
    tag = "return-requests",
    params(ReturnRequestQuery),
    responses(
        (status = 200, description = "Paged return requests", body = Vec<ReturnRequestDetails>)
    )
)]
pub async fn list_return_requests(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ReturnRequestQuery>,
) -> AppResult<Json<PagedResponse<ReturnRequestDetails>>> {
    let page = state
        .services
        .return_requests
        .list(query, &paging_route(&uri))
        .await?;
    Ok(Json(page))
}

/// Complete or reject a return request
#[utoipa::path(
    put,
    path = "/return-requests/{id}/state",
    tag = "return-requests",
    params(("id" = Uuid, Path, description = "Return request ID")),
    request_body = ChangeReturnRequestState,
    responses(
        (status = 200, description = "State changed", body = ReturnRequestDetails),
        (status = 404, description = "Return request or user not found"),
        (status = 422, description = "Return request state cannot be changed")
    )
)]
pub async fn change_return_request_state(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeReturnRequestState>,
) -> AppResult<Json<ApiResponse<ReturnRequestDetails>>> {
    let updated = state
        .services
        .return_requests
        .change_state(id, request)
        .await?;
    Ok(Json(ApiResponse::success(
        updated,
        "Change return request state successfully.",
    )))
}
