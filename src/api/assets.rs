//! Asset endpoints

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        asset::{AssetQuery, CreateAsset},
        Asset,
    },
    pagination::PagedResponse,
};

use super::{paging_route, response::ApiResponse};

/// List assets of a location
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    params(AssetQuery),
    responses(
        (status = 200, description = "Paged assets", body = Vec<Asset>)
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<PagedResponse<Asset>>> {
    let page = state.services.assets.list(query, &paging_route(&uri)).await?;
    Ok(Json(page))
}

/// Get asset by ID
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = Asset),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Asset>>> {
    let asset = state.services.assets.get_by_id(id).await?;
    Ok(Json(ApiResponse::data(asset)))
}

/// Register a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Asset code already exists")
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<ApiResponse<Asset>>)> {
    let created = state.services.assets.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created, "Create asset successfully.")),
    ))
}
