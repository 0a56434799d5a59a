//! Asset model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{AssetState, Location};

/// Asset model from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub asset_code: String,
    pub asset_name: String,
    pub category: String,
    pub specification: Option<String>,
    pub installed_date: Option<NaiveDate>,
    pub state: AssetState,
    pub location: Location,
    pub is_deleted: bool,
    pub created_on: DateTime<Utc>,
}

/// Asset list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AssetQuery {
    pub location: Location,
    /// Matches asset code or asset name
    pub search: Option<String>,
    pub state: Option<AssetState>,
    pub category: Option<String>,
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
    /// assetCode, assetName, category or state
    pub order_by: Option<String>,
    pub is_descending: Option<bool>,
}

/// Filters handed to the assets repository
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFilter {
    pub location: Location,
    pub search: Option<String>,
    pub state: Option<AssetState>,
    pub category: Option<String>,
}

/// Create asset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 20, message = "Asset code must be 1 - 20 characters."))]
    pub asset_code: String,
    #[validate(length(min = 1, max = 100, message = "Asset name must be 1 - 100 characters."))]
    pub asset_name: String,
    #[validate(length(min = 1, max = 50, message = "Category must be 1 - 50 characters."))]
    pub category: String,
    #[validate(length(max = 500, message = "Specification must be at most 500 characters."))]
    pub specification: Option<String>,
    pub installed_date: Option<NaiveDate>,
    pub state: Option<AssetState>,
    #[validate(required(message = "Please select Location."))]
    pub location: Option<Location>,
    pub created_by: Option<Uuid>,
}

/// Validated asset ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub id: Uuid,
    pub asset_code: String,
    pub asset_name: String,
    pub category: String,
    pub specification: Option<String>,
    pub installed_date: Option<NaiveDate>,
    pub state: AssetState,
    pub location: Location,
    pub created_by: Option<String>,
}
