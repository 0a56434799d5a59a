//! Return request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Location, ReturnRequestState};

/// Return request row from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub requested_by: Uuid,
    pub accepted_by: Option<Uuid>,
    pub returned_date: DateTime<Utc>,
    pub location: Location,
    pub state: ReturnRequestState,
    pub created_on: DateTime<Utc>,
}

/// Return request with asset and user details for display
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequestDetails {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub asset_code: String,
    pub asset_name: String,
    pub requested_by: Uuid,
    pub requested_by_username: String,
    pub accepted_by: Option<Uuid>,
    pub accepted_by_username: Option<String>,
    pub assigned_date: NaiveDate,
    pub returned_date: DateTime<Utc>,
    pub location: Location,
    pub state: ReturnRequestState,
}

/// Create return request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReturnRequest {
    #[validate(required(message = "Assignment is required."))]
    pub assignment_id: Option<Uuid>,
    #[validate(required(message = "Requested by user is required."))]
    pub requested_by: Option<Uuid>,
    /// Defaults to now
    pub returned_date: Option<DateTime<Utc>>,
}

/// Change return request state
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReturnRequestState {
    pub new_state: ReturnRequestState,
    #[validate(required(message = "Accepted by user is required."))]
    pub accepted_by: Option<Uuid>,
}

/// Row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewReturnRequest {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub requested_by: Uuid,
    pub returned_date: DateTime<Utc>,
    pub location: Location,
}

/// Filters handed to the return requests repository
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRequestFilter {
    pub location: Location,
    pub search: Option<String>,
    pub state: Option<ReturnRequestState>,
    pub returned_date: Option<NaiveDate>,
}

/// Return request list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReturnRequestQuery {
    /// Location managed by the requesting admin
    pub location: Location,
    /// Matches asset code, asset name or requester username
    pub search: Option<String>,
    pub state: Option<ReturnRequestState>,
    /// Exact calendar date (YYYY-MM-DD, UTC)
    pub returned_date: Option<NaiveDate>,
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
    /// assetCode, assetName, requestedBy, assignedDate, acceptedBy, returnedDate or state
    pub order_by: Option<String>,
    pub is_descending: Option<bool>,
}
