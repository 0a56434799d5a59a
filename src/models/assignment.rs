//! Assignment model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{AssignmentState, Location, ReturnRequestState};

/// Assignment row from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub assigned_id_to: Uuid,
    pub assigned_id_by: Uuid,
    pub assigned_date: NaiveDate,
    pub note: Option<String>,
    pub location: Location,
    pub state: AssignmentState,
    pub returned_on: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_on: DateTime<Utc>,
}

/// Assignment with asset and user details for display
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetails {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub asset_code: String,
    pub asset_name: String,
    pub specification: Option<String>,
    pub assigned_id_to: Uuid,
    /// Username of the assignee
    pub assigned_to: String,
    pub assigned_id_by: Uuid,
    /// Username of the admin who made the assignment
    pub assigned_by: String,
    pub assigned_date: NaiveDate,
    pub note: Option<String>,
    pub location: Location,
    pub state: AssignmentState,
    pub return_request_state: Option<ReturnRequestState>,
    pub created_on: DateTime<Utc>,
}

/// Create assignment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignment {
    #[validate(required(message = "Asset is required."))]
    pub asset_id: Option<Uuid>,
    #[validate(required(message = "Assigned to user is required."))]
    pub assigned_id_to: Option<Uuid>,
    #[validate(required(message = "Assigned by user is required."))]
    pub assigned_id_by: Option<Uuid>,
    #[validate(required(message = "Assigned date is required."))]
    pub assigned_date: Option<NaiveDate>,
    #[validate(length(max = 600, message = "Note must be at most 600 characters."))]
    pub note: Option<String>,
}

/// Edit assignment request; same rules as creation, `assigned_id_by` is the editing admin
pub type EditAssignment = CreateAssignment;

/// Assignment fields once validation has passed
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentDraft {
    pub asset_id: Uuid,
    pub assigned_id_to: Uuid,
    pub assigned_id_by: Uuid,
    pub assigned_date: NaiveDate,
    /// Trimmed; empty notes become `None`
    pub note: Option<String>,
}

impl CreateAssignment {
    /// Run the declarative rules and extract the required fields
    pub fn into_draft(self) -> Result<AssignmentDraft, validator::ValidationErrors> {
        self.validate()?;
        match (self.asset_id, self.assigned_id_to, self.assigned_id_by, self.assigned_date) {
            (Some(asset_id), Some(assigned_id_to), Some(assigned_id_by), Some(assigned_date)) => {
                Ok(AssignmentDraft {
                    asset_id,
                    assigned_id_to,
                    assigned_id_by,
                    assigned_date,
                    note: self
                        .note
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty()),
                })
            }
            // validate() already rejected missing fields
            _ => Err(validator::ValidationErrors::new()),
        }
    }
}

/// Change assignment state request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAssignmentState {
    pub new_state: AssignmentState,
}

/// Row to insert, built by the service from a draft
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub assigned_id_to: Uuid,
    pub assigned_id_by: Uuid,
    pub assigned_date: NaiveDate,
    pub note: Option<String>,
    pub location: Location,
    pub created_by: String,
}

/// Which assignments a listing is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentScope {
    /// Everything an admin of this location manages
    Location(Location),
    /// What one staff member holds; declined assignments are left out
    Assignee(Uuid),
}

/// Filters handed to the assignments repository
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentFilter {
    pub scope: AssignmentScope,
    pub search: Option<String>,
    pub state: Option<AssignmentState>,
    pub assigned_date: Option<NaiveDate>,
}

/// Assignment list query parameters (admin view)
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AssignmentQuery {
    /// Location managed by the requesting admin
    pub location: Location,
    /// Matches asset code, asset name, assigned-by or assigned-to username
    pub search: Option<String>,
    pub state: Option<AssignmentState>,
    /// Exact calendar date (YYYY-MM-DD)
    pub assigned_date: Option<NaiveDate>,
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
    /// assetCode, assetName, assignedTo, assignedBy, assignedDate or state
    pub order_by: Option<String>,
    pub is_descending: Option<bool>,
}

/// Assignment list query parameters (one staff member's view)
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserAssignmentQuery {
    pub search: Option<String>,
    pub state: Option<AssignmentState>,
    pub assigned_date: Option<NaiveDate>,
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
    pub order_by: Option<String>,
    pub is_descending: Option<bool>,
}
