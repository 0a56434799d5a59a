//! User model and related types

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Gender, Location, Role};

/// Letters only, words separated by whitespace
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[A-Za-z]+(?:\s+[A-Za-z]+)*\s*$").expect("valid name pattern"));

/// Full user model from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// `SD` followed by a zero-padded sequence number
    pub staff_code: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub joined_date: NaiveDate,
    pub gender: Gender,
    pub role: Role,
    pub location: Location,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_first_login: bool,
    pub is_deleted: bool,
    pub created_on: DateTime<Utc>,
}

/// Short user representation for lists
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub staff_code: String,
    pub username: String,
    pub full_name: String,
    pub joined_date: NaiveDate,
    pub role: Role,
    pub location: Location,
}

/// User list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Location managed by the requesting admin
    pub location: Location,
    /// Matches full name, username or staff code
    pub search: Option<String>,
    pub role: Option<Role>,
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
    /// staffCode, fullName, username, joinedDate or role
    pub order_by: Option<String>,
    pub is_descending: Option<bool>,
}

/// Filters handed to the users repository
#[derive(Debug, Clone, PartialEq)]
pub struct UserFilter {
    pub location: Location,
    pub search: Option<String>,
    pub role: Option<Role>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(
        length(min = 2, max = 50, message = "The First Name length should be 2 - 50 letters."),
        regex(path = *NAME_PATTERN, message = "The First Name may only contain letters.")
    )]
    pub first_name: String,
    #[validate(
        length(min = 2, max = 50, message = "The Last Name length should be 2 - 50 letters."),
        regex(path = *NAME_PATTERN, message = "The Last Name may only contain letters.")
    )]
    pub last_name: String,
    #[validate(required(message = "Please select Date Of Birth."))]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(required(message = "Please select Joined Date."))]
    pub joined_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub role: Option<Role>,
    #[validate(required(message = "Please select Location."))]
    pub location: Option<Location>,
    /// Admin performing the creation, recorded for auditing
    pub created_by: Option<Uuid>,
}

/// Validated user ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub joined_date: NaiveDate,
    pub gender: Gender,
    pub role: Role,
    pub location: Location,
    pub password_hash: String,
    pub created_by: Option<String>,
}
