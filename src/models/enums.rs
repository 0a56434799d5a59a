//! Shared domain enums, stored as PostgreSQL enum types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::lifecycle::Lifecycle;

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Administrative site; every admin manages exactly one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "location", rename_all = "snake_case")]
pub enum Location {
    HaNoi,
    HoChiMinh,
    DaNang,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Location::HaNoi => "Ha Noi",
            Location::HoChiMinh => "Ho Chi Minh",
            Location::DaNang => "Da Nang",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// Gender / Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Staff,
}

// ---------------------------------------------------------------------------
// AssetState
// ---------------------------------------------------------------------------

/// Physical availability of an asset; `Available <-> Assigned` is driven by assignments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "asset_state", rename_all = "snake_case")]
pub enum AssetState {
    #[default]
    Available,
    Assigned,
    NotAvailable,
    WaitingForRecycling,
    Recycled,
}

// ---------------------------------------------------------------------------
// AssignmentState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "assignment_state", rename_all = "snake_case")]
pub enum AssignmentState {
    #[default]
    WaitingForAcceptance,
    Accepted,
    Declined,
}

impl Lifecycle for AssignmentState {
    const TRANSITIONS: &'static [(Self, Self)] = &[
        (AssignmentState::WaitingForAcceptance, AssignmentState::Accepted),
        (AssignmentState::WaitingForAcceptance, AssignmentState::Declined),
    ];
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AssignmentState::WaitingForAcceptance => "Waiting for acceptance",
            AssignmentState::Accepted => "Accepted",
            AssignmentState::Declined => "Declined",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// ReturnRequestState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "return_request_state", rename_all = "snake_case")]
pub enum ReturnRequestState {
    #[default]
    WaitingForReturning,
    Completed,
    Rejected,
}

impl Lifecycle for ReturnRequestState {
    const TRANSITIONS: &'static [(Self, Self)] = &[
        (ReturnRequestState::WaitingForReturning, ReturnRequestState::Completed),
        (ReturnRequestState::WaitingForReturning, ReturnRequestState::Rejected),
    ];
}

impl std::fmt::Display for ReturnRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReturnRequestState::WaitingForReturning => "Waiting for returning",
            ReturnRequestState::Completed => "Completed",
            ReturnRequestState::Rejected => "Rejected",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_terminal_states() {
        assert!(!AssignmentState::WaitingForAcceptance.is_terminal());
        assert!(AssignmentState::Accepted.is_terminal());
        assert!(AssignmentState::Declined.is_terminal());
    }

    #[test]
    fn assignment_transitions() {
        use AssignmentState::*;
        assert!(WaitingForAcceptance.can_transition_to(Accepted));
        assert!(WaitingForAcceptance.can_transition_to(Declined));
        assert!(!WaitingForAcceptance.can_transition_to(WaitingForAcceptance));
        for terminal in [Accepted, Declined] {
            for next in [WaitingForAcceptance, Accepted, Declined] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn return_request_transitions() {
        use ReturnRequestState::*;
        assert!(WaitingForReturning.can_transition_to(Completed));
        assert!(WaitingForReturning.can_transition_to(Rejected));
        assert!(!Completed.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Completed));
        assert!(Completed.is_terminal());
        assert!(Rejected.is_terminal());
    }

    #[test]
    fn initial_states() {
        assert_eq!(AssignmentState::default(), AssignmentState::WaitingForAcceptance);
        assert_eq!(ReturnRequestState::default(), ReturnRequestState::WaitingForReturning);
    }
}
