//! Business logic services

pub mod assets;
pub mod assignments;
pub mod return_requests;
pub mod users;

use crate::{config::AppConfig, pagination::Paginator, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub assets: assets::AssetsService,
    pub users: users::UsersService,
    pub assignments: assignments::AssignmentsService,
    pub return_requests: return_requests::ReturnRequestsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let paginator = Paginator::new(config.pagination.clone(), config.server.base_url.clone());

        Self {
            assets: assets::AssetsService::new(repository.clone(), paginator.clone()),
            users: users::UsersService::new(repository.clone(), paginator.clone()),
            assignments: assignments::AssignmentsService::new(repository.clone(), paginator.clone()),
            return_requests: return_requests::ReturnRequestsService::new(repository, paginator),
        }
    }
}

/// Mock-backed repositories and sample rows for service tests
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    use crate::{
        models::{
            Asset, AssetState, Assignment, AssignmentDetails, AssignmentState, Gender, Location,
            ReturnRequest, ReturnRequestDetails, ReturnRequestState, Role, User,
        },
        repository::{
            assets::MockAssetsRepository, assignments::MockAssignmentsRepository,
            return_requests::MockReturnRequestsRepository, users::MockUsersRepository, Repository,
        },
    };

    /// One mock per repository; unset expectations panic when called
    #[derive(Default)]
    pub struct Mocks {
        pub assets: MockAssetsRepository,
        pub users: MockUsersRepository,
        pub assignments: MockAssignmentsRepository,
        pub return_requests: MockReturnRequestsRepository,
    }

    impl Mocks {
        pub fn into_repository(self) -> Repository {
            Repository {
                assets: Arc::new(self.assets),
                users: Arc::new(self.users),
                assignments: Arc::new(self.assignments),
                return_requests: Arc::new(self.return_requests),
            }
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    pub fn user(id: Uuid, joined_date: NaiveDate) -> User {
        User {
            id,
            username: "binhnv".to_string(),
            staff_code: "SD0001".to_string(),
            first_name: "Binh".to_string(),
            last_name: "Nguyen Van".to_string(),
            date_of_birth: date(1990, 1, 15),
            joined_date,
            gender: Gender::Male,
            role: Role::Admin,
            location: Location::HaNoi,
            password_hash: String::new(),
            is_first_login: false,
            is_deleted: false,
            created_on: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    pub fn asset(id: Uuid) -> Asset {
        Asset {
            id,
            asset_code: "LA000001".to_string(),
            asset_name: "Laptop HP Probook 450 G1".to_string(),
            category: "Laptop".to_string(),
            specification: Some("Core i5, 8GB RAM".to_string()),
            installed_date: Some(date(2023, 3, 1)),
            state: AssetState::Available,
            location: Location::DaNang,
            is_deleted: false,
            created_on: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    pub fn assignment(id: Uuid, state: AssignmentState) -> Assignment {
        Assignment {
            id,
            asset_id: Uuid::new_v4(),
            assigned_id_to: Uuid::new_v4(),
            assigned_id_by: Uuid::new_v4(),
            assigned_date: date(2024, 6, 12),
            note: None,
            location: Location::HaNoi,
            state,
            returned_on: None,
            is_deleted: false,
            created_on: Utc.with_ymd_and_hms(2024, 6, 12, 8, 0, 0).unwrap(),
        }
    }

    pub fn assignment_details(assignment: &Assignment) -> AssignmentDetails {
        AssignmentDetails {
            id: assignment.id,
            asset_id: assignment.asset_id,
            asset_code: "LA000001".to_string(),
            asset_name: "Laptop HP Probook 450 G1".to_string(),
            specification: None,
            assigned_id_to: assignment.assigned_id_to,
            assigned_to: "anhtt".to_string(),
            assigned_id_by: assignment.assigned_id_by,
            assigned_by: "binhnv".to_string(),
            assigned_date: assignment.assigned_date,
            note: assignment.note.clone(),
            location: assignment.location,
            state: assignment.state,
            return_request_state: None,
            created_on: assignment.created_on,
        }
    }

    pub fn return_request(id: Uuid, state: ReturnRequestState) -> ReturnRequest {
        ReturnRequest {
            id,
            assignment_id: Uuid::new_v4(),
            requested_by: Uuid::new_v4(),
            accepted_by: None,
            returned_date: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
            location: Location::HaNoi,
            state,
            created_on: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
        }
    }

    pub fn return_request_details(request: &ReturnRequest) -> ReturnRequestDetails {
        ReturnRequestDetails {
            id: request.id,
            assignment_id: request.assignment_id,
            asset_code: "LA000001".to_string(),
            asset_name: "Laptop HP Probook 450 G1".to_string(),
            requested_by: request.requested_by,
            requested_by_username: "anhtt".to_string(),
            accepted_by: request.accepted_by,
            accepted_by_username: None,
            assigned_date: date(2024, 6, 12),
            returned_date: request.returned_date,
            location: request.location,
            state: request.state,
        }
    }
}
