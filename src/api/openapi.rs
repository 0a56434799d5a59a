//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, assignments, health, return_requests, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asset Management API",
        version = "1.0.0",
        description = "IT asset assignment and return tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Assignments
        assignments::create_assignment,
        assignments::list_assignments,
        assignments::get_assignment,
        assignments::update_assignment,
        assignments::delete_assignment,
        assignments::change_assignment_state,
        assignments::get_user_assignments,
        assignments::filter_user_assignments,
        // Return requests
        return_requests::create_return_request,
        return_requests::list_return_requests,
        return_requests::change_return_request_state,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::delete_user,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::create_asset,
    ),
    components(
        schemas(
            // Shared enums
            crate::models::Location,
            crate::models::Gender,
            crate::models::Role,
            crate::models::AssetState,
            crate::models::AssignmentState,
            crate::models::ReturnRequestState,
            // Assignments
            crate::models::assignment::Assignment,
            crate::models::assignment::AssignmentDetails,
            crate::models::assignment::CreateAssignment,
            crate::models::assignment::ChangeAssignmentState,
            // Return requests
            crate::models::return_request::ReturnRequest,
            crate::models::return_request::ReturnRequestDetails,
            crate::models::return_request::CreateReturnRequest,
            crate::models::return_request::ChangeReturnRequestState,
            // Users
            crate::models::user::User,
            crate::models::user::UserSummary,
            crate::models::user::CreateUser,
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::CreateAsset,
            // Health
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "assignments", description = "Asset assignments"),
        (name = "return-requests", description = "Returning assigned assets"),
        (name = "users", description = "User management"),
        (name = "assets", description = "Asset catalogue")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/assignments",
            "/assignments/{id}",
            "/assignments/{id}/state",
            "/users/{id}/assignments/filter",
            "/return-requests/{id}/state",
            "/assets/{id}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }
}
