//! Return request service

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        return_request::{
            ChangeReturnRequestState, CreateReturnRequest, NewReturnRequest, ReturnRequestFilter,
            ReturnRequestQuery,
        },
        AssignmentState, Lifecycle, ReturnRequestDetails, ReturnRequestState,
    },
    pagination::{PagedResponse, Paginator, SortSpec},
    repository::Repository,
};

const REQUEST_NOT_FOUND: &str = "Return request not found.";
const STATE_LOCKED: &str = "Return request state cannot be changed.";
const NOT_RETURNABLE: &str = "Only accepted assignments can be returned.";

#[derive(Clone)]
pub struct ReturnRequestsService {
    repository: Repository,
    paginator: Paginator,
}

impl ReturnRequestsService {
    pub fn new(repository: Repository, paginator: Paginator) -> Self {
        Self {
            repository,
            paginator,
        }
    }

    /// Ask for an accepted assignment to be returned; one live request per assignment
    pub async fn create(&self, request: CreateReturnRequest) -> AppResult<ReturnRequestDetails> {
        request.validate()?;
        let (Some(assignment_id), Some(requested_by)) = (request.assignment_id, request.requested_by)
        else {
            return Err(AppError::BadRequest("Assignment and requester are required.".to_string()));
        };

        let assignment = self
            .repository
            .assignments
            .get_by_id(assignment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found.".to_string()))?;

        if assignment.state != AssignmentState::Accepted || assignment.returned_on.is_some() {
            tracing::warn!(
                "Return request refused for assignment {} in state {}",
                assignment_id,
                assignment.state
            );
            return Err(AppError::BusinessRule(NOT_RETURNABLE.to_string()));
        }

        self.repository
            .users
            .get_by_id(requested_by)
            .await?
            .ok_or_else(|| AppError::NotFound("Requesting user not found.".to_string()))?;

        if let Some(existing) = self
            .repository
            .return_requests
            .find_by_assignment(assignment_id)
            .await?
            .filter(|existing| existing.state != ReturnRequestState::Rejected)
        {
            let message = if existing.state == ReturnRequestState::Completed {
                "This assignment has already been returned."
            } else {
                "A return request for this assignment is already in progress."
            };
            tracing::warn!("Return request refused for assignment {}: {}", assignment_id, message);
            return Err(AppError::BusinessRule(message.to_string()));
        }

        let new_request = NewReturnRequest {
            id: Uuid::new_v4(),
            assignment_id,
            requested_by,
            returned_date: request.returned_date.unwrap_or_else(Utc::now),
            location: assignment.location,
        };

        let created = self.repository.return_requests.create(&new_request).await?;
        tracing::info!(
            "Return request {} created for assignment {}",
            created.id,
            assignment_id
        );

        self.get_by_id(created.id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ReturnRequestDetails> {
        self.repository
            .return_requests
            .get_details(id)
            .await?
            .ok_or_else(|| AppError::NotFound(REQUEST_NOT_FOUND.to_string()))
    }

    /// Page through the return requests of one location
    pub async fn list(
        &self,
        query: ReturnRequestQuery,
        route: &str,
    ) -> AppResult<PagedResponse<ReturnRequestDetails>> {
        let filter = ReturnRequestFilter {
            location: query.location,
            search: query.search,
            state: query.state,
            returned_date: query.returned_date,
        };
        let sort = SortSpec::new(query.order_by, query.is_descending);
        let page = self.paginator.filter(query.page_index, query.page_size);

        let (rows, total) = self
            .repository
            .return_requests
            .filter(&filter, &sort, &page)
            .await?;
        Ok(self.paginator.page(rows, &page, total, route))
    }

    /// Complete or reject a waiting request
    pub async fn change_state(
        &self,
        id: Uuid,
        request: ChangeReturnRequestState,
    ) -> AppResult<ReturnRequestDetails> {
        request.validate()?;
        let Some(accepted_by) = request.accepted_by else {
            return Err(AppError::BadRequest("Accepted by user is required.".to_string()));
        };

        let current = self
            .repository
            .return_requests
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(REQUEST_NOT_FOUND.to_string()))?;

        if current.state.is_terminal() {
            tracing::warn!("Return request {} is already {}", id, current.state);
            return Err(AppError::BusinessRule(STATE_LOCKED.to_string()));
        }
        if !current.state.can_transition_to(request.new_state) {
            return Err(AppError::BusinessRule(format!(
                "Return request cannot move from {} to {}.",
                current.state, request.new_state
            )));
        }

        self.repository
            .users
            .get_by_id(accepted_by)
            .await?
            .ok_or_else(|| AppError::NotFound("Accepting user not found.".to_string()))?;

        self.repository
            .return_requests
            .resolve(id, request.new_state, accepted_by)
            .await?
            .ok_or_else(|| AppError::BusinessRule(STATE_LOCKED.to_string()))?;

        tracing::info!(
            "Return request {} moved to {} by {}",
            id,
            request.new_state,
            accepted_by
        );
        self.get_by_id(id).await
    }
}
