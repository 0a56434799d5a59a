//! Assignment management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{
            AssignmentDraft, AssignmentFilter, AssignmentQuery, AssignmentScope, CreateAssignment,
            EditAssignment, NewAssignment, UserAssignmentQuery,
        },
        AssignmentDetails, AssignmentState, Lifecycle, Location, User,
    },
    pagination::{PagedResponse, Paginator, SortSpec},
    repository::Repository,
};

const ASSIGNMENT_NOT_FOUND: &str = "Assignment not found.";
const STATE_LOCKED: &str = "Assignment state cannot be changed.";
const NOT_EDITABLE: &str = "Only assignments waiting for acceptance can be edited.";

#[derive(Clone)]
pub struct AssignmentsService {
    repository: Repository,
    paginator: Paginator,
}

impl AssignmentsService {
    pub fn new(repository: Repository, paginator: Paginator) -> Self {
        Self {
            repository,
            paginator,
        }
    }

    /// Assign an available asset to a user
    pub async fn create(&self, request: CreateAssignment) -> AppResult<AssignmentDetails> {
        let draft = request.into_draft()?;
        let (location, assigned_by) = self.check_references(&draft).await?;

        let assignment = NewAssignment {
            id: Uuid::new_v4(),
            asset_id: draft.asset_id,
            assigned_id_to: draft.assigned_id_to,
            assigned_id_by: draft.assigned_id_by,
            assigned_date: draft.assigned_date,
            note: draft.note,
            location,
            created_by: assigned_by.id.to_string(),
        };

        let created = self.repository.assignments.create(&assignment).await?;
        tracing::info!(
            "Assignment {} created: asset {} to user {} by {}",
            created.id,
            created.asset_id,
            created.assigned_id_to,
            assigned_by.username
        );

        self.get_by_id(created.id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<AssignmentDetails> {
        self.repository
            .assignments
            .get_details(id)
            .await?
            .ok_or_else(|| AppError::NotFound(ASSIGNMENT_NOT_FOUND.to_string()))
    }

    /// Page through the assignments of one location
    pub async fn list(
        &self,
        query: AssignmentQuery,
        route: &str,
    ) -> AppResult<PagedResponse<AssignmentDetails>> {
        let filter = AssignmentFilter {
            scope: AssignmentScope::Location(query.location),
            search: query.search,
            state: query.state,
            assigned_date: query.assigned_date,
        };
        let sort = SortSpec::new(query.order_by, query.is_descending);
        let page = self.paginator.filter(query.page_index, query.page_size);

        let (rows, total) = self.repository.assignments.filter(&filter, &sort, &page).await?;
        Ok(self.paginator.page(rows, &page, total, route))
    }

    /// Every non-deleted assignment held by a user
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<AssignmentDetails>> {
        self.require_user(user_id, "User not found.").await?;
        self.repository.assignments.list_for_user(user_id).await
    }

    /// Page through what one user holds, declined assignments left out
    pub async fn filter_for_user(
        &self,
        user_id: Uuid,
        query: UserAssignmentQuery,
        route: &str,
    ) -> AppResult<PagedResponse<AssignmentDetails>> {
        self.require_user(user_id, "User not found.").await?;

        let filter = AssignmentFilter {
            scope: AssignmentScope::Assignee(user_id),
            search: query.search,
            state: query.state,
            assigned_date: query.assigned_date,
        };
        let sort = SortSpec::new(query.order_by, query.is_descending);
        let page = self.paginator.filter(query.page_index, query.page_size);

        let (rows, total) = self.repository.assignments.filter(&filter, &sort, &page).await?;
        Ok(self.paginator.page(rows, &page, total, route))
    }

    /// Accept or decline a waiting assignment
    pub async fn change_state(
        &self,
        id: Uuid,
        new_state: AssignmentState,
    ) -> AppResult<AssignmentDetails> {
        let current = self
            .repository
            .assignments
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(ASSIGNMENT_NOT_FOUND.to_string()))?;

        if current.state.is_terminal() {
            tracing::warn!("Assignment {} is already {}", id, current.state);
            return Err(AppError::BusinessRule(STATE_LOCKED.to_string()));
        }
        if !current.state.can_transition_to(new_state) {
            return Err(AppError::BusinessRule(format!(
                "Assignment cannot move from {} to {}.",
                current.state, new_state
            )));
        }

        // Someone else changed it between the read and the write
        self.repository
            .assignments
            .change_state(id, current.state, new_state)
            .await?
            .ok_or_else(|| AppError::BusinessRule(STATE_LOCKED.to_string()))?;

        tracing::info!("Assignment {} moved from {} to {}", id, current.state, new_state);
        self.get_by_id(id).await
    }

    /// Rewrite an assignment that has not been answered yet
    pub async fn update(&self, id: Uuid, request: EditAssignment) -> AppResult<AssignmentDetails> {
        let draft = request.into_draft()?;

        let current = self
            .repository
            .assignments
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(ASSIGNMENT_NOT_FOUND.to_string()))?;

        if current.state != AssignmentState::WaitingForAcceptance {
            return Err(AppError::BusinessRule(NOT_EDITABLE.to_string()));
        }

        self.check_references(&draft).await?;

        self.repository
            .assignments
            .update(id, current.asset_id, &draft)
            .await?
            .ok_or_else(|| AppError::BusinessRule(NOT_EDITABLE.to_string()))?;

        tracing::info!("Assignment {} updated", id);
        self.get_by_id(id).await
    }

    /// Soft delete an assignment that never reached a return
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let current = self
            .repository
            .assignments
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(ASSIGNMENT_NOT_FOUND.to_string()))?;

        if self
            .repository
            .return_requests
            .find_by_assignment(id)
            .await?
            .is_some()
        {
            return Err(AppError::BusinessRule(
                "An assignment with a return request cannot be deleted.".to_string(),
            ));
        }
        if current.state == AssignmentState::Accepted {
            return Err(AppError::BusinessRule(
                "An accepted assignment must be returned instead of deleted.".to_string(),
            ));
        }

        // Declining already put the asset back
        let release = current.state != AssignmentState::Declined;
        if !self.repository.assignments.soft_delete(id, release).await? {
            return Err(AppError::NotFound(ASSIGNMENT_NOT_FOUND.to_string()));
        }

        tracing::info!("Assignment {} deleted", id);
        Ok(())
    }

    /// Asset and both users must exist and the date must not precede the
    /// assigning user's joined date. Returns the asset location and the assigning user.
    async fn check_references(
        &self,
        draft: &AssignmentDraft,
    ) -> AppResult<(Location, User)> {
        let asset = self
            .repository
            .assets
            .get_by_id(draft.asset_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Asset not found.".to_string()))?;

        let assigned_by = self
            .require_user(draft.assigned_id_by, "User assigned by not found.")
            .await?;
        self.require_user(draft.assigned_id_to, "User assigned to not found.")
            .await?;

        if draft.assigned_date < assigned_by.joined_date {
            return Err(AppError::BusinessRule(
                "Assigned Date must be greater than Joined Date.".to_string(),
            ));
        }

        Ok((asset.location, assigned_by))
    }

    async fn require_user(&self, id: Uuid, missing: &str) -> AppResult<User> {
        self.repository
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }
}
