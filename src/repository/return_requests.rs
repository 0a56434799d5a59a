//! Return requests repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        return_request::{NewReturnRequest, ReturnRequestFilter},
        ReturnRequest, ReturnRequestDetails, ReturnRequestState,
    },
    pagination::{push_order_and_page, PaginationFilter, SortColumns, SortSpec},
};

use super::search_pattern;

const DETAILS_COLUMNS: &str = "SELECT rr.id, rr.assignment_id, s.asset_code, s.asset_name, \
     rr.requested_by, rq.username AS requested_by_username, \
     rr.accepted_by, ac.username AS accepted_by_username, \
     a.assigned_date, rr.returned_date, rr.location, rr.state";

const DETAILS_FROM: &str = " FROM return_requests rr \
     JOIN assignments a ON a.id = rr.assignment_id \
     JOIN assets s ON s.id = a.asset_id \
     JOIN users rq ON rq.id = rr.requested_by \
     LEFT JOIN users ac ON ac.id = rr.accepted_by";

/// Waiting or completed request of an assignment; rejected ones no longer count
const LIVE_FOR_ASSIGNMENT: &str = "SELECT * FROM return_requests \
     WHERE assignment_id = $1 AND NOT is_deleted AND state <> 'rejected'";

/// Stamp the return on an accepted assignment that is still out
const STAMP_RETURNED: &str = "UPDATE assignments \
     SET returned_on = NOW(), last_modified_on = NOW() \
     WHERE id = $1 AND NOT is_deleted AND state = 'accepted' AND returned_on IS NULL \
     RETURNING asset_id";

const RELEASE_RETURNED_ASSET: &str = "UPDATE assets \
     SET state = 'available', last_modified_on = NOW() \
     WHERE id = $1 AND state = 'assigned'";

const NOT_RETURNABLE: &str = "Only accepted assignments can be returned.";

pub(crate) const RETURN_REQUEST_SORT: SortColumns = SortColumns {
    fields: &[
        ("assetCode", "s.asset_code"),
        ("assetName", "s.asset_name"),
        ("requestedBy", "rq.username"),
        ("assignedDate", "a.assigned_date"),
        ("acceptedBy", "ac.username"),
        ("returnedDate", "rr.returned_date"),
        ("state", "rr.state"),
    ],
    default: "s.asset_code",
    tiebreaker: "rr.id",
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReturnRequestsRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<ReturnRequest>>;

    async fn get_details(&self, id: Uuid) -> AppResult<Option<ReturnRequestDetails>>;

    /// The waiting or completed request attached to an assignment
    async fn find_by_assignment(&self, assignment_id: Uuid) -> AppResult<Option<ReturnRequest>>;

    async fn create(&self, request: &NewReturnRequest) -> AppResult<ReturnRequest>;

    /// One page of requests plus the count before paging
    async fn filter(
        &self,
        filter: &ReturnRequestFilter,
        sort: &SortSpec,
        page: &PaginationFilter,
    ) -> AppResult<(Vec<ReturnRequestDetails>, i64)>;

    /// Close a waiting request. Completion also stamps the assignment as
    /// returned and frees the asset, all in one transaction.
    /// `None` when the request was no longer waiting; `BusinessRule` when the
    /// assignment or its asset is not in a returnable state.
    async fn resolve(
        &self,
        id: Uuid,
        outcome: ReturnRequestState,
        accepted_by: Uuid,
    ) -> AppResult<Option<ReturnRequest>>;
}

#[derive(Clone)]
pub struct PgReturnRequestsRepository {
    pool: Pool<Postgres>,
}

impl PgReturnRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ReturnRequestFilter) {
    builder
        .push(" WHERE NOT rr.is_deleted AND NOT a.is_deleted AND rr.location = ")
        .push_bind(filter.location);

    if let Some(pattern) = search_pattern(filter.search.as_deref()) {
        builder
            .push(" AND (LOWER(s.asset_code) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(s.asset_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(rq.username) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(state) = filter.state {
        builder.push(" AND rr.state = ").push_bind(state);
    }

    if let Some(date) = filter.returned_date {
        builder
            .push(" AND (rr.returned_date AT TIME ZONE 'UTC')::date = ")
            .push_bind(date);
    }
}

#[async_trait]
impl ReturnRequestsRepository for PgReturnRequestsRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<ReturnRequest>> {
        let request = sqlx::query_as::<_, ReturnRequest>(
            "SELECT * FROM return_requests WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn get_details(&self, id: Uuid) -> AppResult<Option<ReturnRequestDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(DETAILS_COLUMNS);
        builder
            .push(DETAILS_FROM)
            .push(" WHERE NOT rr.is_deleted AND rr.id = ")
            .push_bind(id);

        let details = builder
            .build_query_as::<ReturnRequestDetails>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(details)
    }

    async fn find_by_assignment(&self, assignment_id: Uuid) -> AppResult<Option<ReturnRequest>> {
        let request = sqlx::query_as::<_, ReturnRequest>(LIVE_FOR_ASSIGNMENT)
            .bind(assignment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    async fn create(&self, request: &NewReturnRequest) -> AppResult<ReturnRequest> {
        let created = sqlx::query_as::<_, ReturnRequest>(
            r#"
            INSERT INTO return_requests (
                id, assignment_id, requested_by, returned_date, location, state, created_by
            )
            VALUES ($1, $2, $3, $4, $5, 'waiting_for_returning', $6)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.assignment_id)
        .bind(request.requested_by)
        .bind(request.returned_date)
        .bind(request.location)
        .bind(request.requested_by.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(
                e,
                "A return request for this assignment is already in progress.",
            )
        })?;

        Ok(created)
    }

    async fn filter(
        &self,
        filter: &ReturnRequestFilter,
        sort: &SortSpec,
        page: &PaginationFilter,
    ) -> AppResult<(Vec<ReturnRequestDetails>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count.push(DETAILS_FROM);
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(DETAILS_COLUMNS);
        select.push(DETAILS_FROM);
        push_filters(&mut select, filter);
        push_order_and_page(&mut select, &RETURN_REQUEST_SORT, sort, page);

        let rows = select
            .build_query_as::<ReturnRequestDetails>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn resolve(
        &self,
        id: Uuid,
        outcome: ReturnRequestState,
        accepted_by: Uuid,
    ) -> AppResult<Option<ReturnRequest>> {
        let completed = outcome == ReturnRequestState::Completed;
        let mut tx = self.pool.begin().await?;

        let resolved = sqlx::query_as::<_, ReturnRequest>(
            r#"
            UPDATE return_requests
            SET state = $2,
                accepted_by = $3,
                returned_date = CASE WHEN $4 THEN NOW() ELSE returned_date END,
                last_modified_on = NOW(),
                last_modified_by = $5
            WHERE id = $1 AND NOT is_deleted AND state = 'waiting_for_returning'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(outcome)
        .bind(accepted_by)
        .bind(completed)
        .bind(accepted_by.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(request) = resolved else {
            return Ok(None);
        };

        if completed {
            // Dropping the transaction on an early return rolls everything back
            let asset_id: Uuid = sqlx::query_scalar(STAMP_RETURNED)
                .bind(request.assignment_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::BusinessRule(NOT_RETURNABLE.to_string()))?;

            let released = sqlx::query(RELEASE_RETURNED_ASSET)
                .bind(asset_id)
                .execute(&mut *tx)
                .await?;
            if released.rows_affected() == 0 {
                tracing::warn!("Asset {} was not held by returned assignment", asset_id);
                return Err(AppError::BusinessRule(NOT_RETURNABLE.to_string()));
            }
        }

        tx.commit().await?;
        Ok(Some(request))
    }
}
